pub mod auth;
pub mod categories;
pub mod health;
pub mod projects;
pub mod sections;
pub mod tags;
pub mod tasks;
pub mod users;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{middleware::auth::JwtSecret, AppState};

/// The full HTTP surface. Everything under `/api` except `/api/auth/*`
/// requires a bearer token.
pub fn router(state: AppState) -> anyhow::Result<Router> {
    let origin: HeaderValue = state.config.cors_origin.parse()?;
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::list([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
        ]))
        .allow_origin(AllowOrigin::exact(origin));

    let jwt_secret = JwtSecret(state.config.jwt_secret.clone());

    let app = Router::new()
        .route("/ping", get(health::ping))
        // Auth
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        // Current user
        .route("/api/users/me", get(users::me).patch(users::update_me))
        // Categories
        .route("/api/categories", get(categories::list_categories).post(categories::create_category))
        .route(
            "/api/categories/{id}",
            get(categories::get_category)
                .patch(categories::update_category)
                .delete(categories::delete_category),
        )
        // Projects
        .route("/api/projects", get(projects::list_projects).post(projects::create_project))
        .route(
            "/api/projects/{id}",
            get(projects::get_project)
                .patch(projects::update_project)
                .delete(projects::delete_project),
        )
        // Sections
        .route("/api/sections", post(sections::create_section))
        .route("/api/sections/reorder", post(sections::reorder_sections))
        .route("/api/sections/project/{project_id}", get(sections::list_project_sections))
        .route(
            "/api/sections/{id}",
            get(sections::get_section)
                .patch(sections::update_section)
                .delete(sections::delete_section),
        )
        // Tags
        .route("/api/tags", get(tags::list_tags).post(tags::create_tag))
        .route(
            "/api/tags/{id}",
            get(tags::get_tag).patch(tags::update_tag).delete(tags::delete_tag),
        )
        // Tasks
        .route("/api/tasks", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/api/tasks/{id}",
            get(tasks::get_task).patch(tasks::update_task).delete(tasks::delete_task),
        )
        .layer(axum::Extension(jwt_secret))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    Ok(app)
}
