//! Demo account seed script
//!
//! Registers (or reuses) a demo user and fills it with:
//! - an Inbox task due today
//! - a "Launch" project with "Todo" and "Doing" sections
//! - two tags and a few tagged tasks spread across the sections
//!
//! Usage:
//!   DATABASE_URL=... ./seed-demo --email demo@example.com --password demo1234

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use std::env;

use taskboard_api::{
    db::{self, PgStore},
    error::AppError,
    models::{
        project::CreateProjectRequest,
        section::CreateSectionRequest,
        tag::CreateTagRequest,
        task::{CreateTaskRequest, Priority},
    },
    services::{
        projects::ProjectService, sections::SectionService, tags::TagService,
        tasks::TaskService, users::UserService,
    },
};

#[derive(Parser, Debug)]
#[command(about = "Seed a demo account with projects, sections, tags and tasks")]
struct Args {
    #[arg(long, default_value = "demo@example.com")]
    email: String,
    #[arg(long, default_value = "demo1234")]
    password: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL required")?;

    println!("=== Seed Demo Account ===");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;
    db::run_migrations(&pool).await?;
    let store = PgStore::new(pool);

    // 1. Account
    let user_id = match UserService::register(&store, &args.email, &args.password).await {
        Ok(user) => {
            println!("  Registered {}", user.email);
            user.id
        }
        Err(AppError::Conflict(_)) => {
            let principal = UserService::authenticate(&store, &args.email, &args.password)
                .await
                .context("Demo user exists with a different password")?;
            println!("  Reusing {}", principal.email);
            principal.id
        }
        Err(e) => return Err(e.into()),
    };

    // 2. Tags
    let urgent = TagService::create(
        &store,
        user_id,
        &CreateTagRequest {
            name: "urgent".into(),
            color: Some("#dc4c3e".into()),
        },
    )
    .await?;
    let errand = TagService::create(
        &store,
        user_id,
        &CreateTagRequest {
            name: "errand".into(),
            color: Some("#4f5d75".into()),
        },
    )
    .await?;
    println!("  Created tags");

    // 3. Inbox
    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
    TaskService::create(
        &store,
        user_id,
        &CreateTaskRequest {
            title: "Buy groceries".into(),
            due_date: Some(today),
            tag_ids: Some(vec![errand.id]),
            ..Default::default()
        },
    )
    .await?;

    // 4. Project with sections
    let project = ProjectService::create(
        &store,
        user_id,
        &CreateProjectRequest {
            name: "Launch".into(),
            color: Some("#ef8354".into()),
        },
    )
    .await?;

    let mut sections = Vec::new();
    for name in ["Todo", "Doing"] {
        let section = SectionService::create(
            &store,
            user_id,
            &CreateSectionRequest {
                project_id: project.id,
                name: name.into(),
            },
        )
        .await?;
        sections.push(section);
    }

    let tasks = [
        ("Write release notes", 0, Some(Priority::Medium), vec![]),
        ("Fix login redirect", 1, Some(Priority::Urgent), vec![urgent.id]),
        ("Book venue", 0, Some(Priority::Low), vec![errand.id]),
    ];
    for (title, section, priority, tag_ids) in tasks {
        TaskService::create(
            &store,
            user_id,
            &CreateTaskRequest {
                title: title.into(),
                project_id: Some(project.id),
                section_id: Some(sections[section].id),
                priority,
                tag_ids: Some(tag_ids),
                ..Default::default()
            },
        )
        .await?;
    }
    println!("  Created project \"{}\" with {} sections", project.name, sections.len());

    println!("=== Done ===");
    Ok(())
}
