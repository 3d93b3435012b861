pub mod auth;
pub mod avatar;
pub mod categories;
pub mod projects;
pub mod sections;
pub mod tags;
pub mod tasks;
pub mod users;
