pub mod articles;
pub mod auth;
pub mod generation;
pub mod health;
pub mod providers;
pub mod routes;
pub mod scenarios;
pub mod users;
pub mod webhooks;

pub use routes::{create_router, AppState};
