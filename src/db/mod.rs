pub mod articles;
pub mod history;
pub mod pool;
pub mod providers;
pub mod scenarios;
pub mod schema;
pub mod seed;
pub mod users;
pub mod webhook_logs;

pub use pool::{create_pool, health_check, init_schema};
