// ContentGen automation backend library

pub mod api;
pub mod auth;
pub mod authz;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod gateway;
pub mod observability;
pub mod pipeline;
pub mod retention;

pub use config::Config;
pub use errors::{AppError, Result};
