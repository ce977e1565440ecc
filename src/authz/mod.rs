pub mod roles;

pub use roles::{Permission, Role, Section};
