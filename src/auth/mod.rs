pub mod extract;
pub mod jwt;
pub mod password;

pub use extract::AuthUser;
pub use jwt::{Claims, JwtManager};
