// JWT token generation and validation

use crate::authz::Role;
use crate::config::AuthConfig;
use crate::db::schema::UserRecord;
use crate::errors::{AppError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const ISSUER: &str = "contentgen";

/// Bearer token claims: identity plus role, fixed validity window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    pub username: String,
    pub role: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    pub fn new(user: &UserRecord, validity_hours: i64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(validity_hours);

        Self {
            sub: user.id.clone(),
            username: user.username.clone(),
            role: user.role.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: ISSUER.to_string(),
        }
    }

    pub fn role(&self) -> Result<Role> {
        Role::parse(&self.role)
            .ok_or_else(|| AppError::TokenValidation(format!("Unknown role: {}", self.role)))
    }
}

/// Token manager for generation and validation
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validity_hours: i64,
}

impl JwtManager {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        if config.jwt_secret.len() < 32 {
            return Err(AppError::Configuration(
                "JWT secret must be at least 32 characters long".to_string(),
            ));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validity_hours: config.token_expiration_hours,
        })
    }

    /// Issue a bearer token for an authenticated user
    pub fn generate(&self, user: &UserRecord) -> Result<String> {
        let claims = Claims::new(user, self.validity_hours);
        let header = Header::new(Algorithm::HS256);

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to encode JWT: {}", e)))
    }

    /// Validate and decode a bearer token
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_manager() -> JwtManager {
        JwtManager::new(&AuthConfig {
            jwt_secret: "test-secret-key-for-jwt-signing-min-length".to_string(),
            token_expiration_hours: 24,
        })
        .unwrap()
    }

    fn test_user(role: &str) -> UserRecord {
        UserRecord {
            id: "user-1".to_string(),
            username: "admin".to_string(),
            email: "admin@contentgen.local".to_string(),
            name: "Admin".to_string(),
            role: role.to_string(),
            password_hash: String::new(),
            avatar: None,
            status: "active".to_string(),
            created_at: Utc::now(),
            last_login: None,
        }
    }

    #[test]
    fn test_generate_and_validate() {
        let manager = test_manager();
        let token = manager.generate(&test_user("super_admin")).unwrap();

        let claims = manager.validate(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.role().unwrap(), Role::SuperAdmin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let manager = test_manager();
        let token = manager.generate(&test_user("redacteur")).unwrap();

        let mut tampered = token.clone();
        tampered.push('x');
        assert!(manager.validate(&tampered).is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = JwtManager::new(&AuthConfig {
            jwt_secret: "short".to_string(),
            token_expiration_hours: 24,
        });
        assert!(result.is_err());
    }
}
