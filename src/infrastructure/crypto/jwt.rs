//! Session token handling
//!
//! A token carries a copy of the session so the UI can render without a
//! round trip, but the server only honours it while the `sid` is still
//! present in the session registry.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::SecurityConfig;
use crate::domain::UserSession;

const ISSUER: &str = "staff-portal";

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration time in hours
    pub expiration_hours: i64,
    /// Issuer claim
    pub issuer: String,
}

impl JwtConfig {
    pub fn from_security(security: &SecurityConfig) -> Self {
        Self {
            secret: security.jwt_secret.clone(),
            expiration_hours: security.session_ttl_hours,
            issuer: ISSUER.to_string(),
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::hours(self.expiration_hours)
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self::from_security(&SecurityConfig::default())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    /// Session id in the registry
    pub sid: String,
    /// Employee email
    pub sub: String,
    pub name: String,
    pub department: Option<String>,
    pub job_title: Option<String>,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
}

impl SessionClaims {
    pub fn new(sid: &str, user: &UserSession, issued_at: DateTime<Utc>, config: &JwtConfig) -> Self {
        Self {
            sid: sid.to_string(),
            sub: user.email.clone(),
            name: user.name.clone(),
            department: user.department.clone(),
            job_title: user.job_title.clone(),
            exp: (issued_at + config.ttl()).timestamp(),
            iat: issued_at.timestamp(),
            iss: config.issuer.clone(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    pub fn user(&self) -> UserSession {
        UserSession {
            name: self.name.clone(),
            email: self.sub.clone(),
            department: self.department.clone(),
            job_title: self.job_title.clone(),
        }
    }
}

/// Sign a token for a registered session
pub fn create_token(
    claims: &SessionClaims,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify signature, expiry and issuer
pub fn verify_token(
    token: &str,
    config: &JwtConfig,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[&config.issuer]);

    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}
