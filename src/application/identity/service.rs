//! Sign-in service: application-layer orchestration
//!
//! An employee signs in with their work email; there is no password. The
//! matched `employees` row supplies the display name, department and job
//! title the access policy works from.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::registry::SharedSessionRegistry;
use crate::domain::{DomainError, DomainResult, EmployeeDirectory, UserSession};
use crate::infrastructure::crypto::jwt::{create_token, verify_token, JwtConfig, SessionClaims};

pub const USER_NOT_FOUND: &str =
    "User not found. Please ensure you are using a valid employee email.";

/// Result of a successful sign-in
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
    pub user: UserSession,
}

pub struct SessionService {
    directory: Arc<dyn EmployeeDirectory>,
    registry: SharedSessionRegistry,
    jwt_config: JwtConfig,
}

impl SessionService {
    pub fn new(
        directory: Arc<dyn EmployeeDirectory>,
        registry: SharedSessionRegistry,
        jwt_config: JwtConfig,
    ) -> Self {
        Self {
            directory,
            registry,
            jwt_config,
        }
    }

    pub fn registry(&self) -> &SharedSessionRegistry {
        &self.registry
    }

    /// Sign in by email. Exactly one employee must match, ignoring case.
    pub async fn login(&self, identity: &str) -> DomainResult<LoginOutcome> {
        let identity = identity.trim();
        if identity.is_empty() {
            return Err(DomainError::Validation("Email is required".into()));
        }
        // `*` is a wildcard alias on the backend; `%` and `_` are escaped later.
        if identity.contains('*') {
            return Err(DomainError::Unauthorized(USER_NOT_FOUND.into()));
        }

        let mut matches = self.directory.find_by_email(identity).await?;
        if matches.len() != 1 {
            if matches.len() > 1 {
                warn!(identity, "Sign-in email matches more than one employee");
            }
            return Err(DomainError::Unauthorized(USER_NOT_FOUND.into()));
        }
        let employee = matches.remove(0);

        let user = UserSession {
            name: employee.full_name,
            email: employee.email,
            department: employee.department_name,
            job_title: employee.job_title,
        };

        let now = Utc::now();
        let expires_at = now + self.jwt_config.ttl();
        let sid = self.registry.open(user.clone(), expires_at);
        let claims = SessionClaims::new(&sid, &user, now, &self.jwt_config);
        let token = create_token(&claims, &self.jwt_config).map_err(|e| {
            self.registry.close(&sid);
            DomainError::Backend(format!("Failed to create token: {}", e))
        })?;

        info!(
            email = %user.email,
            department = user.department.as_deref().unwrap_or("-"),
            "User signed in"
        );

        Ok(LoginOutcome {
            token,
            token_type: "Bearer".into(),
            expires_in: self.jwt_config.expiration_hours * 3600,
            expires_at,
            user,
        })
    }

    /// Resolve a bearer token to its live session.
    pub fn resolve(&self, token: &str) -> DomainResult<(String, UserSession)> {
        let claims = verify_token(token, &self.jwt_config)
            .map_err(|_| DomainError::Unauthorized("Invalid authentication token".into()))?;
        let user = self
            .registry
            .get(&claims.sid, Utc::now())
            .ok_or_else(|| DomainError::Unauthorized("Session has ended".into()))?;
        Ok((claims.sid, user))
    }

    /// Destroy the session. Returns `false` if it was already gone.
    pub fn logout(&self, sid: &str) -> bool {
        let closed = self.registry.close(sid);
        if closed {
            info!(sid, "User signed out");
        }
        closed
    }
}
