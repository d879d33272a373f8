use std::fmt;
use std::str::FromStr;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::errors::CiphertraceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Investigator,
    Analyst,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Investigator, Role::Analyst, Role::Viewer];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Investigator => "investigator",
            Self::Analyst => "analyst",
            Self::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CiphertraceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == lower)
            .ok_or_else(|| CiphertraceError::InvalidInput(format!("Unknown role '{}'", s)))
    }
}

/// A signed-in user's profile as held by the identity backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub full_name: String,
    pub department: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Extra fields collected at sign-up.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignUpMetadata {
    pub full_name: String,
    pub department: Option<String>,
    /// Requested role. Backends may ignore this and assign a default.
    pub role: Option<Role>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub profile: Profile,
}

/// Contract of the hosted identity service.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, CiphertraceError>;

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> Result<Profile, CiphertraceError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), CiphertraceError>;

    /// Start a password reset. Succeeds whether or not the address exists.
    async fn reset_password(&self, email: &str) -> Result<(), CiphertraceError>;

    /// Resolve a token to its profile; `None` when unknown or expired.
    async fn session(&self, access_token: &str) -> Result<Option<Profile>, CiphertraceError>;
}
