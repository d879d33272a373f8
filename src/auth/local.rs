use async_trait::async_trait;
use chrono::{Duration, Utc};
use dashmap::DashMap;
use crate::errors::CiphertraceError;
use super::backend::{AuthBackend, AuthSession, Profile, Role, SignUpMetadata};
use tracing::{debug, info};

const MIN_PASSWORD_LEN: usize = 6;

struct Account {
    password: String,
    profile: Profile,
}

struct Grant {
    user_email: String,
    expires_at: chrono::DateTime<Utc>,
}

/// In-process stand-in for the hosted identity service. Accounts and tokens
/// live in memory for the lifetime of the process.
///
/// Passwords are held as given, not hashed. This backend is only suitable
/// for local and demo deployments; anything shared should sit behind a real
/// identity provider implementing [`AuthBackend`].
pub struct LocalAuthBackend {
    accounts: DashMap<String, Account>,
    tokens: DashMap<String, Grant>,
    token_ttl: Duration,
    default_role: Role,
}

impl LocalAuthBackend {
    pub fn new(token_ttl_minutes: i64) -> Self {
        Self {
            accounts: DashMap::new(),
            tokens: DashMap::new(),
            token_ttl: Duration::minutes(token_ttl_minutes.max(1)),
            default_role: Role::Viewer,
        }
    }

    /// Create an account with a fixed role, bypassing the sign-up role rules.
    pub fn provision(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        role: Role,
    ) -> Result<Profile, CiphertraceError> {
        let email = normalize_email(email)?;
        validate_password(password)?;
        let profile = Profile {
            user_id: uuid::Uuid::new_v4().to_string(),
            email: email.clone(),
            role,
            full_name: full_name.to_string(),
            department: None,
            created_at: Utc::now(),
        };
        self.accounts.insert(email.clone(), Account { password: password.to_string(), profile: profile.clone() });
        info!(email = %email, role = %role, "Account provisioned");
        Ok(profile)
    }

    #[cfg(test)]
    fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

impl Default for LocalAuthBackend {
    fn default() -> Self {
        Self::new(60)
    }
}

#[async_trait]
impl AuthBackend for LocalAuthBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, CiphertraceError> {
        let email = normalize_email(email)?;
        let profile = match self.accounts.get(&email) {
            Some(account) if account.password == password => account.profile.clone(),
            _ => return Err(CiphertraceError::Authentication("Invalid email or password".into())),
        };

        let now = Utc::now();
        let before = self.tokens.len();
        self.tokens.retain(|_, grant| grant.expires_at > now);
        if self.tokens.len() < before {
            debug!(pruned = before - self.tokens.len(), "Expired tokens pruned");
        }

        let access_token = uuid::Uuid::new_v4().simple().to_string();
        let expires_at = now + self.token_ttl;
        self.tokens.insert(access_token.clone(), Grant { user_email: email.clone(), expires_at });
        info!(email = %email, role = %profile.role, "Signed in");
        Ok(AuthSession { access_token, expires_at, profile })
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: SignUpMetadata,
    ) -> Result<Profile, CiphertraceError> {
        let email = normalize_email(email)?;
        validate_password(password)?;
        if metadata.full_name.trim().is_empty() {
            return Err(CiphertraceError::InvalidInput("Full name is required".into()));
        }
        if self.accounts.contains_key(&email) {
            return Err(CiphertraceError::Authentication("An account with this email already exists".into()));
        }

        // Self-service sign-up can never grant admin.
        let role = match metadata.role {
            Some(Role::Admin) | None => self.default_role,
            Some(role) => role,
        };
        let profile = Profile {
            user_id: uuid::Uuid::new_v4().to_string(),
            email: email.clone(),
            role,
            full_name: metadata.full_name.trim().to_string(),
            department: metadata.department.filter(|d| !d.trim().is_empty()),
            created_at: Utc::now(),
        };
        self.accounts.insert(email.clone(), Account { password: password.to_string(), profile: profile.clone() });
        info!(email = %email, role = %role, "Account created");
        Ok(profile)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), CiphertraceError> {
        if self.tokens.remove(access_token).is_some() {
            debug!("Token revoked");
        }
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> Result<(), CiphertraceError> {
        let email = normalize_email(email)?;
        // Same outcome either way so callers cannot enumerate accounts.
        debug!(known = self.accounts.contains_key(&email), "Password reset requested");
        Ok(())
    }

    async fn session(&self, access_token: &str) -> Result<Option<Profile>, CiphertraceError> {
        let grant = self.tokens.get(access_token).map(|g| (g.user_email.clone(), g.expires_at));
        let Some((email, expires_at)) = grant else {
            return Ok(None);
        };
        if expires_at <= Utc::now() {
            self.tokens.remove(access_token);
            return Ok(None);
        }
        Ok(self.accounts.get(&email).map(|a| a.profile.clone()))
    }
}

fn normalize_email(email: &str) -> Result<String, CiphertraceError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(CiphertraceError::InvalidInput(format!("'{}' is not a valid email address", email))),
    }
}

fn validate_password(password: &str) -> Result<(), CiphertraceError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CiphertraceError::InvalidInput(format!(
            "Password must be at least {} characters", MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(name: &str, role: Option<Role>) -> SignUpMetadata {
        SignUpMetadata { full_name: name.into(), department: Some("Fraud".into()), role }
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let auth = LocalAuthBackend::default();
        let profile = auth
            .sign_up("Dana@Agency.gov", "hunter22", metadata("Dana Reyes", Some(Role::Analyst)))
            .await
            .unwrap();
        assert_eq!(profile.email, "dana@agency.gov");
        assert_eq!(profile.role, Role::Analyst);

        let session = auth.sign_in("dana@agency.gov", "hunter22").await.unwrap();
        let resolved = auth.session(&session.access_token).await.unwrap().unwrap();
        assert_eq!(resolved, profile);
    }

    #[tokio::test]
    async fn test_sign_up_cannot_claim_admin() {
        let auth = LocalAuthBackend::default();
        let profile = auth.sign_up("a@b.io", "secret1", metadata("A", Some(Role::Admin))).await.unwrap();
        assert_eq!(profile.role, Role::Viewer);
    }

    #[tokio::test]
    async fn test_duplicate_and_weak_sign_up_rejected() {
        let auth = LocalAuthBackend::default();
        auth.sign_up("a@b.io", "secret1", metadata("A", None)).await.unwrap();
        assert!(matches!(
            auth.sign_up("A@B.io", "secret2", metadata("A2", None)).await,
            Err(CiphertraceError::Authentication(_))
        ));
        assert!(matches!(
            auth.sign_up("c@b.io", "123", metadata("C", None)).await,
            Err(CiphertraceError::InvalidInput(_))
        ));
        assert_eq!(auth.account_count(), 1);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let auth = LocalAuthBackend::default();
        auth.provision("boss@agency.gov", "topsecret", "Boss", Role::Admin).unwrap();
        assert!(matches!(
            auth.sign_in("boss@agency.gov", "nope-nope").await,
            Err(CiphertraceError::Authentication(_))
        ));
        assert!(matches!(
            auth.sign_in("ghost@agency.gov", "topsecret").await,
            Err(CiphertraceError::Authentication(_))
        ));
    }

    #[tokio::test]
    async fn test_sign_out_revokes_token() {
        let auth = LocalAuthBackend::default();
        auth.provision("boss@agency.gov", "topsecret", "Boss", Role::Admin).unwrap();
        let session = auth.sign_in("boss@agency.gov", "topsecret").await.unwrap();
        auth.sign_out(&session.access_token).await.unwrap();
        assert!(auth.session(&session.access_token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_password_does_not_enumerate() {
        let auth = LocalAuthBackend::default();
        assert!(auth.reset_password("nobody@agency.gov").await.is_ok());
        assert!(auth.reset_password("not-an-email").await.is_err());
    }

    #[tokio::test]
    async fn test_sign_in_prunes_expired_tokens() {
        let auth = LocalAuthBackend::default();
        auth.provision("boss@agency.gov", "topsecret", "Boss", Role::Admin).unwrap();
        for n in 0..3 {
            auth.tokens.insert(
                format!("stale-{}", n),
                Grant { user_email: "boss@agency.gov".into(), expires_at: Utc::now() - Duration::minutes(5) },
            );
        }

        let session = auth.sign_in("boss@agency.gov", "topsecret").await.unwrap();
        assert_eq!(auth.tokens.len(), 1);
        assert!(auth.tokens.contains_key(&session.access_token));
    }
}
