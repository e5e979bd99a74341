//! Identity-provider contract.
//!
//! Consumed exactly once at session start. A failure here is fatal to the
//! session: it is surfaced to the user and chat never opens.

use async_trait::async_trait;
use uuid::Uuid;

use parley_shared::AuthError;

/// The authenticated-anonymous user as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: String,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create a fresh anonymous identity for this session.
    async fn sign_in_anonymous(&self) -> Result<AuthUser, AuthError>;

    /// Attach a display name to the signed-in identity.
    async fn set_display_name(&self, user_id: &str, name: &str) -> Result<(), AuthError>;
}

/// Local identity provider: mints a random id per sign-in and accepts any
/// display name. Stands in for a hosted auth service in tests and local
/// runs.
pub struct AnonymousAuth;

#[async_trait]
impl IdentityProvider for AnonymousAuth {
    async fn sign_in_anonymous(&self) -> Result<AuthUser, AuthError> {
        let user = AuthUser {
            id: Uuid::new_v4().to_string(),
        };
        tracing::debug!(user_id = %user.id, "anonymous sign-in");
        Ok(user)
    }

    async fn set_display_name(&self, user_id: &str, name: &str) -> Result<(), AuthError> {
        if name.trim().is_empty() {
            return Err(AuthError::ProfileUpdate(
                "display name must not be empty".into(),
            ));
        }
        tracing::debug!(user_id = %user_id, name = %name, "display name set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_ins_are_distinct_identities() {
        let auth = AnonymousAuth;
        let a = auth.sign_in_anonymous().await.unwrap();
        let b = auth.sign_in_anonymous().await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn empty_display_name_is_rejected() {
        let auth = AnonymousAuth;
        let user = auth.sign_in_anonymous().await.unwrap();
        assert!(auth.set_display_name(&user.id, "  ").await.is_err());
        assert!(auth.set_display_name(&user.id, "Ana").await.is_ok());
    }
}
