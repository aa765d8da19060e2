//! Identity provider port.
//!
//! The storefront never talks to an identity provider directly. It consumes
//! an [`AuthSession`] that reports the current [`Identity`] and performs
//! login/logout; the stores are then reset explicitly from that identity.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use storekeeper_core::UserId;

/// The signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
}

impl Identity {
    /// An identity with only a user ID.
    #[must_use]
    pub fn new(uid: impl Into<UserId>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
            photo_url: None,
        }
    }

    /// Name to show for this user, falling back to the email and then the ID.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or_else(|| self.uid.as_str())
    }
}

/// Errors from the identity provider.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No identity is configured for this provider.
    #[error("No identity configured")]
    NotConfigured,

    /// Provider rejected the request.
    #[error("Identity provider error: {0}")]
    Provider(String),
}

/// Identity provider consumed by the storefront.
#[async_trait]
pub trait AuthSession: Send + Sync {
    /// The currently signed-in identity, if any.
    fn current_identity(&self) -> Option<Identity>;

    /// Sign in and return the new identity.
    async fn login(&self) -> Result<Identity, AuthError>;

    /// Sign out. Signing out while signed out is not an error.
    async fn logout(&self) -> Result<(), AuthError>;
}

/// Provider backed by a single preconfigured identity.
///
/// Used by the CLI (identity from environment variables) and by tests.
#[derive(Debug, Default)]
pub struct StaticAuth {
    configured: Option<Identity>,
    current: Mutex<Option<Identity>>,
}

impl StaticAuth {
    /// A provider that will sign in as `identity`. Starts signed out.
    #[must_use]
    pub fn new(identity: Option<Identity>) -> Self {
        Self {
            configured: identity,
            current: Mutex::new(None),
        }
    }

    /// Build from `STOREKEEPER_USER_ID`, `STOREKEEPER_USER_EMAIL`,
    /// `STOREKEEPER_USER_NAME` and `STOREKEEPER_USER_PHOTO_URL`.
    ///
    /// Without a user ID the provider has no identity and `login` fails.
    #[must_use]
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        let identity = var("STOREKEEPER_USER_ID").map(|uid| Identity {
            uid: UserId::new(uid.trim()),
            email: var("STOREKEEPER_USER_EMAIL"),
            display_name: var("STOREKEEPER_USER_NAME"),
            photo_url: var("STOREKEEPER_USER_PHOTO_URL"),
        });
        Self::new(identity)
    }
}

#[async_trait]
impl AuthSession for StaticAuth {
    fn current_identity(&self) -> Option<Identity> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn login(&self) -> Result<Identity, AuthError> {
        let identity = self.configured.clone().ok_or(AuthError::NotConfigured)?;
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(identity.clone());
        Ok(identity)
    }

    async fn logout(&self) -> Result<(), AuthError> {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}
