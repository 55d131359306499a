//! Driven port for the current user identity.
//!
//! Authentication is external to the core; this is the only view of it the
//! ledger needs.

use async_trait::async_trait;

use crate::domain::ReviewAuthor;

/// Port returning whoever is using the app right now.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Current author, or `None` when identity cannot be established.
    async fn current_author(&self) -> Option<ReviewAuthor>;
}

/// Identity provider for sessions without any user identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIdentity;

#[async_trait]
impl IdentityProvider for NoIdentity {
    async fn current_author(&self) -> Option<ReviewAuthor> {
        None
    }
}
