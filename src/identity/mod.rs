//! Identity provider abstraction and the Firebase Auth implementation.

mod firebase;

pub use firebase::FirebaseIdentity;

use async_trait::async_trait;
use thiserror::Error;

/// An authentication account as held by the identity provider. At most
/// one account exists per email; that guarantee belongs to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityAccount {
    /// Provider-assigned unique id.
    pub uid: String,
    pub email: String,
}

/// Outcome of an email lookup. "Not found" is expected control flow, not
/// an error: resolution creates an account on `NotFound` and propagates
/// every [`IdentityError`] untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(IdentityAccount),
    NotFound,
}

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{operation} failed with status {status}: {message}")]
    Api {
        operation: String,
        status: u16,
        message: String,
    },

    #[error("unexpected response from identity provider: {0}")]
    Decode(String),
}

/// Operations this tool needs from the authentication service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Look up an account by email, distinguishing "no such account" from
    /// failure.
    async fn find_by_email(&self, email: &str) -> Result<Lookup, IdentityError>;

    /// Create an account for the given email, returning its assigned id.
    async fn create_account(&self, email: &str) -> Result<IdentityAccount, IdentityError>;
}
