//! Document store abstraction and the Firestore-backed implementation.

mod firestore;

pub use firestore::FirestoreStore;

use crate::employee::{EmployeeRecord, UserProfile};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{operation} failed with status {status}: {message}")]
    Api {
        operation: String,
        status: u16,
        message: String,
    },

    #[error("unexpected response from document store: {0}")]
    Decode(String),
}

/// Operations this tool needs from the document database.
///
/// Implementations are injected into the sync run so tests can substitute
/// in-memory doubles.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch the full `employees` collection in one listing call.
    async fn list_employees(&self) -> Result<Vec<EmployeeRecord>, StoreError>;

    /// Patch the `uid` field of one employee document. Other fields are
    /// left untouched.
    async fn link_employee(&self, key: &str, uid: &str) -> Result<(), StoreError>;

    /// Merge-upsert the profile document at `users/{uid}`, creating it if
    /// absent and leaving unrelated fields in place.
    async fn upsert_user_profile(&self, uid: &str, profile: &UserProfile)
        -> Result<(), StoreError>;
}
