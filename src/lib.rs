pub mod employee;
pub mod identity;
pub mod store;
pub mod sync;

// Re-export commonly used types
pub use employee::{EmployeeId, EmployeeRecord, UserProfile, EMPLOYEE_ROLE};
pub use identity::{FirebaseIdentity, IdentityAccount, IdentityError, IdentityProvider, Lookup};
pub use store::{DocumentStore, FirestoreStore, StoreError};
pub use sync::{run_sync, SyncError, SyncFailure, SyncReport};
