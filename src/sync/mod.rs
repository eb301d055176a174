//! The reconciliation run: classify each employee record, resolve an
//! identity for the unresolved ones, and write the link back.
//!
//! Records are processed strictly one at a time. A failure while resolving
//! or writing back one record is recorded and logged, and the run moves on
//! to the next record; only a failure of the initial listing aborts the
//! whole run.

use crate::employee::{EmployeeRecord, UserProfile};
use crate::identity::{IdentityError, IdentityProvider, Lookup};
use crate::store::{DocumentStore, StoreError};
use thiserror::Error;
use tracing::{error, info};

/// Only the initial listing can fail the run as a whole.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("failed to list employees: {0}")]
    Listing(#[from] StoreError),
}

/// Failure confined to a single record.
#[derive(Error, Debug)]
enum ItemError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// How a record was classified before any provider call is made.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Disposition<'a> {
    /// No email on the record; nothing to resolve against.
    MissingEmail,
    /// A `uid` is already present; reprocessing would be a no-op, so the
    /// record is skipped outright and no provider call happens.
    AlreadyLinked,
    Unresolved { email: &'a str },
}

fn classify(record: &EmployeeRecord) -> Disposition<'_> {
    match (&record.email, &record.uid) {
        (None, _) => Disposition::MissingEmail,
        (Some(_), Some(_)) => Disposition::AlreadyLinked,
        (Some(email), None) => Disposition::Unresolved { email },
    }
}

/// Whether resolution reused an existing account or created one.
enum Resolution {
    Existing,
    Created,
}

/// A per-record failure carried in the [`SyncReport`].
#[derive(Debug, Clone)]
pub struct SyncFailure {
    pub key: String,
    pub message: String,
}

/// Counts from a completed run. `failures` holds the records whose
/// resolution or write-back failed; their presence does not make the run
/// itself a failure.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub total: usize,
    pub missing_email: usize,
    pub already_linked: usize,
    /// Linked to an account that already existed.
    pub linked_existing: usize,
    /// Linked to an account created by this run.
    pub created: usize,
    pub failures: Vec<SyncFailure>,
}

impl SyncReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Run one full reconciliation pass over the `employees` collection.
pub async fn run_sync<S, I>(store: &S, identity: &I) -> Result<SyncReport, SyncError>
where
    S: DocumentStore + ?Sized,
    I: IdentityProvider + ?Sized,
{
    let records = store.list_employees().await?;
    info!("Found {} employees", records.len());

    let mut report = SyncReport {
        total: records.len(),
        ..Default::default()
    };

    for record in &records {
        match classify(record) {
            Disposition::MissingEmail => {
                info!("Skipping {} - no email", record.key);
                report.missing_email += 1;
            }
            Disposition::AlreadyLinked => {
                info!(
                    "Skipping {} - already has a uid: {}",
                    record.key,
                    record.uid.as_deref().unwrap_or_default()
                );
                report.already_linked += 1;
            }
            Disposition::Unresolved { email } => {
                info!("Processing {} email: {}", record.key, email);
                match resolve_and_link(store, identity, record, email).await {
                    Ok(Resolution::Existing) => report.linked_existing += 1,
                    Ok(Resolution::Created) => report.created += 1,
                    Err(err) => {
                        error!("Error for {}: {}", record.key, err);
                        report.failures.push(SyncFailure {
                            key: record.key.clone(),
                            message: err.to_string(),
                        });
                    }
                }
            }
        }
    }

    Ok(report)
}

/// Resolve an identity for one unresolved record and write the link back.
///
/// Account creation happens only on a definitive [`Lookup::NotFound`];
/// any lookup error propagates to the caller's per-record boundary instead
/// of falling through to creation. Partial writes are not rolled back.
async fn resolve_and_link<S, I>(
    store: &S,
    identity: &I,
    record: &EmployeeRecord,
    email: &str,
) -> Result<Resolution, ItemError>
where
    S: DocumentStore + ?Sized,
    I: IdentityProvider + ?Sized,
{
    let (account, resolution) = match identity.find_by_email(email).await? {
        Lookup::Found(account) => {
            info!("  User exists: {}", account.uid);
            (account, Resolution::Existing)
        }
        Lookup::NotFound => {
            let account = identity.create_account(email).await?;
            info!("  Created user: {}", account.uid);
            (account, Resolution::Created)
        }
    };

    store.link_employee(&record.key, &account.uid).await?;

    let profile = UserProfile::for_employee(email, &record.key);
    store.upsert_user_profile(&account.uid, &profile).await?;

    info!("  Updated {} with uid {}", record.key, account.uid);
    Ok(resolution)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, email: Option<&str>, uid: Option<&str>) -> EmployeeRecord {
        EmployeeRecord {
            key: key.to_string(),
            email: email.map(str::to_string),
            uid: uid.map(str::to_string),
        }
    }

    #[test]
    fn classification_order_checks_email_first() {
        // A record with a uid but no email is still "missing email".
        let r = record("1", None, Some("u1"));
        assert_eq!(classify(&r), Disposition::MissingEmail);
    }

    #[test]
    fn classification_treats_uid_as_resolved() {
        let r = record("1", Some("a@x.com"), Some("u1"));
        assert_eq!(classify(&r), Disposition::AlreadyLinked);
    }

    #[test]
    fn classification_marks_unresolved_with_email() {
        let r = record("1", Some("a@x.com"), None);
        assert_eq!(classify(&r), Disposition::Unresolved { email: "a@x.com" });
    }
}
