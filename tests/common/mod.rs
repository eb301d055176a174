//! In-memory doubles for the document store and identity provider,
//! with call recording so tests can assert which provider calls happened.

use async_trait::async_trait;
use employee_sync::employee::{EmployeeRecord, UserProfile};
use employee_sync::identity::{IdentityAccount, IdentityError, IdentityProvider, Lookup};
use employee_sync::store::{DocumentStore, StoreError};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeStore {
    pub employees: Mutex<Vec<EmployeeRecord>>,
    /// Profiles by uid, as merge-upserted.
    pub profiles: Mutex<HashMap<String, UserProfile>>,
    /// (employee key, uid) pairs, one per link_employee call.
    pub links: Mutex<Vec<(String, String)>>,
    /// (uid, profile) pairs, one per upsert call.
    pub upserts: Mutex<Vec<(String, UserProfile)>>,
    pub fail_listing: bool,
    /// Employee keys whose link_employee call should fail.
    pub fail_link_for: Vec<String>,
}

impl FakeStore {
    pub fn with_employees(employees: Vec<EmployeeRecord>) -> Self {
        Self {
            employees: Mutex::new(employees),
            ..Default::default()
        }
    }
}

#[async_trait]
impl DocumentStore for FakeStore {
    async fn list_employees(&self) -> Result<Vec<EmployeeRecord>, StoreError> {
        if self.fail_listing {
            return Err(StoreError::Api {
                operation: "list employees".to_string(),
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        Ok(self.employees.lock().unwrap().clone())
    }

    async fn link_employee(&self, key: &str, uid: &str) -> Result<(), StoreError> {
        if self.fail_link_for.iter().any(|k| k == key) {
            return Err(StoreError::Api {
                operation: "link employee".to_string(),
                status: 500,
                message: format!("injected failure for {key}"),
            });
        }
        self.links
            .lock()
            .unwrap()
            .push((key.to_string(), uid.to_string()));
        let mut employees = self.employees.lock().unwrap();
        if let Some(record) = employees.iter_mut().find(|r| r.key == key) {
            record.uid = Some(uid.to_string());
        }
        Ok(())
    }

    async fn upsert_user_profile(
        &self,
        uid: &str,
        profile: &UserProfile,
    ) -> Result<(), StoreError> {
        self.upserts
            .lock()
            .unwrap()
            .push((uid.to_string(), profile.clone()));
        self.profiles
            .lock()
            .unwrap()
            .insert(uid.to_string(), profile.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeIdentity {
    /// Accounts by email.
    pub accounts: Mutex<HashMap<String, IdentityAccount>>,
    pub lookup_calls: Mutex<Vec<String>>,
    pub create_calls: Mutex<Vec<String>>,
    /// Emails whose lookup should fail with a non-not-found error.
    pub fail_lookup_for: Vec<String>,
    next_uid: Mutex<u32>,
}

impl FakeIdentity {
    pub fn with_accounts(accounts: Vec<IdentityAccount>) -> Self {
        Self {
            accounts: Mutex::new(
                accounts
                    .into_iter()
                    .map(|a| (a.email.clone(), a))
                    .collect(),
            ),
            ..Default::default()
        }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn find_by_email(&self, email: &str) -> Result<Lookup, IdentityError> {
        self.lookup_calls.lock().unwrap().push(email.to_string());
        if self.fail_lookup_for.iter().any(|e| e == email) {
            return Err(IdentityError::Api {
                operation: "account lookup".to_string(),
                status: 500,
                message: "injected network failure".to_string(),
            });
        }
        match self.accounts.lock().unwrap().get(email) {
            Some(account) => Ok(Lookup::Found(account.clone())),
            None => Ok(Lookup::NotFound),
        }
    }

    async fn create_account(&self, email: &str) -> Result<IdentityAccount, IdentityError> {
        self.create_calls.lock().unwrap().push(email.to_string());
        let mut next = self.next_uid.lock().unwrap();
        *next += 1;
        let account = IdentityAccount {
            uid: format!("new-uid-{}", *next),
            email: email.to_string(),
        };
        self.accounts
            .lock()
            .unwrap()
            .insert(email.to_string(), account.clone());
        Ok(account)
    }
}

pub fn employee(key: &str, email: Option<&str>, uid: Option<&str>) -> EmployeeRecord {
    EmployeeRecord {
        key: key.to_string(),
        email: email.map(str::to_string),
        uid: uid.map(str::to_string),
    }
}
