//! Domain types for employee records and the derived user profile.

/// Role written onto every synced user profile.
pub const EMPLOYEE_ROLE: &str = "employee";

/// Snapshot of an employee document as read from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeRecord {
    /// Opaque document key (often numeric-looking, e.g. "42" or "emp-42").
    pub key: String,
    pub email: Option<String>,
    /// Linked identity id. Once set, the record is resolved and is never
    /// reprocessed.
    pub uid: Option<String>,
}

/// Employee identifier as stored on the user profile: the document key,
/// as an integer when the whole key parses as one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmployeeId {
    Number(i64),
    Key(String),
}

impl EmployeeId {
    /// Parse a document key. `"42"` becomes `Number(42)`; anything that is
    /// not entirely an integer (e.g. `"emp-42"`) keeps the raw key.
    pub fn from_key(key: &str) -> Self {
        key.parse::<i64>()
            .map(Self::Number)
            .unwrap_or_else(|_| Self::Key(key.to_string()))
    }
}

/// Minimal profile mirrored into the `users` collection for each resolved
/// employee. Fields are merged on write; nothing else on the profile
/// document is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub email: String,
    pub employee_id: EmployeeId,
    pub role: String,
}

impl UserProfile {
    /// Build the profile derived from an employee record.
    pub fn for_employee(email: impl Into<String>, key: &str) -> Self {
        Self {
            email: email.into(),
            employee_id: EmployeeId::from_key(key),
            role: EMPLOYEE_ROLE.to_string(),
        }
    }
}
