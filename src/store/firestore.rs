//! Firestore REST client implementing [`DocumentStore`].
//!
//! Talks to the Firestore v1 REST API. Partial updates and the profile
//! merge-upsert both use `PATCH` with an explicit update mask: masked
//! fields are written, everything else on the document is preserved, and
//! the document is created when it does not exist.

use super::{DocumentStore, StoreError};
use crate::employee::{EmployeeId, EmployeeRecord, UserProfile};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

const DEFAULT_HOST: &str = "https://firestore.googleapis.com";

const EMPLOYEES_COLLECTION: &str = "employees";
const USERS_COLLECTION: &str = "users";

/// A Firestore typed value. Only the kinds this tool reads or writes are
/// modeled; anything else decodes into `Other` and is ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum TypedValue {
    #[serde(rename = "stringValue")]
    String(String),
    /// Firestore serializes int64 as a JSON string.
    #[serde(rename = "integerValue")]
    Integer(String),
    #[serde(untagged)]
    Other(serde_json::Value),
}

#[derive(Debug, Deserialize)]
struct Document {
    /// Full resource name; the document key is the last path segment.
    name: String,
    #[serde(default)]
    fields: HashMap<String, TypedValue>,
}

#[derive(Debug, Deserialize)]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
}

#[derive(Debug, Serialize)]
struct WriteDocument {
    fields: HashMap<&'static str, TypedValue>,
}

/// Firestore-backed [`DocumentStore`].
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    client: Client,
    /// Base URL up to and including the `documents` segment.
    base_url: String,
    access_token: Option<String>,
}

impl FirestoreStore {
    /// Client against the production Firestore endpoint.
    pub fn new(project_id: &str, access_token: Option<String>) -> Self {
        Self::with_host(DEFAULT_HOST, project_id, access_token)
    }

    /// Client against an explicit host, e.g. a local emulator.
    pub fn with_host(host: &str, project_id: &str, access_token: Option<String>) -> Self {
        let base_url = format!(
            "{}/v1/projects/{}/databases/(default)/documents",
            host.trim_end_matches('/'),
            project_id
        );
        Self {
            client: Client::new(),
            base_url,
            access_token,
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn check(response: Response, operation: &str) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(StoreError::Api {
            operation: operation.to_string(),
            status: status.as_u16(),
            message,
        })
    }

    async fn patch_fields(
        &self,
        collection: &str,
        key: &str,
        fields: HashMap<&'static str, TypedValue>,
        operation: &str,
    ) -> Result<(), StoreError> {
        let url = format!("{}/{}/{}", self.base_url, collection, key);
        let mask: Vec<(&str, &str)> = fields
            .keys()
            .map(|name| ("updateMask.fieldPaths", *name))
            .collect();

        debug!("PATCH {}/{} fields {:?}", collection, key, fields.keys());
        let response = self
            .authorize(self.client.patch(&url))
            .query(&mask)
            .json(&WriteDocument { fields })
            .send()
            .await?;
        Self::check(response, operation).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn list_employees(&self) -> Result<Vec<EmployeeRecord>, StoreError> {
        let url = format!("{}/{}", self.base_url, EMPLOYEES_COLLECTION);
        let response = self.authorize(self.client.get(&url)).send().await?;
        let response = Self::check(response, "list employees").await?;
        let listing: ListDocumentsResponse = response.json().await?;

        listing.documents.into_iter().map(employee_from_doc).collect()
    }

    async fn link_employee(&self, key: &str, uid: &str) -> Result<(), StoreError> {
        let fields = HashMap::from([("uid", TypedValue::String(uid.to_string()))]);
        self.patch_fields(EMPLOYEES_COLLECTION, key, fields, "link employee")
            .await
    }

    async fn upsert_user_profile(
        &self,
        uid: &str,
        profile: &UserProfile,
    ) -> Result<(), StoreError> {
        let employee_id = match &profile.employee_id {
            EmployeeId::Number(n) => TypedValue::Integer(n.to_string()),
            EmployeeId::Key(key) => TypedValue::String(key.clone()),
        };
        let fields = HashMap::from([
            ("email", TypedValue::String(profile.email.clone())),
            ("employeeId", employee_id),
            ("role", TypedValue::String(profile.role.clone())),
        ]);
        self.patch_fields(USERS_COLLECTION, uid, fields, "upsert user profile")
            .await
    }
}

fn employee_from_doc(doc: Document) -> Result<EmployeeRecord, StoreError> {
    let key = doc
        .name
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| StoreError::Decode(format!("document with empty name: {:?}", doc.name)))?
        .to_string();

    Ok(EmployeeRecord {
        key,
        email: string_field(&doc.fields, "email"),
        uid: string_field(&doc.fields, "uid"),
    })
}

fn string_field(fields: &HashMap<String, TypedValue>, name: &str) -> Option<String> {
    match fields.get(name) {
        Some(TypedValue::String(value)) => Some(value.clone()),
        _ => None,
    }
}
