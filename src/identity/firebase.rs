//! Firebase Auth (Identity Toolkit) REST client implementing
//! [`IdentityProvider`].

use super::{IdentityAccount, IdentityError, IdentityProvider, Lookup};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

const DEFAULT_HOST: &str = "https://identitytoolkit.googleapis.com";

/// Error message the Identity Toolkit API uses to signal a missing user
/// on lookup.
const USER_NOT_FOUND: &str = "USER_NOT_FOUND";

#[derive(Debug, Deserialize)]
struct UserInfo {
    #[serde(rename = "localId")]
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<UserInfo>,
}

#[derive(Debug, Deserialize)]
struct SignUpResponse {
    #[serde(rename = "localId")]
    local_id: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    error: ApiErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

/// Firebase Auth-backed [`IdentityProvider`].
#[derive(Debug, Clone)]
pub struct FirebaseIdentity {
    client: Client,
    /// Base URL up to and including the project segment.
    base_url: String,
    access_token: Option<String>,
}

impl FirebaseIdentity {
    /// Client against the production Identity Toolkit endpoint.
    pub fn new(project_id: &str, access_token: Option<String>) -> Self {
        Self::with_host(DEFAULT_HOST, project_id, access_token)
    }

    /// Client against an explicit host, e.g. a local emulator.
    pub fn with_host(host: &str, project_id: &str, access_token: Option<String>) -> Self {
        let base_url = format!(
            "{}/v1/projects/{}",
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

    async fn api_error(response: Response, operation: &str) -> IdentityError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        IdentityError::Api {
            operation: operation.to_string(),
            status,
            message,
        }
    }
}

#[async_trait]
impl IdentityProvider for FirebaseIdentity {
    async fn find_by_email(&self, email: &str) -> Result<Lookup, IdentityError> {
        let url = format!("{}/accounts:lookup", self.base_url);
        let response = self
            .authorize(self.client.post(&url))
            .json(&json!({ "email": [email] }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            // Some API surfaces signal a missing user with an error payload
            // rather than an empty result set.
            if status == StatusCode::BAD_REQUEST || status == StatusCode::NOT_FOUND {
                let body = response.text().await.unwrap_or_default();
                if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(&body) {
                    if parsed.error.message.starts_with(USER_NOT_FOUND) {
                        return Ok(Lookup::NotFound);
                    }
                }
                return Err(IdentityError::Api {
                    operation: "account lookup".to_string(),
                    status: status.as_u16(),
                    message: body,
                });
            }
            return Err(Self::api_error(response, "account lookup").await);
        }

        let lookup: LookupResponse = response.json().await?;
        match lookup.users.into_iter().next() {
            Some(user) => {
                debug!("lookup hit for {}: uid {}", email, user.local_id);
                Ok(Lookup::Found(IdentityAccount {
                    uid: user.local_id,
                    email: user.email.unwrap_or_else(|| email.to_string()),
                }))
            }
            None => Ok(Lookup::NotFound),
        }
    }

    async fn create_account(&self, email: &str) -> Result<IdentityAccount, IdentityError> {
        let url = format!("{}/accounts", self.base_url);
        let response = self
            .authorize(self.client.post(&url))
            .json(&json!({ "email": email }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response, "account create").await);
        }

        let created: SignUpResponse = response.json().await?;
        debug!("created account {} for {}", created.local_id, email);
        Ok(IdentityAccount {
            uid: created.local_id,
            email: email.to_string(),
        })
    }
}
