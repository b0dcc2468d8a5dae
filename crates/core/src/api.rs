//! Thin HTTP client for the token endpoint, the admin API and the instance
//! data API.
//!
//! Every method issues exactly one request and maps the platform's success
//! conventions to `Ok`, anything else to [`SbxError`]. No retries, no caching.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use sbxctl_types::{
    ActivationRequest, AdminEnvelope, CodeVersion, DataEnvelope, FaultEnvelope, OperationRequest,
    RealmUsage, Sandbox, SandboxOperation,
};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::debug;

use crate::{
    config::{Credentials, Endpoints},
    error::{Result, SbxError},
    timerange::DateRange,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Body code the admin API uses for successful reads
const ADMIN_OK: u16 = 200;

/// Body code the admin API uses for accepted operations
const ADMIN_ACCEPTED: u16 = 201;

/// Response from the client-credentials token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    endpoints: Endpoints,
}

impl ApiClient {
    pub fn new(endpoints: Endpoints) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("sbxctl/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Exchange client credentials for a bearer token.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<String> {
        debug!(url = %self.endpoints.auth_url, client_id = %credentials.client_id, "Requesting access token");
        let response = self
            .http
            .post(self.endpoints.auth_url.clone())
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| SbxError::Authentication(format!("Failed to reach token endpoint: {e}")))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(SbxError::Authentication(format!(
                "Token endpoint returned {}: {}",
                status,
                truncate(&body)
            )));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            SbxError::Authentication(format!("Failed to parse token response: {e}"))
        })?;
        debug!(expires_in = ?token.expires_in, "Received access token");

        token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                SbxError::Authentication("Token response has no access_token".to_string())
            })
    }

    pub async fn list_sandboxes(&self, token: &str) -> Result<Vec<Sandbox>> {
        let url = self.endpoints.admin("sandboxes");
        debug!(%url, "Listing sandboxes");
        let response = self.http.get(&url).bearer_auth(token).send().await?;
        let envelope = admin_envelope::<Vec<Sandbox>>(response, ADMIN_OK).await?;
        envelope
            .data
            .ok_or_else(|| SbxError::api(ADMIN_OK, "Sandbox list has no data"))
    }

    pub async fn get_sandbox(&self, token: &str, sandbox_id: &str) -> Result<Sandbox> {
        let url = self.endpoints.admin(&format!("sandboxes/{sandbox_id}"));
        debug!(%url, "Fetching sandbox");
        let response = self.http.get(&url).bearer_auth(token).send().await?;
        let envelope = admin_envelope::<Sandbox>(response, ADMIN_OK).await?;
        envelope
            .data
            .ok_or_else(|| SbxError::api(ADMIN_OK, format!("Sandbox {sandbox_id} has no data")))
    }

    /// Issue a lifecycle operation. Accepted only on HTTP 200/201 with body code 201.
    pub async fn sandbox_operation(
        &self,
        token: &str,
        sandbox_id: &str,
        operation: SandboxOperation,
    ) -> Result<()> {
        let url = self
            .endpoints
            .admin(&format!("sandboxes/{sandbox_id}/operations"));
        debug!(%url, %operation, "Posting sandbox operation");
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&OperationRequest { operation })
            .send()
            .await?;

        let status = response.status();
        let accepted_status = status == StatusCode::OK || status == StatusCode::CREATED;
        let envelope = parse_admin::<serde_json::Value>(status, response).await?;
        if accepted_status && envelope.code == ADMIN_ACCEPTED {
            Ok(())
        } else {
            Err(admin_failure(status, &envelope))
        }
    }

    pub async fn realm_usage(
        &self,
        token: &str,
        realm: &str,
        range: &DateRange,
    ) -> Result<RealmUsage> {
        let url = self.endpoints.admin(&format!("realms/{realm}/usage"));
        let from = range.from_param();
        let to = range.to_param();
        debug!(%url, %from, %to, "Fetching realm usage");
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(&[("from", from.as_str()), ("to", to.as_str())])
            .send()
            .await?;
        let envelope = admin_envelope::<RealmUsage>(response, ADMIN_OK).await?;
        envelope
            .data
            .ok_or_else(|| {
                SbxError::api(ADMIN_OK, format!("Usage of realm {realm} has no data"))
            })
    }

    pub async fn list_code_versions(&self, token: &str, host: &str) -> Result<Vec<CodeVersion>> {
        let url = self.endpoints.instance(host, "code_versions");
        debug!(%url, "Listing code versions");
        let response = self.http.get(&url).bearer_auth(token).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(fault(status, response).await);
        }
        let envelope: DataEnvelope<CodeVersion> = response.json().await?;
        Ok(envelope.data)
    }

    pub async fn activate_code_version(
        &self,
        token: &str,
        host: &str,
        version_id: &str,
    ) -> Result<()> {
        let url = self
            .endpoints
            .instance(host, &format!("code_versions/{version_id}"));
        debug!(%url, "Activating code version");
        let response = self
            .http
            .patch(&url)
            .bearer_auth(token)
            .json(&ActivationRequest { active: true })
            .send()
            .await?;
        let status = response.status();
        if status == StatusCode::OK {
            Ok(())
        } else {
            Err(fault(status, response).await)
        }
    }
}

/// Decode an admin envelope and require `expected` as body code.
async fn admin_envelope<T: DeserializeOwned>(
    response: Response,
    expected: u16,
) -> Result<AdminEnvelope<T>> {
    let status = response.status();
    let envelope = parse_admin::<T>(status, response).await?;
    if envelope.code == expected {
        Ok(envelope)
    } else {
        Err(admin_failure(status, &envelope))
    }
}

async fn parse_admin<T: DeserializeOwned>(
    status: StatusCode,
    response: Response,
) -> Result<AdminEnvelope<T>> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| {
        SbxError::api(
            status.as_u16(),
            format!("Unexpected response body ({e}): {}", truncate(&body)),
        )
    })
}

fn admin_failure<T>(status: StatusCode, envelope: &AdminEnvelope<T>) -> SbxError {
    let code = if envelope.code != 0 {
        envelope.code
    } else {
        status.as_u16()
    };
    let message = envelope
        .error_message()
        .map(str::to_string)
        .or_else(|| envelope.status.clone())
        .unwrap_or_else(|| status.to_string());
    SbxError::api(code, message)
}

async fn fault(status: StatusCode, response: Response) -> SbxError {
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<FaultEnvelope>(&body)
        .ok()
        .and_then(|envelope| envelope.fault)
        .and_then(|fault| fault.message)
        .unwrap_or_else(|| {
            if body.is_empty() {
                status.to_string()
            } else {
                truncate(&body).to_string()
            }
        });
    SbxError::api(status.as_u16(), message)
}

fn truncate(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
