use std::fmt;

use url::Url;

use crate::error::{Result, SbxError};

/// Token endpoint of the platform account manager
pub const DEFAULT_AUTH_URL: &str = "https://account.demandware.com/dwsso/oauth2/access_token";

/// Base URL of the sandbox admin API
pub const DEFAULT_API_URL: &str = "https://admin.dx.commercecloud.salesforce.com/api/v1";

/// OCAPI data API version used for code versions
pub const DEFAULT_OCAPI_VERSION: &str = "v21_3";

/// API client credentials used for the client-credentials grant
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    /// Build credentials, failing if either value is absent or blank.
    pub fn new(client_id: Option<String>, client_secret: Option<String>) -> Result<Self> {
        let client_id = client_id
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| SbxError::MissingConfig("client id (SBX_CLIENT_ID)".to_string()))?;
        let client_secret = client_secret
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| {
                SbxError::MissingConfig("client secret (SBX_CLIENT_SECRET)".to_string())
            })?;

        Ok(Self {
            client_id,
            client_secret,
        })
    }
}

// Keep the secret out of logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .finish()
    }
}

/// Remote endpoints the client talks to
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub auth_url: Url,
    pub api_url: Url,
    pub ocapi_version: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth_url: Url::parse(DEFAULT_AUTH_URL).expect("default auth url is valid"),
            api_url: Url::parse(DEFAULT_API_URL).expect("default api url is valid"),
            ocapi_version: DEFAULT_OCAPI_VERSION.to_string(),
        }
    }
}

impl Endpoints {
    /// Override the token endpoint
    pub fn with_auth_url(mut self, auth_url: &str) -> Result<Self> {
        self.auth_url = parse_url("auth url", auth_url)?;
        Ok(self)
    }

    /// Override the admin API base URL
    pub fn with_api_url(mut self, api_url: &str) -> Result<Self> {
        self.api_url = parse_url("api url", api_url)?;
        Ok(self)
    }

    /// Admin API URL for a path relative to the API base
    pub fn admin(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Instance data API URL for a path.
    ///
    /// `host` is either a bare host name (https is assumed) or a base URL.
    pub fn instance(&self, host: &str, path: &str) -> String {
        let base = if host.starts_with("http://") || host.starts_with("https://") {
            host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", host.trim_end_matches('/'))
        };
        format!(
            "{}/s/-/dw/data/{}/{}",
            base,
            self.ocapi_version,
            path.trim_start_matches('/')
        )
    }
}

fn parse_url(name: &str, value: &str) -> Result<Url> {
    Url::parse(value).map_err(|e| SbxError::InvalidConfig(format!("{name} '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials() {
        let err = Credentials::new(None, Some("secret".to_string())).unwrap_err();
        assert!(matches!(err, SbxError::MissingConfig(_)));

        let err = Credentials::new(Some("id".to_string()), Some("  ".to_string())).unwrap_err();
        assert!(matches!(err, SbxError::MissingConfig(_)));

        let creds = Credentials::new(Some("id".to_string()), Some("secret".to_string())).unwrap();
        assert_eq!(creds.client_id, "id");
        assert!(!format!("{creds:?}").contains("secret\""));
    }

    #[test]
    fn test_admin_url() {
        let endpoints = Endpoints::default()
            .with_api_url("http://127.0.0.1:9000/api/v1/")
            .unwrap();
        assert_eq!(
            endpoints.admin("/sandboxes"),
            "http://127.0.0.1:9000/api/v1/sandboxes"
        );
    }

    #[test]
    fn test_instance_url() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.instance("zzzz-s01.dx.example.com", "code_versions"),
            "https://zzzz-s01.dx.example.com/s/-/dw/data/v21_3/code_versions"
        );
        assert_eq!(
            endpoints.instance("http://127.0.0.1:8080/", "code_versions/v1"),
            "http://127.0.0.1:8080/s/-/dw/data/v21_3/code_versions/v1"
        );
    }

    #[test]
    fn test_invalid_url() {
        let err = Endpoints::default().with_auth_url("not a url").unwrap_err();
        assert!(matches!(err, SbxError::InvalidConfig(_)));
    }
}
