use chrono::TimeDelta;

use crate::{api::ApiClient, cache::ExpiringCache, config::Credentials, error::Result};

/// Cache key of the bearer token
pub const TOKEN_CACHE_KEY: &str = "auth-token";

/// Lifetime in seconds the platform grants to client-credentials tokens
pub const TOKEN_LIFETIME_SECS: i64 = 1800;

/// Renew this many seconds before the platform would reject the token
pub const TOKEN_SAFETY_MARGIN_SECS: i64 = 30;

pub fn token_ttl() -> TimeDelta {
    TimeDelta::seconds(TOKEN_LIFETIME_SECS - TOKEN_SAFETY_MARGIN_SECS)
}

/// Hands out bearer tokens, re-authenticating only when the cached one is
/// close to expiry.
#[derive(Clone, Copy)]
pub struct TokenProvider<'a> {
    api: &'a ApiClient,
    cache: &'a ExpiringCache,
    credentials: &'a Credentials,
}

impl<'a> TokenProvider<'a> {
    pub fn new(api: &'a ApiClient, cache: &'a ExpiringCache, credentials: &'a Credentials) -> Self {
        Self {
            api,
            cache,
            credentials,
        }
    }

    /// Cached token, or a fresh one from the token endpoint.
    ///
    /// Authentication failures are returned as is; there is no retry.
    pub async fn get_token(&self) -> Result<String> {
        self.cache
            .get_or_compute(TOKEN_CACHE_KEY, token_ttl(), false, || {
                self.api.authenticate(self.credentials)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_is_shorter_than_token_lifetime() {
        assert!(token_ttl() < TimeDelta::seconds(TOKEN_LIFETIME_SECS));
        assert_eq!(token_ttl(), TimeDelta::seconds(1770));
    }
}
