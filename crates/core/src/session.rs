use crate::{
    api::ApiClient,
    auth::TokenProvider,
    cache::ExpiringCache,
    config::{Credentials, Endpoints},
    dispatch::Dispatcher,
    error::Result,
    registry::Registry,
    resolver::Resolver,
};

/// Everything one command invocation needs, owned in one place.
///
/// Components borrow from the session for the duration of a call, so the
/// cache and HTTP client are shared without any global state.
pub struct Session {
    api: ApiClient,
    cache: ExpiringCache,
    credentials: Credentials,
}

impl Session {
    pub fn new(credentials: Credentials, endpoints: Endpoints, cache: ExpiringCache) -> Result<Self> {
        Ok(Self {
            api: ApiClient::new(endpoints)?,
            cache,
            credentials,
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn cache(&self) -> &ExpiringCache {
        &self.cache
    }

    pub fn tokens(&self) -> TokenProvider<'_> {
        TokenProvider::new(&self.api, &self.cache, &self.credentials)
    }

    pub fn registry(&self) -> Registry<'_> {
        Registry::new(&self.api, &self.cache, self.tokens())
    }

    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self.registry())
    }

    pub fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(&self.api, self.tokens(), self.registry())
    }
}
