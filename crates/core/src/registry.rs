use chrono::TimeDelta;
use sbxctl_types::{CodeVersion, Sandbox, sort_by_last_modified};
use tracing::debug;

use crate::{api::ApiClient, auth::TokenProvider, cache::ExpiringCache, error::Result};

/// Cache key of the sandbox list
pub const SANDBOX_LIST_CACHE_KEY: &str = "sandbox-list";

/// The sandbox list rarely changes; commands that need ground truth force a refresh
pub fn sandbox_list_ttl() -> TimeDelta {
    TimeDelta::days(14)
}

/// Source of sandboxes and code versions
#[derive(Clone, Copy)]
pub struct Registry<'a> {
    api: &'a ApiClient,
    cache: &'a ExpiringCache,
    tokens: TokenProvider<'a>,
}

impl<'a> Registry<'a> {
    pub fn new(api: &'a ApiClient, cache: &'a ExpiringCache, tokens: TokenProvider<'a>) -> Self {
        Self { api, cache, tokens }
    }

    /// All sandboxes visible to the client, sorted by host name.
    ///
    /// Served from the cache unless it is stale or `force_invalidate` is set.
    pub async fn get_sandboxes(&self, force_invalidate: bool) -> Result<Vec<Sandbox>> {
        self.cache
            .get_or_compute(
                SANDBOX_LIST_CACHE_KEY,
                sandbox_list_ttl(),
                force_invalidate,
                move || async move {
                    let token = self.tokens.get_token().await?;
                    let mut sandboxes = self.api.list_sandboxes(&token).await?;
                    sort_by_host_name(&mut sandboxes);
                    debug!(count = sandboxes.len(), "Fetched sandbox list");
                    Ok(sandboxes)
                },
            )
            .await
    }

    /// Current detail record of one sandbox, never cached.
    pub async fn get_sandbox(&self, sandbox_id: &str) -> Result<Sandbox> {
        let token = self.tokens.get_token().await?;
        self.api.get_sandbox(&token, sandbox_id).await
    }

    /// Code versions of an instance, oldest modification first, never cached.
    pub async fn get_code_versions(&self, host: &str) -> Result<Vec<CodeVersion>> {
        let token = self.tokens.get_token().await?;
        let mut versions = self.api.list_code_versions(&token, host).await?;
        sort_by_last_modified(&mut versions);
        debug!(host, count = versions.len(), "Fetched code versions");
        Ok(versions)
    }
}

pub fn sort_by_host_name(sandboxes: &mut [Sandbox]) {
    sandboxes.sort_by(|a, b| a.host_name.cmp(&b.host_name));
}

#[cfg(test)]
mod tests {
    use sbxctl_types::SandboxState;

    use super::*;

    fn sandbox(id: &str, host_name: &str) -> Sandbox {
        Sandbox {
            id: id.to_string(),
            host_name: host_name.to_string(),
            realm: "zzzz".to_string(),
            instance: None,
            state: SandboxState::Started,
            created_at: None,
            created_by: None,
            links: Default::default(),
        }
    }

    #[test]
    fn test_sort_by_host_name_for_every_permutation() {
        let hosts = ["zzzz-001.dx", "zzzz-002.dx", "aaaa-010.dx", "zzzz-010.dx"];
        let mut expected = hosts.to_vec();
        expected.sort();

        // all 24 orderings of the 4 hosts
        let mut order = [0usize, 1, 2, 3];
        let mut permutations = vec![order];
        while next_permutation(&mut order) {
            permutations.push(order);
        }
        assert_eq!(permutations.len(), 24);

        for perm in permutations {
            let mut sandboxes: Vec<_> = perm
                .iter()
                .map(|&i| sandbox(&format!("id-{i}"), hosts[i]))
                .collect();
            sort_by_host_name(&mut sandboxes);
            let sorted: Vec<_> = sandboxes.iter().map(|s| s.host_name.as_str()).collect();
            assert_eq!(sorted, expected);
        }
    }

    fn next_permutation(items: &mut [usize]) -> bool {
        let Some(i) = (1..items.len()).rev().find(|&i| items[i - 1] < items[i]) else {
            return false;
        };
        let j = (i..items.len()).rev().find(|&j| items[j] > items[i - 1]).unwrap();
        items.swap(i - 1, j);
        items[i..].reverse();
        true
    }
}
