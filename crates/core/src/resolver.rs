//! Maps what the user typed to the entities it names.
//!
//! A sandbox matches when the query is a substring of its host name or
//! equals its id. Several matches are normal: `stop dev-` stops every
//! sandbox whose host name contains `dev-`.

use sbxctl_types::{CodeVersion, Sandbox};
use tracing::debug;

use crate::{error::Result, registry::Registry};

/// Sandboxes matching `find`, in the order of `sandboxes`.
pub fn matching_sandboxes(find: &str, sandboxes: &[Sandbox]) -> Vec<Sandbox> {
    sandboxes
        .iter()
        .filter(|sandbox| sandbox.matches(find))
        .cloned()
        .collect()
}

/// The most recently modified code version whose id contains `find`.
///
/// `versions` is expected oldest first, as returned by the registry.
pub fn latest_code_version_matching<'v>(
    find: &str,
    versions: &'v [CodeVersion],
) -> Option<&'v CodeVersion> {
    versions.iter().rev().find(|version| version.id.contains(find))
}

#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    registry: Registry<'a>,
}

impl<'a> Resolver<'a> {
    pub fn new(registry: Registry<'a>) -> Self {
        Self { registry }
    }

    /// Sandboxes matching `find` from the cached list.
    ///
    /// When nothing matches the list is refreshed once, in case the sandbox
    /// was created after the list was cached. An empty result is not an error.
    pub async fn resolve(&self, find: &str) -> Result<Vec<Sandbox>> {
        let cached = self.registry.get_sandboxes(false).await?;
        let matches = matching_sandboxes(find, &cached);
        if !matches.is_empty() {
            debug!(find, count = matches.len(), "Resolved sandboxes from cache");
            return Ok(matches);
        }

        debug!(find, "No cached sandbox matches, refreshing list");
        let fresh = self.registry.get_sandboxes(true).await?;
        Ok(matching_sandboxes(find, &fresh))
    }
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
            state: SandboxState::Stopped,
            created_at: None,
            created_by: None,
            links: Default::default(),
        }
    }

    fn version(id: &str, modified: &str, active: bool) -> CodeVersion {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "active": active,
            "last_modification_time": modified,
        }))
        .unwrap()
    }

    fn fleet() -> Vec<Sandbox> {
        vec![
            sandbox("1f0c", "zzzz-001.dx.example.com"),
            sandbox("abc", "zzzz-002.dx.example.com"),
            sandbox("9e2d", "zzzz-abc.dx.example.com"),
            sandbox("77aa", "yyyy-003.dx.example.com"),
        ]
    }

    #[test]
    fn test_matches_host_substring_and_exact_id() {
        let matches = matching_sandboxes("abc", &fleet());
        let ids: Vec<_> = matches.iter().map(|s| s.id.as_str()).collect();
        // id "abc" matches exactly, "zzzz-abc" by host name; order preserved
        assert_eq!(ids, vec!["abc", "9e2d"]);
    }

    #[test]
    fn test_shared_prefix_selects_many() {
        let matches = matching_sandboxes("zzzz-", &fleet());
        assert_eq!(matches.len(), 3);
    }

    #[test]
    fn test_partial_id_does_not_match() {
        assert!(matching_sandboxes("1f", &fleet()).is_empty());
        assert_eq!(matching_sandboxes("1f0c", &fleet()).len(), 1);
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(matching_sandboxes("nope", &fleet()).is_empty());
        assert!(matching_sandboxes("zzzz", &[]).is_empty());
    }

    #[test]
    fn test_latest_code_version_wins() {
        let versions = vec![
            version("release-1", "2024-01-01T00:00:00Z", false),
            version("release-2", "2024-02-01T00:00:00Z", true),
            version("hotfix-2a", "2024-02-10T00:00:00Z", false),
            version("release-3", "2024-03-01T00:00:00Z", false),
        ];

        let found = latest_code_version_matching("release", &versions).unwrap();
        assert_eq!(found.id, "release-3");

        let found = latest_code_version_matching("2", &versions).unwrap();
        assert_eq!(found.id, "hotfix-2a");

        assert!(latest_code_version_matching("missing", &versions).is_none());
        // the input order is untouched
        assert_eq!(versions[0].id, "release-1");
    }
}
