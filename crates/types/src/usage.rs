//! Realm usage and credit accounting.

use serde::{Deserialize, Serialize};

/// Usage summary for a realm over a date range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealmUsage {
    #[serde(default)]
    pub id: Option<String>,

    /// Minutes sandboxes spent in the started state
    #[serde(default)]
    pub minutes_up: u64,

    /// Minutes sandboxes spent in the stopped state
    #[serde(default)]
    pub minutes_down: u64,

    #[serde(default)]
    pub created_sandboxes: u64,

    #[serde(default)]
    pub active_sandboxes: u64,

    #[serde(default)]
    pub deleted_sandboxes: u64,
}

impl RealmUsage {
    pub fn credits(&self) -> u64 {
        credits(self.minutes_up, self.minutes_down)
    }
}

/// Credits consumed: `ceil(minutes_up + 0.3 * minutes_down)`.
///
/// Computed in tenths to stay exact. Saturates at `u64::MAX` tenths.
pub fn credits(minutes_up: u64, minutes_down: u64) -> u64 {
    let tenths = minutes_up
        .saturating_mul(10)
        .saturating_add(minutes_down.saturating_mul(3));
    tenths.div_ceil(10)
}
