//! Shared helper utilities for hunt integration tests.
//!
//! Integration tests compile as separate crates, so the runtime wrapper and
//! list assertions used by every BDD world live here.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use hunts::domain::{HuntList, HuntListReader, UserId};
use hunts::test_support::MutableClock;
use tokio::runtime::Runtime;

/// How long a step waits for a snapshot to reach the store.
pub const SNAPSHOT_WAIT: Duration = Duration::from_secs(2);

/// Wrapper for the non-Clone runtime handle.
#[derive(Clone)]
pub struct RuntimeHandle(pub Arc<Runtime>);

impl RuntimeHandle {
    pub fn new() -> Self {
        Self(Arc::new(Runtime::new().expect("create runtime")))
    }
}

/// Clock pinned to a fixed morning so timestamps are predictable.
pub fn test_clock() -> Arc<MutableClock> {
    let start = Utc
        .with_ymd_and_hms(2025, 6, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    Arc::new(MutableClock::new(start))
}

/// Strip the quotes Gherkin leaves around placeholder values.
pub fn unquote(raw: &str) -> &str {
    raw.trim_matches('"')
}

pub fn uid(raw: &str) -> UserId {
    UserId::new(unquote(raw)).expect("valid uid")
}

pub fn hunt_names(list: &HuntList) -> Vec<String> {
    list.items()
        .iter()
        .map(|hunt| hunt.name().to_string())
        .collect()
}

/// Parse `"Second, First"` into the names it lists.
pub fn expected_names(raw: &str) -> Vec<String> {
    unquote(raw)
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Wait until the list satisfies `predicate`, then return the latest list.
///
/// Returns the current list on timeout so the caller's assertion reports
/// what the store actually holds.
pub fn settle_list(
    runtime: &RuntimeHandle,
    mut reader: HuntListReader,
    predicate: impl FnMut(&HuntList) -> bool,
) -> HuntList {
    runtime.0.block_on(async {
        let _ = tokio::time::timeout(SNAPSHOT_WAIT, reader.wait_for(predicate)).await;
    });
    reader.current()
}
