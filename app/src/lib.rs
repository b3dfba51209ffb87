//! Scavenger-hunt client core: hunt store, sync controller, and adapters.

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Request-scoped trace identifier carried by every domain error.
pub use domain::TraceId;
