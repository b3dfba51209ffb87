//! Driven ports for the hosted backend.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_provider;
mod hunt_collection;
mod live_query;

#[cfg(test)]
pub use auth_provider::MockAuthProvider;
pub use auth_provider::{AuthProvider, AuthProviderError, FixtureAuthProvider};
#[cfg(test)]
pub use hunt_collection::MockHuntCollection;
pub use hunt_collection::{
    FIXTURE_HUNT_ID, FixtureHuntCollection, HuntCollection, HuntCollectionError,
};
pub use live_query::{LiveQuery, LiveQueryFeed};
