//! In-memory hosted-backend adapters.

mod auth_provider;
mod hunt_collection;

pub use auth_provider::InMemoryAuthProvider;
pub use hunt_collection::{CollectionOperation, InMemoryHuntCollection};
