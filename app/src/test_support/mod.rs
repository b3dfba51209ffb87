//! Test doubles shared by unit and integration tests.

mod clock;
mod gated_collection;

pub use clock::MutableClock;
pub use gated_collection::GatedHuntCollection;
