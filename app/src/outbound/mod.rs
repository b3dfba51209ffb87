//! Outbound adapters implementing the domain ports.
//!
//! - **memory**: in-process stand-ins for the hosted document database and
//!   the authentication service. They reproduce the behaviour the domain
//!   relies on (server-assigned ids and timestamps, ordered live queries,
//!   provider error codes) and back the console host and the tests.
//!
//! Adapters translate between stored documents and domain types. They
//! contain no business rules.

pub mod memory;
