//! Domain primitives, the Hunt Store, and the Hunt Sync Controller.
//!
//! Purpose: keep hunt validation, ownership rules, and subscription
//! lifecycle independent of the hosted backend. Adapters reach the domain
//! only through the traits in [`ports`].
//!
//! Public surface:
//! - Hunt, HuntId, HuntName, NewHunt: the sole domain entity and its parts.
//! - HuntStore, HuntList, HuntListReader: the local ordered view.
//! - HuntSyncController, SyncPhase: subscription and write orchestration.
//! - SessionManager, SessionState, SignInCredentials: session handling.
//! - Error, ErrorCode: transport-agnostic failures shown to the user.

pub mod alerts;
pub mod auth;
pub mod delete_confirmation;
pub mod detail;
pub mod error;
pub mod hunt;
pub mod navigation;
pub mod ports;
pub mod session;
pub mod store;
pub mod sync_controller;
pub mod trace_id;
pub mod user;

pub use self::alerts::{HuntAlert, HuntIntent, HuntNameRejectionReason};
pub use self::auth::{SessionManager, SignInCredentials, SignInFailure, SignInValidationError};
pub use self::delete_confirmation::DeleteConfirmation;
pub use self::detail::{DetailUpdate, HuntDetailWatch};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::hunt::{HUNT_NAME_MAX, Hunt, HuntId, HuntName, HuntValidationError, NewHunt};
pub use self::navigation::Navigation;
pub use self::session::SessionState;
pub use self::store::{HuntList, HuntListReader, HuntStore};
pub use self::sync_controller::{HuntSyncController, SyncPhase};
pub use self::trace_id::TraceId;
pub use self::user::{USER_ID_MAX, UserId, UserValidationError};

