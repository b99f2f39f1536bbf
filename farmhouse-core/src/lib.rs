//! Core types for the Farmhouse sync engine.
//!
//! This crate provides the pieces shared by the sync orchestrator and any
//! future consumers:
//! - `LocalRecord` and related types for task/event records
//! - `RemoteObject`, the decoded shape of a remote scheduling object
//! - the `ics` codec between records and wire text
//! - `identity` for the deterministic UID scheme and listing classification

pub mod category;
pub mod date_range;
pub mod error;
pub mod ics;
pub mod identity;
pub mod record;
pub mod remote_object;

pub use category::Category;
pub use date_range::DateRange;
pub use error::{SyncError, SyncResult};
pub use ics::{CodecConfig, encode_record, parse_object};
pub use identity::{RemoteIndex, local_task_id, remote_uid};
pub use record::{LocalRecord, NewRecord, RecordKind};
pub use remote_object::{ObjectKind, RemoteObject};
