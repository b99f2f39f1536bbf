//! Bidirectional synchronization engine between the Farmhouse task store and
//! a CalDAV calendar collection.
//!
//! The engine is pull-on-timer: an external scheduler calls
//! [`SyncEngine::run_cycle`] once per interval. One cycle connects, fetches
//! the complete remote listing, pushes local records, detects remote-side
//! deletions, and pulls externally-created objects, returning a
//! [`SyncReport`] with per-item failures absorbed into its error count.
//!
//! The local task store and the trigger mechanism are collaborators behind
//! the [`store::TaskStore`] trait and the single `run_cycle` entry point;
//! this crate owns only the mapping between local record ids and remote
//! object identifiers.

pub mod caldav;
pub mod config;
pub mod remote;
pub mod store;
pub mod sync;

pub use caldav::CalDavRemote;
pub use config::SyncConfig;
pub use remote::{Lookup, RemoteCalendar};
pub use store::TaskStore;
pub use sync::{SyncEngine, SyncReport};
