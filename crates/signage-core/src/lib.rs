//! Signage - Core Library
//!
//! Domain types, project configuration and the applet upload sync engine
//! shared by the signage CLI.

pub mod boilerplate;
pub mod checksum;
pub mod config;
pub mod error;
pub mod files;
pub mod planner;
pub mod ports;
pub mod snapshot;
pub mod sync;
pub mod types;
pub mod utils;

pub use config::*;
pub use error::*;
pub use planner::{FileAction, SyncPlan};
pub use ports::*;
pub use snapshot::RemoteFileSnapshot;
pub use sync::{SyncExecutor, SyncPhase, SyncReport};
pub use types::*;
