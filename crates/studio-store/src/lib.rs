//! Configuration Persistence
//!
//! Remote-first, local-fallback storage for chatbot configurations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │       PersistenceCoordinator        │
//! │  in-flight guard · version stamping │
//! └──────┬──────────────────────┬───────┘
//!        │ create / update      │ upsert (always)
//!        ▼                      ▼
//! ┌──────────────┐     ┌─────────────────┐
//! │ RemoteStore  │     │ LocalRepository │
//! │ (HTTP/JSON)  │     │  one JSON slot  │
//! └──────────────┘     └─────────────────┘
//! ```
//!
//! Remote failures degrade a commit to a local write and are reported as a
//! warning. A failed local write is the only fatal outcome.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod coordinator;
pub mod error;
pub mod http;
pub mod remote;
pub mod repository;
pub mod slot;

pub use coordinator::{CommitLocation, CommitOutcome, PersistenceCoordinator, PullReport};
pub use error::{RemoteError, SlotError, StoreError};
pub use http::HttpRemoteStore;
pub use remote::{OfflineRemote, RemoteStore};
pub use repository::{LocalRepository, DEFAULT_CACHE_KEY};
pub use slot::{FileSlot, MemorySlot, SlotStorage};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
