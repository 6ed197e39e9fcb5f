//! Chatbot Studio Core
//!
//! The editing session: configuration, errors, and the [`Studio`] facade
//! that drives model, persistence and preview along the editor's control
//! flow.
//!
//! ```text
//! edit draft ──▶ Studio::save ──▶ PersistenceCoordinator ──▶ remote | local
//!      │               │
//!      │               └─▶ VersioningEngine (one record per commit)
//!      └──────────────────▶ PreviewSyncChannel ──▶ render surface
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod studio;

pub use config::{
    CacheConfig, ConfigError, EmbedConfig, PreviewConfig, RemoteConfig, StudioConfig,
    DEFAULT_CACHE_DIR, DEFAULT_ORIGIN,
};
pub use error::{Result, StudioError};
pub use studio::Studio;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
