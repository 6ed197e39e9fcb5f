//! Chatbot Configuration Model
//!
//! The data model behind the chatbot builder, and every pure operation on it.
//!
//! # Core Concepts
//!
//! - [`Configuration`]: the mutable aggregate root, with an append-only
//!   history of [`VersionRecord`]s
//! - [`EngineConfig`]: closed sum type over execution backend kinds
//! - [`PresentationBlob`]: opaque, fingerprinted styling payload
//! - [`IdentityMigrator`]: rewrites legacy ids on load
//! - [`VersioningEngine`]: draft -> version -> publish transitions
//! - [`DeploymentDescriptorGenerator`]: deterministic embed snippets
//!
//! # Example
//!
//! ```rust,ignore
//! use studio_model::{Configuration, VersioningEngine};
//!
//! let mut config = Configuration::create_default("Support Bot");
//! config.website = "https://example.com".into();
//!
//! let engine = VersioningEngine::new("alice");
//! engine.save(&mut config, "first draft");
//! engine.publish(&mut config)?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod deployment;
pub mod document;
pub mod embed;
pub mod engine;
pub mod error;
pub mod hash;
pub mod ids;
pub mod migrate;
pub mod presentation;
pub mod validate;
pub mod version;
pub mod versioning;

pub use config::{ConfigSnapshot, Configuration, PersistenceState, DEFAULT_AUTHOR};
pub use deployment::{Deployment, DeploymentSurface, WidgetPosition};
pub use document::{export_document, import_document};
pub use embed::{loader_url, DeploymentDescriptorGenerator};
pub use engine::{BehaviorParams, EndpointAuth, EngineConfig, EngineKind};
pub use error::{ImportError, ModelError};
pub use hash::{ContentHash, FingerprintBuilder, HashError};
pub use ids::{ChatbotId, VersionId};
pub use migrate::{IdRewrite, IdentityMigrator, MigrationOutcome};
pub use presentation::PresentationBlob;
pub use validate::{validate, ValidationIssue, ValidationReport};
pub use version::{next_label, VersionRecord, INITIAL_VERSION};
pub use versioning::{PublishState, VersioningEngine, VersioningError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
