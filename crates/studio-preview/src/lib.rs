//! Live Preview Synchronization
//!
//! Projects configuration state from the editor into an isolated render
//! surface over origin-scoped message passing.
//!
//! # Protocol
//!
//! ```text
//! editor                                   surface
//!   │  config-update / preview-mode /        │
//!   │  emulator-chrome-update  ───────────▶  │  re-render if changed
//!   │                                        │
//!   │  ◀───────────  ready / preview-mode    │
//!   │  (ready => full-state resync)          │
//! ```
//!
//! Every message is complete state; there are no diffs. Unknown message
//! types are ignored by both sides.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod channel;
pub mod message;
pub mod origin;
pub mod surface;
pub mod transport;
pub mod url;

pub use channel::{InboundEvent, PreviewSource, PreviewSyncChannel};
pub use message::{DecodeError, EmulatorChrome, Envelope, PreviewMessage, SurfaceSignal};
pub use origin::{OriginError, TargetOrigin};
pub use surface::{Received, RenderSurface, SurfaceState};
pub use transport::{ChannelTransport, PreviewTransport, TransportError};
pub use url::{preview_url, DeviceHint};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
