//! Editor side of the preview protocol
//!
//! The channel owns an outbound queue. Messages are held until the render
//! surface reports `ready`; at that point, and on every later `ready`, the
//! full current state is re-sent and the queue is dropped. After that every
//! change is flushed immediately. Each message carries complete state, so a
//! queued message is replaced by a newer one of the same kind.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use studio_model::{ConfigSnapshot, Configuration, DeploymentSurface, VersioningEngine};

use crate::message::{EmulatorChrome, Envelope, PreviewMessage, SurfaceSignal};
use crate::origin::TargetOrigin;
use crate::transport::{PreviewTransport, TransportError};

/// Which state of the configuration the preview shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PreviewSource {
    /// The in-progress draft
    #[default]
    Draft,
    /// The snapshot of the latest publish marker
    LatestPublished,
}

/// What an inbound signal caused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundEvent {
    /// The surface became ready and received the full state
    Resynced { sent: usize },
    /// The surface switched the emulated deployment surface
    ModeChanged(DeploymentSurface),
}

/// Sender of configuration state to one render surface
pub struct PreviewSyncChannel {
    local_origin: TargetOrigin,
    target: TargetOrigin,
    transport: Box<dyn PreviewTransport>,
    source: PreviewSource,
    draft: Option<Configuration>,
    mode: DeploymentSurface,
    chrome: Option<EmulatorChrome>,
    outbound: VecDeque<PreviewMessage>,
    surface_ready: bool,
    torn_down: bool,
}

impl std::fmt::Debug for PreviewSyncChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewSyncChannel")
            .field("local_origin", &self.local_origin)
            .field("target", &self.target)
            .field("source", &self.source)
            .field("mode", &self.mode)
            .field("pending", &self.outbound.len())
            .field("surface_ready", &self.surface_ready)
            .field("torn_down", &self.torn_down)
            .finish_non_exhaustive()
    }
}

impl PreviewSyncChannel {
    /// Channel from `local_origin` to the surface at `target`
    pub fn new(
        local_origin: TargetOrigin,
        target: TargetOrigin,
        transport: impl PreviewTransport + 'static,
    ) -> Self {
        Self {
            local_origin,
            target,
            transport: Box::new(transport),
            source: PreviewSource::default(),
            draft: None,
            mode: DeploymentSurface::default(),
            chrome: None,
            outbound: VecDeque::new(),
            surface_ready: false,
            torn_down: false,
        }
    }

    /// Start with `source` selected
    #[inline]
    #[must_use]
    pub fn with_source(mut self, source: PreviewSource) -> Self {
        self.source = source;
        self
    }

    /// Origin every outbound envelope is addressed to
    #[inline]
    #[must_use]
    pub fn target(&self) -> &TargetOrigin {
        &self.target
    }

    /// Which snapshot is projected to the surface
    #[inline]
    #[must_use]
    pub fn source(&self) -> PreviewSource {
        self.source
    }

    /// Deployment surface the preview currently emulates
    #[inline]
    #[must_use]
    pub fn mode(&self) -> DeploymentSurface {
        self.mode
    }

    /// Whether the surface has signalled `ready`
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.surface_ready
    }

    /// Whether [`PreviewSyncChannel::teardown`] has run
    #[inline]
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Messages waiting for the surface
    #[inline]
    #[must_use]
    pub fn pending(&self) -> usize {
        self.outbound.len()
    }

    /// Project a new draft state
    ///
    /// # Errors
    /// Returns error if the surface is ready and the transport fails
    pub fn update_draft(&mut self, config: &Configuration) -> Result<(), TransportError> {
        if self.draft.is_none() {
            self.mode = config.deployment.surface;
            self.enqueue(PreviewMessage::PreviewMode { value: self.mode });
        }
        self.draft = Some(config.clone());
        if let Some(message) = self.projection() {
            self.enqueue(message);
        }
        self.flush()
    }

    /// Switch between draft and published projection
    ///
    /// Only what is sent changes; the configuration itself is untouched.
    ///
    /// # Errors
    /// Returns error if the surface is ready and the transport fails
    pub fn set_source(&mut self, source: PreviewSource) -> Result<(), TransportError> {
        self.source = source;
        if let Some(message) = self.projection() {
            self.enqueue(message);
        }
        self.flush()
    }

    /// Emulate another deployment surface
    ///
    /// # Errors
    /// Returns error if the surface is ready and the transport fails
    pub fn set_mode(&mut self, mode: DeploymentSurface) -> Result<(), TransportError> {
        self.mode = mode;
        self.enqueue(PreviewMessage::PreviewMode { value: mode });
        self.flush()
    }

    /// Restyle the wrapper around the preview
    ///
    /// # Errors
    /// Returns error if the surface is ready and the transport fails
    pub fn set_chrome(&mut self, chrome: EmulatorChrome) -> Result<(), TransportError> {
        self.chrome = Some(chrome.clone());
        self.enqueue(PreviewMessage::EmulatorChromeUpdate(chrome));
        self.flush()
    }

    /// Handle an envelope from the surface
    ///
    /// Envelopes from any other origin, or not addressed to this context,
    /// are ignored, as are unknown or malformed signals.
    ///
    /// # Errors
    /// Returns error if a resync could not be delivered
    pub fn handle_inbound(
        &mut self,
        envelope: &Envelope,
    ) -> Result<Option<InboundEvent>, TransportError> {
        if self.torn_down {
            return Ok(None);
        }
        if envelope.source_origin != self.target {
            tracing::debug!(origin = %envelope.source_origin, "ignoring signal from foreign origin");
            return Ok(None);
        }
        if envelope.target_origin != self.local_origin {
            tracing::trace!(addressed_to = %envelope.target_origin, "ignoring signal for another context");
            return Ok(None);
        }

        let signal = match SurfaceSignal::decode(&envelope.body) {
            Ok(Some(signal)) => signal,
            Ok(None) => return Ok(None),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed signal");
                return Ok(None);
            }
        };

        match signal {
            SurfaceSignal::Ready => {
                self.surface_ready = true;
                let sent = self.resync()?;
                Ok(Some(InboundEvent::Resynced { sent }))
            }
            SurfaceSignal::PreviewMode { value } => {
                self.mode = value;
                self.outbound
                    .retain(|queued| !matches!(queued, PreviewMessage::PreviewMode { .. }));
                Ok(Some(InboundEvent::ModeChanged(value)))
            }
        }
    }

    /// Send the complete current state, replacing anything queued
    ///
    /// # Errors
    /// Returns error if the transport fails
    pub fn resync(&mut self) -> Result<usize, TransportError> {
        if self.torn_down {
            return Ok(0);
        }
        self.outbound.clear();

        let mut state = Vec::with_capacity(3);
        if let Some(message) = self.projection() {
            state.push(message);
        }
        state.push(PreviewMessage::PreviewMode { value: self.mode });
        if let Some(chrome) = &self.chrome {
            state.push(PreviewMessage::EmulatorChromeUpdate(chrome.clone()));
        }

        for message in &state {
            self.post(message)?;
        }
        tracing::debug!(surface = %self.target, sent = state.len(), "resynced preview surface");
        Ok(state.len())
    }

    /// Stop sending; nothing is posted after this
    pub fn teardown(&mut self) {
        if !self.torn_down {
            tracing::debug!(surface = %self.target, dropped = self.outbound.len(), "preview channel torn down");
        }
        self.torn_down = true;
        self.outbound.clear();
    }

    /// Snapshot currently projected, if a draft is attached
    #[must_use]
    pub fn projected_snapshot(&self) -> Option<ConfigSnapshot> {
        let draft = self.draft.as_ref()?;
        let snapshot = match self.source {
            PreviewSource::Draft => draft.snapshot(),
            PreviewSource::LatestPublished => VersioningEngine::latest_published(draft)
                .and_then(|record| record.config_snapshot.clone())
                .unwrap_or_else(|| {
                    tracing::debug!(id = %draft.id, "no published snapshot, previewing draft");
                    draft.snapshot()
                }),
        };
        Some(snapshot)
    }

    fn projection(&self) -> Option<PreviewMessage> {
        let id = self.draft.as_ref()?.id.clone();
        self.projected_snapshot()
            .map(|config| PreviewMessage::ConfigUpdate { id, config })
    }

    fn enqueue(&mut self, message: PreviewMessage) {
        if self.torn_down {
            return;
        }
        let kind = message.kind();
        self.outbound.retain(|queued| queued.kind() != kind);
        self.outbound.push_back(message);
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        if !self.surface_ready || self.torn_down {
            return Ok(());
        }
        while let Some(message) = self.outbound.front() {
            self.post(message)?;
            self.outbound.pop_front();
        }
        Ok(())
    }

    fn post(&self, message: &PreviewMessage) -> Result<(), TransportError> {
        let body = message
            .encode()
            .map_err(|e| TransportError::Encode(e.to_string()))?;
        self.transport.post(Envelope {
            source_origin: self.local_origin.clone(),
            target_origin: self.target.clone(),
            body,
        })
    }
}
