//! Receiver side of the preview protocol
//!
//! [`RenderSurface`] is what an isolated preview context runs: it accepts
//! envelopes only from the editor origin, ignores unknown messages, and
//! re-renders only when content actually changes.

use studio_model::{ChatbotId, ConfigSnapshot, ContentHash, DeploymentSurface};
use tokio::sync::mpsc;

use crate::message::{EmulatorChrome, Envelope, PreviewMessage, SurfaceSignal};
use crate::origin::TargetOrigin;
use crate::transport::{PreviewTransport, TransportError};

/// Effect of one received envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Received {
    /// Visible state changed
    Rendered,
    /// Identical to what is already shown
    Unchanged,
    /// Dropped: foreign origin, unknown type or malformed
    Ignored,
}

/// Everything the surface currently shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceState {
    pub id: Option<ChatbotId>,
    pub config: Option<ConfigSnapshot>,
    pub fingerprint: Option<ContentHash>,
    pub mode: DeploymentSurface,
    pub chrome: Option<EmulatorChrome>,
    /// Number of re-renders so far
    pub renders: u64,
}

/// Passive renderer of projected configuration state
pub struct RenderSurface {
    origin: TargetOrigin,
    editor: TargetOrigin,
    reply: Box<dyn PreviewTransport>,
    state: SurfaceState,
}

impl std::fmt::Debug for RenderSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderSurface")
            .field("origin", &self.origin)
            .field("editor", &self.editor)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl RenderSurface {
    /// Surface at `origin` that trusts only `editor`
    pub fn new(
        origin: TargetOrigin,
        editor: TargetOrigin,
        reply: impl PreviewTransport + 'static,
    ) -> Self {
        Self {
            origin,
            editor,
            reply: Box::new(reply),
            state: SurfaceState::default(),
        }
    }

    /// What the surface is currently rendering
    #[inline]
    #[must_use]
    pub fn state(&self) -> &SurfaceState {
        &self.state
    }

    /// Tell the editor loading finished
    ///
    /// # Errors
    /// Returns error if the signal cannot be posted
    pub fn signal_ready(&self) -> Result<(), TransportError> {
        self.signal(SurfaceSignal::Ready)
    }

    /// Switch the emulated surface from within the preview
    ///
    /// # Errors
    /// Returns error if the signal cannot be posted
    pub fn switch_mode(&mut self, mode: DeploymentSurface) -> Result<(), TransportError> {
        if self.state.mode != mode {
            self.state.mode = mode;
            self.state.renders += 1;
        }
        self.signal(SurfaceSignal::PreviewMode { value: mode })
    }

    /// Apply one envelope
    pub fn receive(&mut self, envelope: &Envelope) -> Received {
        if envelope.source_origin != self.editor || envelope.target_origin != self.origin {
            tracing::debug!(origin = %envelope.source_origin, "surface ignoring foreign envelope");
            return Received::Ignored;
        }
        let message = match PreviewMessage::decode(&envelope.body) {
            Ok(Some(message)) => message,
            Ok(None) => return Received::Ignored,
            Err(e) => {
                tracing::debug!(error = %e, "surface ignoring malformed message");
                return Received::Ignored;
            }
        };

        let changed = match message {
            PreviewMessage::ConfigUpdate { id, config } => {
                let fingerprint = config.fingerprint();
                let changed = self.state.fingerprint != Some(fingerprint)
                    || self.state.id.as_ref() != Some(&id);
                if changed {
                    self.state.id = Some(id);
                    self.state.config = Some(config);
                    self.state.fingerprint = Some(fingerprint);
                }
                changed
            }
            PreviewMessage::PreviewMode { value } => {
                let changed = self.state.mode != value;
                self.state.mode = value;
                changed
            }
            PreviewMessage::EmulatorChromeUpdate(chrome) => {
                let changed = self.state.chrome.as_ref() != Some(&chrome);
                self.state.chrome = Some(chrome);
                changed
            }
        };

        if changed {
            self.state.renders += 1;
            Received::Rendered
        } else {
            Received::Unchanged
        }
    }

    /// Signal ready, then apply envelopes until the editor side goes away
    ///
    /// # Errors
    /// Returns error if the ready signal cannot be posted
    pub async fn drive(
        mut self,
        mut inbox: mpsc::UnboundedReceiver<Envelope>,
    ) -> Result<Self, TransportError> {
        self.signal_ready()?;
        while let Some(envelope) = inbox.recv().await {
            self.receive(&envelope);
        }
        Ok(self)
    }

    fn signal(&self, signal: SurfaceSignal) -> Result<(), TransportError> {
        let body = signal
            .encode()
            .map_err(|e| TransportError::Encode(e.to_string()))?;
        self.reply.post(Envelope {
            source_origin: self.origin.clone(),
            target_origin: self.editor.clone(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ChannelTransport;
    use studio_model::Configuration;

    const EDITOR: &str = "https://studio.example.com";
    const SURFACE: &str = "https://preview.example.com";

    fn origin(raw: &str) -> TargetOrigin {
        TargetOrigin::parse(raw).unwrap()
    }

    fn surface() -> (RenderSurface, mpsc::UnboundedReceiver<Envelope>) {
        let (reply, rx) = ChannelTransport::open(origin(EDITOR));
        (RenderSurface::new(origin(SURFACE), origin(EDITOR), reply), rx)
    }

    fn from_editor(message: &PreviewMessage) -> Envelope {
        Envelope {
            source_origin: origin(EDITOR),
            target_origin: origin(SURFACE),
            body: message.encode().unwrap(),
        }
    }

    #[test]
    fn identical_update_is_a_no_op() {
        let (mut surface, _rx) = surface();
        let config = Configuration::create_default("Support Bot");
        let message = PreviewMessage::ConfigUpdate {
            id: config.id.clone(),
            config: config.snapshot(),
        };

        assert_eq!(surface.receive(&from_editor(&message)), Received::Rendered);
        assert_eq!(surface.receive(&from_editor(&message)), Received::Unchanged);
        assert_eq!(surface.state().renders, 1);
    }

    #[test]
    fn foreign_origin_ignored() {
        let (mut surface, _rx) = surface();
        let mut envelope = from_editor(&PreviewMessage::PreviewMode {
            value: DeploymentSurface::Fullpage,
        });
        envelope.source_origin = origin("https://evil.example.net");
        assert_eq!(surface.receive(&envelope), Received::Ignored);
        assert_eq!(surface.state().mode, DeploymentSurface::Popover);
    }

    #[test]
    fn unknown_type_ignored() {
        let (mut surface, _rx) = surface();
        let mut envelope = from_editor(&PreviewMessage::PreviewMode {
            value: DeploymentSurface::Fullpage,
        });
        envelope.body = r#"{"type":"theme-toggle","dark":true}"#.into();
        assert_eq!(surface.receive(&envelope), Received::Ignored);
    }

    #[test]
    fn ready_and_mode_signals_addressed_to_editor() {
        let (mut surface, mut rx) = surface();
        surface.signal_ready().unwrap();
        surface.switch_mode(DeploymentSurface::PopupCenter).unwrap();

        let ready = rx.try_recv().unwrap();
        assert_eq!(ready.target_origin, origin(EDITOR));
        assert_eq!(SurfaceSignal::decode(&ready.body).unwrap(), Some(SurfaceSignal::Ready));

        let mode = rx.try_recv().unwrap();
        assert_eq!(
            SurfaceSignal::decode(&mode.body).unwrap(),
            Some(SurfaceSignal::PreviewMode {
                value: DeploymentSurface::PopupCenter
            })
        );
        assert_eq!(surface.state().mode, DeploymentSurface::PopupCenter);
    }
}
