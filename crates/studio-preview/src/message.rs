//! Message schema between the editor and the render surface
//!
//! Every message is a JSON object with a `type` discriminator. Receivers
//! decode with [`PreviewMessage::decode`] / [`SurfaceSignal::decode`], which
//! return `Ok(None)` for a `type` they do not know.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use studio_model::{ChatbotId, ConfigSnapshot, DeploymentSurface};

use crate::origin::TargetOrigin;

/// Message decode errors
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("message is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("message is not a JSON object")]
    NotAnObject,

    #[error("message has no string `type` field")]
    MissingType,

    #[error("malformed {kind} payload: {source}")]
    Payload {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Cosmetic wrapper drawn around the preview
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmulatorChrome {
    pub background_color: String,
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Editor -> surface messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PreviewMessage {
    /// Complete configuration state to render
    ConfigUpdate { id: ChatbotId, config: ConfigSnapshot },
    /// Deployment surface to emulate
    PreviewMode { value: DeploymentSurface },
    /// Wrapper styling
    EmulatorChromeUpdate(EmulatorChrome),
}

impl PreviewMessage {
    pub const KINDS: [&'static str; 3] = ["config-update", "preview-mode", "emulator-chrome-update"];

    /// Discriminator value
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigUpdate { .. } => Self::KINDS[0],
            Self::PreviewMode { .. } => Self::KINDS[1],
            Self::EmulatorChromeUpdate(_) => Self::KINDS[2],
        }
    }

    /// JSON text of the message
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode, ignoring unknown kinds
    ///
    /// # Errors
    /// Returns error if the text is not a typed object, or a known kind
    /// carries a malformed payload
    pub fn decode(text: &str) -> Result<Option<Self>, DecodeError> {
        decode_known(text, &Self::KINDS)
    }
}

/// Surface -> editor messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SurfaceSignal {
    /// The surface finished loading and wants the full state
    Ready,
    /// The user switched the emulated surface from within the preview
    PreviewMode { value: DeploymentSurface },
}

impl SurfaceSignal {
    pub const KINDS: [&'static str; 2] = ["ready", "preview-mode"];

    /// JSON text of the signal
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode, ignoring unknown kinds
    ///
    /// # Errors
    /// As [`PreviewMessage::decode`]
    pub fn decode(text: &str) -> Result<Option<Self>, DecodeError> {
        decode_known(text, &Self::KINDS)
    }
}

fn decode_known<T>(text: &str, kinds: &[&str]) -> Result<Option<T>, DecodeError>
where
    T: serde::de::DeserializeOwned,
{
    let value: JsonValue = serde_json::from_str(text).map_err(DecodeError::Json)?;
    let kind = value
        .as_object()
        .ok_or(DecodeError::NotAnObject)?
        .get("type")
        .and_then(JsonValue::as_str)
        .ok_or(DecodeError::MissingType)?
        .to_string();

    if !kinds.contains(&kind.as_str()) {
        tracing::trace!(kind = %kind, "ignoring message of unknown type");
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|source| DecodeError::Payload { kind, source })
}

/// A message addressed from one origin to another
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Origin of the sending context
    pub source_origin: TargetOrigin,
    /// Only a context at this origin may receive the message
    pub target_origin: TargetOrigin,
    /// Encoded message
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_model::Configuration;

    #[test]
    fn wire_shape_uses_type_discriminator() {
        let message = PreviewMessage::PreviewMode {
            value: DeploymentSurface::PopupCenter,
        };
        assert_eq!(
            message.encode().unwrap(),
            r#"{"type":"preview-mode","value":"popup-center"}"#
        );

        let chrome = PreviewMessage::EmulatorChromeUpdate(EmulatorChrome {
            background_color: "#111827".into(),
            background_image: None,
            title: "Acme".into(),
            description: "Store".into(),
        });
        let value: JsonValue = serde_json::from_str(&chrome.encode().unwrap()).unwrap();
        assert_eq!(value["type"], "emulator-chrome-update");
        assert_eq!(value["backgroundColor"], "#111827");
    }

    #[test]
    fn config_update_decodes() {
        let config = Configuration::create_default("Support Bot");
        let message = PreviewMessage::ConfigUpdate {
            id: config.id.clone(),
            config: config.snapshot(),
        };
        let decoded = PreviewMessage::decode(&message.encode().unwrap()).unwrap();
        assert_eq!(decoded, Some(message));
    }

    #[test]
    fn unknown_type_ignored() {
        assert!(PreviewMessage::decode(r#"{"type":"resize","height":400}"#)
            .unwrap()
            .is_none());
        assert!(SurfaceSignal::decode(r#"{"type":"config-update"}"#)
            .unwrap()
            .is_none());
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(matches!(PreviewMessage::decode("nope"), Err(DecodeError::Json(_))));
        assert!(matches!(PreviewMessage::decode("[1]"), Err(DecodeError::NotAnObject)));
        assert!(matches!(
            PreviewMessage::decode(r#"{"value":"popover"}"#),
            Err(DecodeError::MissingType)
        ));
        assert!(matches!(
            PreviewMessage::decode(r#"{"type":"preview-mode","value":"sideways"}"#),
            Err(DecodeError::Payload { .. })
        ));
    }

    #[test]
    fn ready_signal_shape() {
        assert_eq!(SurfaceSignal::Ready.encode().unwrap(), r#"{"type":"ready"}"#);
        assert_eq!(
            SurfaceSignal::decode(r#"{"type":"ready"}"#).unwrap(),
            Some(SurfaceSignal::Ready)
        );
    }
}
