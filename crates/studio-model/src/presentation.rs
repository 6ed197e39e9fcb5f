//! Presentation payload
//!
//! Styling and layout settings (colors, fonts, borders, widget geometry,
//! animation, header/footer layout) are owned by the presentation layer.
//! This crate treats them as an opaque, versioned JSON payload: it can
//! snapshot, replay, fingerprint and patch it, but never interprets fields.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value as JsonValue};

use crate::hash::ContentHash;

/// Schema version stamped on payloads produced by [`PresentationBlob::default_theme`]
pub const PRESENTATION_SCHEMA_VERSION: u32 = 1;

/// Opaque presentation payload
///
/// Serialized as `{"schemaVersion": n, "data": {...}}`. The fingerprint is
/// derived from the canonical (key-sorted) JSON of `data`, so two payloads
/// with the same fields in a different order hash identically.
#[derive(Debug, Clone, PartialEq)]
pub struct PresentationBlob {
    schema_version: u32,
    data: JsonValue,
    hash: ContentHash,
}

impl PresentationBlob {
    /// Wrap a JSON value
    #[inline]
    #[must_use]
    pub fn new(schema_version: u32, data: JsonValue) -> Self {
        let hash = compute_hash(&data);
        Self {
            schema_version,
            data,
            hash,
        }
    }

    /// Fully populated defaults for a brand-new configuration
    ///
    /// Every field the editor exposes has a value; nothing is left for the
    /// renderer to guess.
    #[must_use]
    pub fn default_theme() -> Self {
        Self::new(
            PRESENTATION_SCHEMA_VERSION,
            json!({
                "colors": {
                    "primary": "#2563eb",
                    "secondary": "#64748b",
                    "background": "#ffffff",
                    "text": "#0f172a",
                    "userBubble": "#2563eb",
                    "userBubbleText": "#ffffff",
                    "botBubble": "#f1f5f9",
                    "botBubbleText": "#0f172a"
                },
                "typography": {
                    "fontFamily": "Inter, system-ui, sans-serif",
                    "fontSize": 14,
                    "headerFontSize": 16,
                    "lineHeight": 1.5
                },
                "border": {
                    "radius": 12,
                    "width": 1,
                    "color": "#e2e8f0"
                },
                "widget": {
                    "width": 380,
                    "height": 600,
                    "launcherSize": 56,
                    "launcherIcon": "chat",
                    "shadow": true
                },
                "animation": {
                    "type": "slide-up",
                    "durationMs": 250,
                    "easing": "ease-out"
                },
                "header": {
                    "title": "Chat with us",
                    "subtitle": "We usually reply in a few minutes",
                    "showAvatar": true,
                    "avatarUrl": "",
                    "layout": "left-aligned"
                },
                "footer": {
                    "placeholder": "Type a message...",
                    "showBranding": true,
                    "layout": "input-with-send"
                },
                "welcomeMessage": "Hi! How can I help you today?"
            }),
        )
    }

    /// Schema version of the payload
    #[inline]
    #[must_use]
    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Raw JSON payload
    #[inline]
    #[must_use]
    pub fn data(&self) -> &JsonValue {
        &self.data
    }

    /// Fingerprint of the canonical payload
    #[inline]
    #[must_use]
    pub fn hash(&self) -> ContentHash {
        self.hash
    }

    /// Get a value by JSON pointer
    #[inline]
    #[must_use]
    pub fn get(&self, pointer: &str) -> Option<&JsonValue> {
        self.data.pointer(pointer)
    }

    /// Set a value by JSON pointer
    ///
    /// Missing intermediate objects are created. Returns `false` if the
    /// pointer crosses a non-object value.
    pub fn set(&mut self, pointer: &str, value: JsonValue) -> bool {
        let applied = set_pointer(&mut self.data, pointer, value);
        self.hash = compute_hash(&self.data);
        applied
    }

    /// Deep-merge another payload over this one
    ///
    /// Objects merge recursively; any other value in `other` replaces ours.
    #[must_use]
    pub fn merge(&self, other: &JsonValue) -> Self {
        Self::new(self.schema_version, merge_json(&self.data, other))
    }

    /// Key-sorted JSON text of the payload
    #[inline]
    #[must_use]
    pub fn to_canonical_json(&self) -> String {
        canonical_json(&self.data)
    }
}

impl Default for PresentationBlob {
    fn default() -> Self {
        Self::default_theme()
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlobRepr {
    #[serde(default = "default_schema_version")]
    schema_version: u32,
    #[serde(default)]
    data: JsonValue,
}

fn default_schema_version() -> u32 {
    PRESENTATION_SCHEMA_VERSION
}

impl Serialize for PresentationBlob {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        BlobRepr {
            schema_version: self.schema_version,
            data: self.data.clone(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PresentationBlob {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = BlobRepr::deserialize(deserializer)?;
        Ok(Self::new(repr.schema_version, repr.data))
    }
}

fn compute_hash(value: &JsonValue) -> ContentHash {
    ContentHash::of(canonical_json(value).as_bytes())
}

fn set_pointer(root: &mut JsonValue, pointer: &str, value: JsonValue) -> bool {
    if pointer.is_empty() {
        *root = value;
        return true;
    }
    let Some(rest) = pointer.strip_prefix('/') else {
        return false;
    };

    let tokens: Vec<String> = rest
        .split('/')
        .map(|t| t.replace("~1", "/").replace("~0", "~"))
        .collect();
    let Some((last, parents)) = tokens.split_last() else {
        return false;
    };

    let mut cursor = root;
    for token in parents {
        let Some(map) = cursor.as_object_mut() else {
            return false;
        };
        cursor = map
            .entry(token.clone())
            .or_insert_with(|| JsonValue::Object(serde_json::Map::new()));
    }
    match cursor.as_object_mut() {
        Some(map) => {
            map.insert(last.clone(), value);
            true
        }
        None => false,
    }
}

fn merge_json(a: &JsonValue, b: &JsonValue) -> JsonValue {
    match (a, b) {
        (JsonValue::Object(a_map), JsonValue::Object(b_map)) => {
            let mut result = a_map.clone();
            for (key, b_val) in b_map {
                let merged = match result.get(key) {
                    Some(a_val) => merge_json(a_val, b_val),
                    None => b_val.clone(),
                };
                result.insert(key.clone(), merged);
            }
            JsonValue::Object(result)
        }
        (_, b_val) => b_val.clone(),
    }
}

fn canonical_json(value: &JsonValue) -> String {
    match value {
        JsonValue::Object(map) => {
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort();

            let parts: Vec<String> = keys
                .into_iter()
                .filter_map(|key| {
                    map.get(key)
                        .map(|val| format!("{}:{}", JsonValue::String(key.clone()), canonical_json(val)))
                })
                .collect();
            format!("{{{}}}", parts.join(","))
        }
        JsonValue::Array(arr) => {
            let parts: Vec<_> = arr.iter().map(canonical_json).collect();
            format!("[{}]", parts.join(","))
        }
        other => other.to_string(),
    }
}
