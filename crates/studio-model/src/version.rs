//! Version records and version labels

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ConfigSnapshot;
use crate::ids::VersionId;

/// Label of the record created together with a configuration
pub const INITIAL_VERSION: &str = "1.0.0";

/// One entry in a configuration's history
///
/// Records are append-only: once pushed onto `versions` they are never
/// edited. Publishing appends a new record instead of flipping a flag on an
/// old one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    /// Record identity
    pub id: VersionId,
    /// Version label
    pub version: String,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Author label
    pub created_by: String,
    /// Whether this record marks a publish
    pub is_published: bool,
    /// Free-text change description
    #[serde(default)]
    pub changes: String,
    /// Full configuration content at commit time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_snapshot: Option<ConfigSnapshot>,
}

impl VersionRecord {
    /// Create a new record with a fresh id
    #[must_use]
    pub fn new(
        version: impl Into<String>,
        created_by: impl Into<String>,
        is_published: bool,
        changes: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: VersionId::generate(),
            version: version.into(),
            created_at,
            created_by: created_by.into(),
            is_published,
            changes: changes.into(),
            config_snapshot: None,
        }
    }

    /// Attach a content snapshot
    #[inline]
    #[must_use]
    pub fn with_snapshot(mut self, snapshot: ConfigSnapshot) -> Self {
        self.config_snapshot = Some(snapshot);
        self
    }
}

/// Label following `current`: leading decimal plus 0.1, one decimal place
///
/// `"1.0.0"` becomes `"1.1"`, `"1.9"` becomes `"2.0"`. Labels without a
/// numeric prefix restart from `1.0`. The sequence is monotonic but not
/// semantic: there is no gap filling and no renumbering.
#[must_use]
pub fn next_label(current: &str) -> String {
    let base = leading_decimal(current).unwrap_or(1.0);
    format!("{:.1}", base + 0.1)
}

/// Numeric value of a label's leading decimal prefix
///
/// Mirrors a lenient float parse: `"1.2.3"` reads as `1.2`, `"3abc"` as `3`.
#[must_use]
pub fn leading_decimal(label: &str) -> Option<f64> {
    let trimmed = label.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_digit = false;

    for (idx, ch) in trimmed.char_indices() {
        match ch {
            '0'..='9' => {
                seen_digit = true;
                end = idx + 1;
            }
            '.' if !seen_dot => {
                seen_dot = true;
            }
            '+' | '-' if idx == 0 => {}
            _ => break,
        }
    }

    if !seen_digit {
        return None;
    }
    trimmed[..end].parse::<f64>().ok()
}
