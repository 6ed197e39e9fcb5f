//! Origin scoping for cross-context messages
//!
//! An origin is `scheme://host[:port]`, lowercased, with no path. Messages
//! are always addressed to one concrete origin; the wildcard `*` is refused.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Origin parse errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OriginError {
    #[error("origin is empty")]
    Empty,

    #[error("wildcard origin is not allowed")]
    Wildcard,

    #[error("origin {0:?} has no scheme")]
    MissingScheme(String),

    #[error("origin {0:?} has no host")]
    MissingHost(String),
}

/// A concrete `scheme://host[:port]` origin
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TargetOrigin(String);

impl TargetOrigin {
    /// Parse an origin, or the origin part of a URL
    ///
    /// # Errors
    /// Returns error for empty input, `*`, or input without scheme or host
    pub fn parse(raw: &str) -> Result<Self, OriginError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(OriginError::Empty);
        }
        if raw == "*" {
            return Err(OriginError::Wildcard);
        }

        let (scheme, rest) = raw
            .split_once("://")
            .filter(|(scheme, _)| {
                !scheme.is_empty()
                    && scheme
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
            })
            .ok_or_else(|| OriginError::MissingScheme(raw.to_string()))?;

        let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
        let host = authority.rsplit('@').next().unwrap_or_default();
        if host.is_empty() || host.starts_with(':') {
            return Err(OriginError::MissingHost(raw.to_string()));
        }

        Ok(Self(format!(
            "{}://{}",
            scheme.to_ascii_lowercase(),
            host.to_ascii_lowercase()
        )))
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TargetOrigin {
    type Err = OriginError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TargetOrigin {
    type Error = OriginError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TargetOrigin> for String {
    fn from(origin: TargetOrigin) -> Self {
        origin.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_reduced_to_origin() {
        let origin = TargetOrigin::parse("HTTPS://Preview.Example.com:8443/chat/42?preview=true").unwrap();
        assert_eq!(origin.as_str(), "https://preview.example.com:8443");
    }

    #[test]
    fn wildcard_refused() {
        assert_eq!(TargetOrigin::parse("*"), Err(OriginError::Wildcard));
        assert_eq!(TargetOrigin::parse("  "), Err(OriginError::Empty));
    }

    #[test]
    fn scheme_and_host_required() {
        assert!(matches!(
            TargetOrigin::parse("preview.example.com"),
            Err(OriginError::MissingScheme(_))
        ));
        assert!(matches!(
            TargetOrigin::parse("https:///chat"),
            Err(OriginError::MissingHost(_))
        ));
    }

    #[test]
    fn serde_validates() {
        let origin: TargetOrigin = serde_json::from_str("\"http://localhost:3000\"").unwrap();
        assert_eq!(origin.to_string(), "http://localhost:3000");
        assert!(serde_json::from_str::<TargetOrigin>("\"*\"").is_err());
    }
}
