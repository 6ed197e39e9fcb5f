//! Identifiers for configurations and version records
//!
//! Identifiers are carried as strings because collections loaded from the
//! local cache may still hold legacy, non-canonical ids. Freshly generated
//! ids are always hyphenated v4 UUIDs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh canonical id
            #[inline]
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Wrap an existing id verbatim
            #[inline]
            #[must_use]
            pub fn from_raw(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Borrow the id as a string slice
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether this id is a canonical (hyphenated, lowercase) UUID
            #[inline]
            #[must_use]
            pub fn is_canonical(&self) -> bool {
                is_canonical_uuid(&self.0)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.as_str()
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value.to_string())
            }
        }
    };
}

define_id_type!(
    /// Identity of a chatbot configuration; assigned once at creation
    ChatbotId
);
define_id_type!(
    /// Identity of a single version record
    VersionId
);

/// Canonical form: parses as a UUID and round-trips to the same text.
///
/// Braced, URN, simple (unhyphenated) and uppercase spellings are rejected
/// so that the cache never holds two spellings of one key.
#[must_use]
pub fn is_canonical_uuid(raw: &str) -> bool {
    match Uuid::parse_str(raw) {
        Ok(uuid) => !uuid.is_nil() && uuid.hyphenated().to_string() == raw,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_canonical_and_unique() {
        let a = ChatbotId::generate();
        let b = ChatbotId::generate();
        assert!(a.is_canonical());
        assert_ne!(a, b);
    }

    #[test]
    fn legacy_timestamp_id_is_not_canonical() {
        assert!(!ChatbotId::from_raw("chatbot-1700000000000").is_canonical());
        assert!(!ChatbotId::from_raw("1700000000000").is_canonical());
        assert!(!ChatbotId::from_raw("").is_canonical());
    }

    #[test]
    fn non_hyphenated_or_uppercase_spellings_rejected() {
        let uuid = Uuid::new_v4();
        assert!(!is_canonical_uuid(&uuid.simple().to_string()));
        assert!(!is_canonical_uuid(&uuid.hyphenated().to_string().to_uppercase()));
        assert!(is_canonical_uuid(&uuid.hyphenated().to_string()));
    }

    #[test]
    fn nil_uuid_rejected() {
        assert!(!is_canonical_uuid("00000000-0000-0000-0000-000000000000"));
    }

    #[test]
    fn id_serializes_transparently() {
        let id = ChatbotId::from_raw("abc");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc\"");
    }
}
