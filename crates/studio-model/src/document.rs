//! Import and export of configuration documents
//!
//! Documents use the wire shape (no `persistenceState`). Import accepts JSON
//! or YAML and rejects anything that does not parse, does not match the
//! configuration shape, has an inconsistent history, or fails validation.
//! Rejected documents never reach the collection.

use serde_json::Value as JsonValue;

use crate::config::{Configuration, PersistenceState};
use crate::error::{ImportError, ModelError};
use crate::migrate::IdentityMigrator;
use crate::validate::validate;

/// Parse, migrate and validate an imported document
///
/// The result is always local-only; a legacy id is replaced by a canonical
/// one before validation.
///
/// # Errors
/// Returns [`ImportError`] describing the first stage that rejected the document
pub fn import_document(text: &str) -> Result<Configuration, ImportError> {
    if text.trim().is_empty() {
        return Err(ImportError::Empty);
    }

    let value = parse_value(text)?;
    if !value.is_object() {
        return Err(ImportError::Shape("expected an object at the top level".to_string()));
    }

    let mut config = Configuration::from_wire(value, PersistenceState::LocalOnly)
        .map_err(|e| ImportError::Shape(e.to_string()))?;
    config
        .check_history()
        .map_err(|e| ImportError::Shape(e.to_string()))?;

    IdentityMigrator::new().migrate_one(&mut config);

    let report = validate(&config);
    if !report.is_valid() {
        return Err(ImportError::Invalid(report));
    }
    Ok(config)
}

/// Pretty JSON document in wire shape
///
/// # Errors
/// Returns error if serialization fails
pub fn export_document(config: &Configuration) -> Result<String, ModelError> {
    let wire = config.to_wire()?;
    Ok(serde_json::to_string_pretty(&wire)?)
}

fn parse_value(text: &str) -> Result<JsonValue, ImportError> {
    match serde_json::from_str::<JsonValue>(text) {
        Ok(value) => Ok(value),
        Err(json_err) => serde_yaml::from_str::<JsonValue>(text).map_err(|yaml_err| {
            ImportError::Parse(format!("not JSON ({json_err}) and not YAML ({yaml_err})"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ChatbotId;

    fn exportable() -> Configuration {
        let mut config = Configuration::create_default("Support Bot");
        config.website = "https://example.com".to_string();
        config
    }

    #[test]
    fn export_then_import_preserves_content() {
        let config = exportable();
        let text = export_document(&config).unwrap();
        assert!(!text.contains("persistenceState"));

        let imported = import_document(&text).unwrap();
        assert_eq!(imported.id, config.id);
        assert_eq!(imported.snapshot(), config.snapshot());
        assert_eq!(imported.persistence_state, PersistenceState::LocalOnly);
    }

    #[test]
    fn yaml_documents_accepted() {
        let config = exportable();
        let wire = config.to_wire().unwrap();
        let yaml = serde_yaml::to_string(&wire).unwrap();
        let imported = import_document(&yaml).unwrap();
        assert_eq!(imported.name, "Support Bot");
    }

    #[test]
    fn legacy_id_migrated_on_import() {
        let mut config = exportable();
        config.id = ChatbotId::from_raw("chatbot-1700000000000");
        let imported = import_document(&export_document(&config).unwrap()).unwrap();
        assert!(imported.id.is_canonical());
    }

    #[test]
    fn garbage_rejected() {
        assert!(matches!(import_document("   "), Err(ImportError::Empty)));
        assert!(matches!(
            import_document("{not json: [}"),
            Err(ImportError::Parse(_))
        ));
        assert!(matches!(
            import_document("just a sentence"),
            Err(ImportError::Shape(_))
        ));
        assert!(matches!(
            import_document(r#"{"name": "x"}"#),
            Err(ImportError::Shape(_))
        ));
    }

    #[test]
    fn invalid_configuration_rejected() {
        let config = Configuration::create_default("No Website");
        let text = export_document(&config).unwrap();
        match import_document(&text) {
            Err(ImportError::Invalid(report)) => assert!(report.has_error("website")),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn inconsistent_history_rejected() {
        let mut config = exportable();
        config.current_version = "7.7".to_string();
        let text = export_document(&config).unwrap();
        assert!(matches!(import_document(&text), Err(ImportError::Shape(_))));
    }
}
