//! Pure validation of configurations
//!
//! Validation is total and side-effect free: it inspects a borrowed
//! configuration and reports every problem it finds.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::config::Configuration;
use crate::engine::EngineConfig;

static ENDPOINT_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://\S+$").expect("endpoint URL pattern is valid")
});

static CUSTOM_DOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z][A-Za-z0-9+.\-]*://)?[A-Za-z0-9](?:[A-Za-z0-9.\-]*[A-Za-z0-9])?(?::[0-9]{1,5})?/?$")
        .expect("custom domain pattern is valid")
});

/// One failed check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Field path, e.g. `engineConfig.url`
    pub field: String,
    /// Human-readable message
    pub message: String,
}

impl ValidationIssue {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Outcome of [`validate`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Every failed check, in field order
    pub errors: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Whether no check failed
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether a given field failed
    #[must_use]
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.iter().any(|issue| issue.field == field)
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|issue| format!("{}: {}", issue.field, issue.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Validate required fields and the active engine variant
#[must_use]
pub fn validate(config: &Configuration) -> ValidationReport {
    let mut errors = Vec::new();

    if config.name.trim().is_empty() {
        errors.push(ValidationIssue::new("name", "name is required"));
    }
    if config.website.trim().is_empty() {
        errors.push(ValidationIssue::new("website", "website is required"));
    }

    if let Some(domain) = config.deployment.custom_domain.as_deref().map(str::trim) {
        if !domain.is_empty() && !CUSTOM_DOMAIN.is_match(domain) {
            errors.push(ValidationIssue::new(
                "deployment.customDomain",
                "custom domain must be a host or scheme://host[:port]",
            ));
        }
    }

    match &config.engine {
        EngineConfig::CustomEndpoint { url, .. } => {
            if url.trim().is_empty() {
                errors.push(ValidationIssue::new("engineConfig.url", "endpoint URL is required"));
            } else if !ENDPOINT_URL.is_match(url.trim()) {
                errors.push(ValidationIssue::new(
                    "engineConfig.url",
                    "endpoint URL must look like scheme://host",
                ));
            }
        }
        EngineConfig::ManagedEngine { engine_id, .. } => {
            require(&mut errors, "engineConfig.engineId", engine_id, "engine id");
        }
        EngineConfig::ModelReference { model_id, .. } => {
            require(&mut errors, "engineConfig.modelId", model_id, "model id");
        }
        EngineConfig::AgentReference {
            agent_id,
            credential,
        } => {
            require(&mut errors, "engineConfig.agentId", agent_id, "agent id");
            require(&mut errors, "engineConfig.credential", credential, "credential");
        }
        EngineConfig::WorkflowReference {
            workflow_id,
            credential,
        } => {
            require(&mut errors, "engineConfig.workflowId", workflow_id, "workflow id");
            require(&mut errors, "engineConfig.credential", credential, "credential");
        }
    }

    ValidationReport { errors }
}

fn require(errors: &mut Vec<ValidationIssue>, field: &str, value: &str, label: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationIssue::new(field, format!("{label} is required")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EndpointAuth;

    fn valid_config() -> Configuration {
        let mut config = Configuration::create_default("Support Bot");
        config.website = "https://example.com".to_string();
        config
    }

    #[test]
    fn default_with_website_is_valid() {
        assert!(validate(&valid_config()).is_valid());
    }

    #[test]
    fn name_and_website_required() {
        let mut config = Configuration::create_default("   ");
        config.website = String::new();
        let report = validate(&config);
        assert!(report.has_error("name"));
        assert!(report.has_error("website"));
        assert_eq!(report.errors.len(), 2);
    }

    #[test]
    fn custom_endpoint_requires_scheme_url() {
        let mut config = valid_config();
        config.engine = EngineConfig::CustomEndpoint {
            url: "example.com/chat".to_string(),
            auth: EndpointAuth::None,
        };
        assert!(validate(&config).has_error("engineConfig.url"));

        config.engine = EngineConfig::CustomEndpoint {
            url: "https://example.com/chat".to_string(),
            auth: EndpointAuth::None,
        };
        assert!(validate(&config).is_valid());
    }

    #[test]
    fn agent_reference_requires_id_and_credential() {
        let mut config = valid_config();
        config.engine = EngineConfig::AgentReference {
            agent_id: String::new(),
            credential: String::new(),
        };
        let report = validate(&config);
        assert!(report.has_error("engineConfig.agentId"));
        assert!(report.has_error("engineConfig.credential"));
    }

    #[test]
    fn workflow_reference_requires_credential() {
        let mut config = valid_config();
        config.engine = EngineConfig::WorkflowReference {
            workflow_id: "wf-1".to_string(),
            credential: " ".to_string(),
        };
        let report = validate(&config);
        assert!(!report.has_error("engineConfig.workflowId"));
        assert!(report.has_error("engineConfig.credential"));
    }

    #[test]
    fn model_reference_requires_model() {
        let mut config = valid_config();
        config.engine = EngineConfig::ModelReference {
            model_id: String::new(),
            params: crate::engine::BehaviorParams::default(),
        };
        assert!(validate(&config).has_error("engineConfig.modelId"));
    }

    #[test]
    fn custom_domain_must_be_a_host() {
        let mut config = valid_config();
        for ok in ["chat.acme.io", "chat.acme.io/", "http://localhost:8080", "   "] {
            config.deployment.custom_domain = Some(ok.to_string());
            assert!(validate(&config).is_valid(), "{ok} should be accepted");
        }
        for bad in [
            "evil.com\" onload=\"alert(1)",
            "chat.acme.io/path",
            "https://",
            "<script>",
        ] {
            config.deployment.custom_domain = Some(bad.to_string());
            assert!(
                validate(&config).has_error("deployment.customDomain"),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn validation_does_not_mutate() {
        let config = valid_config();
        let before = config.clone();
        let _ = validate(&config);
        assert_eq!(config, before);
    }

    #[test]
    fn report_display_lists_fields() {
        let config = Configuration::create_default("");
        let text = validate(&config).to_string();
        assert!(text.contains("name: name is required"));
    }
}
