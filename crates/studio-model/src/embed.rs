//! Embeddable loader snippet generation
//!
//! The snippet is a single `<script>` reference to
//! `{base}/embed?id={id}&type={surface}`, HTML-escaped for the `src`
//! attribute. Generation is a pure function of the configuration and the
//! fallback origin, so identical input always yields byte-identical output.

use crate::config::Configuration;
use crate::deployment::DeploymentSurface;
use crate::ids::ChatbotId;

/// Produces loader snippets for published configurations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentDescriptorGenerator {
    origin: String,
}

impl DeploymentDescriptorGenerator {
    /// Generator using `origin` when a configuration has no custom domain
    #[inline]
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
        }
    }

    /// Loader snippet for a configuration
    #[must_use]
    pub fn generate(&self, config: &Configuration) -> String {
        let base = self.base_url(config);
        let src = loader_url(&base, &config.id, config.deployment.surface);
        format!("<script src=\"{}\" async></script>", escape_attribute(&src))
    }

    /// Base URL the loader is served from
    ///
    /// A custom domain without a scheme is served over `https`.
    #[must_use]
    pub fn base_url(&self, config: &Configuration) -> String {
        let raw = config
            .deployment
            .custom_domain
            .as_deref()
            .map(str::trim)
            .filter(|domain| !domain.is_empty())
            .map_or_else(|| self.origin.trim().to_string(), with_scheme);
        raw.trim_end_matches('/').to_string()
    }
}

/// Loader URL for an id and surface under a base URL
#[must_use]
pub fn loader_url(base: &str, id: &ChatbotId, surface: DeploymentSurface) -> String {
    format!(
        "{}/embed?id={}&type={}",
        base.trim_end_matches('/'),
        id,
        surface.as_str()
    )
}

fn escape_attribute(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn with_scheme(domain: &str) -> String {
    if domain.contains("://") {
        domain.to_string()
    } else {
        format!("https://{domain}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> DeploymentDescriptorGenerator {
        DeploymentDescriptorGenerator::new("https://studio.example.com/")
    }

    #[test]
    fn snippet_encodes_id_surface_and_origin() {
        let config = Configuration::create_default("Support Bot");
        let snippet = generator().generate(&config);
        assert_eq!(
            snippet,
            format!(
                "<script src=\"https://studio.example.com/embed?id={}&amp;type=popover\" async></script>",
                config.id
            )
        );
    }

    #[test]
    fn generation_is_deterministic() {
        let config = Configuration::create_default("Support Bot");
        assert_eq!(generator().generate(&config), generator().generate(&config));
    }

    #[test]
    fn surface_change_only_changes_type_parameter() {
        let mut config = Configuration::create_default("Support Bot");
        let before = generator().generate(&config);
        config.deployment.surface = DeploymentSurface::PopupCenter;
        let after = generator().generate(&config);

        assert_ne!(before, after);
        assert_eq!(
            before.replace("type=popover", "type=popup-center"),
            after
        );
    }

    #[test]
    fn custom_domain_overrides_origin() {
        let mut config = Configuration::create_default("Support Bot");
        config.deployment.custom_domain = Some("chat.acme.io/".to_string());
        assert_eq!(generator().base_url(&config), "https://chat.acme.io");

        config.deployment.custom_domain = Some("http://localhost:8080".to_string());
        assert_eq!(generator().base_url(&config), "http://localhost:8080");

        config.deployment.custom_domain = Some("   ".to_string());
        assert_eq!(generator().base_url(&config), "https://studio.example.com");
    }

    #[test]
    fn quotes_in_domain_cannot_break_out_of_src() {
        let mut config = Configuration::create_default("Support Bot");
        config.deployment.custom_domain = Some("evil.com\" onload=\"alert(1)".to_string());
        let snippet = generator().generate(&config);

        assert_eq!(snippet.matches('"').count(), 2);
        assert!(snippet.starts_with("<script src=\"https://evil.com&quot; onload=&quot;alert(1)/embed?"));
        assert_eq!(snippet.matches('<').count(), 2);
    }
}
