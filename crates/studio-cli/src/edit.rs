//! Draft edits given on the command line

use anyhow::{bail, Context, Result};
use serde_json::Value as JsonValue;
use studio_model::{Configuration, DeploymentSurface};

/// Field changes requested for one save
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct DraftEdits {
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) website: Option<String>,
    pub(crate) surface: Option<DeploymentSurface>,
    pub(crate) custom_domain: Option<String>,
    /// Presentation assignments, `path=value`
    pub(crate) presentation: Vec<String>,
}

impl DraftEdits {
    pub(crate) fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply onto a draft; touches `updated_at` if anything changed
    pub(crate) fn apply(&self, config: &mut Configuration) -> Result<()> {
        if self.is_empty() {
            return Ok(());
        }
        if let Some(name) = &self.name {
            config.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            config.description.clone_from(description);
        }
        if let Some(website) = &self.website {
            config.website.clone_from(website);
        }
        if let Some(surface) = self.surface {
            config.deployment.surface = surface;
        }
        if let Some(domain) = &self.custom_domain {
            config.deployment.custom_domain = (!domain.is_empty()).then(|| domain.clone());
        }
        for assignment in &self.presentation {
            let (pointer, value) = parse_assignment(assignment)?;
            if !config.presentation.set(&pointer, value) {
                bail!("cannot set presentation field {pointer}");
            }
        }
        config.touch();
        Ok(())
    }
}

/// Split `colors.primary=#fff` into a JSON pointer and a value
///
/// The value is read as JSON when it parses, as a plain string otherwise.
pub(crate) fn parse_assignment(raw: &str) -> Result<(String, JsonValue)> {
    let (path, value) = raw
        .split_once('=')
        .with_context(|| format!("expected path=value, got {raw:?}"))?;
    let path = path.trim();
    if path.is_empty() {
        bail!("empty presentation path in {raw:?}");
    }

    let pointer = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path.replace('.', "/"))
    };
    let value = serde_json::from_str(value).unwrap_or_else(|_| JsonValue::String(value.to_string()));
    Ok((pointer, value))
}
