//! Render surface addressing

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use studio_model::{ChatbotId, DeploymentSurface};

/// Device the preview emulates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceHint {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl DeviceHint {
    /// Query-string value for the `device` parameter
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Desktop => "desktop",
            Self::Tablet => "tablet",
            Self::Mobile => "mobile",
        }
    }
}

impl fmt::Display for DeviceHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceHint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desktop" => Ok(Self::Desktop),
            "tablet" => Ok(Self::Tablet),
            "mobile" => Ok(Self::Mobile),
            other => Err(format!("unknown device hint: {other}")),
        }
    }
}

/// `/chat/{id}?preview=true&deploymentType={surface}[&device={hint}]`
#[must_use]
pub fn preview_url(
    base: &str,
    id: &ChatbotId,
    surface: DeploymentSurface,
    device: Option<DeviceHint>,
) -> String {
    let mut url = format!(
        "{}/chat/{}?preview=true&deploymentType={}",
        base.trim_end_matches('/'),
        id,
        surface
    );
    if let Some(device) = device {
        url.push_str("&device=");
        url.push_str(device.as_str());
    }
    url
}
