//! Deployment surface and placement

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the chatbot is mounted on the host page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeploymentSurface {
    /// Launcher button that opens a floating panel
    #[default]
    Popover,
    /// Chat occupies the whole page
    Fullpage,
    /// Modal dialog centered on the page
    PopupCenter,
}

impl DeploymentSurface {
    /// All surfaces, in display order
    pub const ALL: [Self; 3] = [Self::Popover, Self::Fullpage, Self::PopupCenter];

    /// Wire name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Popover => "popover",
            Self::Fullpage => "fullpage",
            Self::PopupCenter => "popup-center",
        }
    }
}

impl std::fmt::Display for DeploymentSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeploymentSurface {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|surface| surface.as_str() == s)
            .ok_or_else(|| format!("unknown deployment surface `{s}`"))
    }
}

/// Corner the launcher is anchored to (popover surface)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetPosition {
    /// Bottom right corner
    #[default]
    BottomRight,
    /// Bottom left corner
    BottomLeft,
    /// Top right corner
    TopRight,
    /// Top left corner
    TopLeft,
}

/// Surface kind plus placement parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    /// Surface kind
    pub surface: DeploymentSurface,
    /// Anchor corner
    #[serde(default)]
    pub position: WidgetPosition,
    /// Horizontal offset from the anchor, in pixels
    #[serde(default = "default_offset")]
    pub offset_x: u32,
    /// Vertical offset from the anchor, in pixels
    #[serde(default = "default_offset")]
    pub offset_y: u32,
    /// Open automatically after this many seconds (`None` = never)
    #[serde(default)]
    pub auto_open_after_secs: Option<u32>,
    /// Host serving the embed loader instead of the studio origin
    #[serde(default)]
    pub custom_domain: Option<String>,
}

fn default_offset() -> u32 {
    20
}

impl Default for Deployment {
    fn default() -> Self {
        Self {
            surface: DeploymentSurface::default(),
            position: WidgetPosition::default(),
            offset_x: default_offset(),
            offset_y: default_offset(),
            auto_open_after_secs: None,
            custom_domain: None,
        }
    }
}
