//! Editor configuration
//!
//! Loaded from TOML. Every field has a default, so a missing file or a
//! partial file is fine.
//!
//! ```toml
//! rebuild_link_delay_ms = 50
//! state_poll_interval_ms = 1000
//! default_link_type = "backbone"
//! default_node_type = "Router"
//! canvas_width = 1200.0
//! canvas_height = 800.0
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use topolab_core::{LinkType, NodeType};

/// Tunables for the editor and its session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Delay between a rebuild's node phase and its link phase
    pub rebuild_link_delay_ms: u64,
    /// Interval of the background state poll
    pub state_poll_interval_ms: u64,
    /// Link type selected when the editor opens
    pub default_link_type: LinkType,
    /// Node type selected when the editor opens
    pub default_node_type: NodeType,
    /// Width of the drawing area, used to place new nodes at its center
    pub canvas_width: f64,
    /// Height of the drawing area
    pub canvas_height: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            rebuild_link_delay_ms: 50,
            state_poll_interval_ms: 1000,
            default_link_type: LinkType::Backbone,
            default_node_type: NodeType::Router,
            canvas_width: 1200.0,
            canvas_height: 800.0,
        }
    }
}

impl EditorConfig {
    /// Load from a TOML file; a missing file yields the defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), "loaded editor config");
        Ok(config)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rebuild_link_delay_ms == 0 {
            return Err(ConfigError::Invalid(
                "rebuild_link_delay_ms must be positive".to_string(),
            ));
        }
        if self.state_poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "state_poll_interval_ms must be positive".to_string(),
            ));
        }
        if !(self.canvas_width > 0.0 && self.canvas_height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "canvas size must be positive, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        Ok(())
    }

    /// Rebuild link-phase delay.
    pub fn rebuild_link_delay(&self) -> Duration {
        Duration::from_millis(self.rebuild_link_delay_ms)
    }

    /// State poll interval.
    pub fn state_poll_interval(&self) -> Duration {
        Duration::from_millis(self.state_poll_interval_ms)
    }

    /// Center of the drawing area.
    pub fn canvas_center(&self) -> (f64, f64) {
        (self.canvas_width / 2.0, self.canvas_height / 2.0)
    }
}
