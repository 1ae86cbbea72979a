// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 pipegraph contributors

//! Editor configuration
//!
//! Loaded from `config.toml`. Every field has a default, so an empty or
//! missing file yields a working configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::errors::{PipegraphError, PipegraphResult};
use crate::graph::LayoutSettings;

/// Default base URL of the pipeline service
pub const DEFAULT_API_URL: &str = "http://localhost:4003";

/// Config file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Editor configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Where pipelines come from
    #[serde(default)]
    pub service: ServiceConfig,

    /// Layout geometry
    #[serde(default)]
    pub layout: LayoutSettings,

    /// Deferred layout timings
    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    /// Viewport used for auto-zoom
    #[serde(default)]
    pub viewport: ViewportConfig,
}

/// Pipeline source settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the pipeline service
    pub api_url: String,

    /// Local pipeline folder; takes precedence over `api_url` when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            directory: None,
            timeout_secs: 30,
        }
    }
}

/// Debounce delays after a pipeline load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Delay before auto-arrange, in milliseconds
    pub arrange_delay_ms: u64,
    /// Delay between auto-arrange and auto-zoom, in milliseconds
    pub zoom_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            arrange_delay_ms: 300,
            zoom_delay_ms: 1000,
        }
    }
}

impl TimingConfig {
    pub fn arrange_delay(&self) -> Duration {
        Duration::from_millis(self.arrange_delay_ms)
    }

    pub fn zoom_delay(&self) -> Duration {
        Duration::from_millis(self.zoom_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Node names longer than this are truncated with `...`
    pub max_name_length: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { max_name_length: 15 }
    }
}

/// Viewport size and zoom padding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f64,
    pub height: f64,
    /// Fraction of the viewport left empty around the graph
    pub padding: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            padding: 0.1,
        }
    }
}

impl EditorConfig {
    /// Load from file; a missing file yields the defaults
    pub fn load(path: &Path) -> PipegraphResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| PipegraphError::FileReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the file named by `--config`, else the platform config file
    pub fn discover(explicit: Option<&Path>) -> PipegraphResult<Self> {
        match explicit {
            Some(path) if !path.exists() => Err(PipegraphError::FileReadError {
                path: path.to_path_buf(),
                error: "file does not exist".into(),
            }),
            Some(path) => Self::load(path),
            None => match default_config_path() {
                Some(path) => {
                    tracing::debug!("Looking for config at {}", path.display());
                    Self::load(&path)
                }
                None => Ok(Self::default()),
            },
        }
    }

    /// Save to file
    pub fn save(&self, path: &Path) -> PipegraphResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| PipegraphError::Toml {
            message: e.to_string(),
        })?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the layout engine cannot work with
    pub fn validate(&self) -> PipegraphResult<()> {
        let invalid = |reason: &str| {
            Err(PipegraphError::InvalidConfig {
                reason: reason.to_string(),
            })
        };

        if self.layout.column_width <= 0.0 {
            return invalid("layout.column_width must be positive");
        }
        if self.layout.margin < 0.0 {
            return invalid("layout.margin must not be negative");
        }
        if self.layout.default_node_height <= 0.0 {
            return invalid("layout.default_node_height must be positive");
        }
        if self.layout.max_settle_passes == 0 {
            return invalid("layout.max_settle_passes must be at least 1");
        }
        if !(0.0..1.0).contains(&self.viewport.padding) {
            return invalid("viewport.padding must be in [0, 1)");
        }
        if self.viewport.width <= 0.0 || self.viewport.height <= 0.0 {
            return invalid("viewport size must be positive");
        }
        if self.display.max_name_length == 0 {
            return invalid("display.max_name_length must be at least 1");
        }
        Ok(())
    }
}

/// `<config_dir>/pipegraph/config.toml` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pipegraph").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Default configuration file content
pub fn generate_default_config() -> String {
    format!(
        r#"# pipegraph configuration

[service]
api_url = "{api}"
# directory = "./pipelines"
timeout_secs = 30

[layout]
column_width = 250.0
margin = 50.0
default_node_height = 250.0
node_width = 180.0
max_settle_passes = 5

[timing]
arrange_delay_ms = 300
zoom_delay_ms = 1000

[display]
max_name_length = 15

[viewport]
width = 1280.0
height = 800.0
padding = 0.1
"#,
        api = DEFAULT_API_URL
    )
}
