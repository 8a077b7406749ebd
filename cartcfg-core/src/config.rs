//! src/config.rs
//! ============================================================================
//! # Config: Configurator Settings Loader and Saver
//!
//! Loads and saves settings as TOML from the platform config directory
//! (via [`directories`](https://docs.rs/directories)) or from an explicit path.
//! Presentation text, screen geometry, the list scan cap and the register
//! window location all live here rather than in code.
//!
//! ## Example
//! ```rust,ignore
//! let config = Config::load().await?;
//! let layout = config.ui.layout();
//! ```

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use tokio::fs as TokioFs;

use crate::controller::keymap::Keymap;
use crate::error::AppError;
use crate::logging::LoggerConfig;
use crate::protocol::command::DEFAULT_PROTOCOL_HEADER;
use crate::protocol::transport::{DEFAULT_BASE_ADDRESS, DEFAULT_WINDOW_SIZE};
use crate::view::console::ScreenLayout;

/// Selector presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Items per page
    pub page_size: usize,

    /// Noun shown in the header, e.g. "ROM images found: 12."
    pub item_label: String,

    /// Title centered on the first screen line
    pub title: String,

    pub keymap: Keymap,

    pub top_line: u16,

    pub help_line: u16,

    pub column_width: u16,
}

impl Default for UiConfig {
    fn default() -> Self {
        let layout = ScreenLayout::default();
        Self {
            page_size: 17,
            item_label: "ROM images".to_string(),
            title: "Cartridge configurator".to_string(),
            keymap: Keymap::Standard,
            top_line: layout.top_line,
            help_line: layout.help_line,
            column_width: layout.column_width,
        }
    }
}

impl UiConfig {
    #[must_use]
    pub const fn layout(&self) -> ScreenLayout {
        ScreenLayout {
            top_line: self.top_line,
            help_line: self.help_line,
            column_width: self.column_width,
        }
    }
}

/// File list acquisition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ListConfig {
    /// Hard cap on bytes scanned for the end-of-list marker
    pub max_bytes: usize,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self { max_bytes: 64 * 1024 }
    }
}

/// Register window location and protocol constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Absolute address of the register window
    pub base_address: u64,

    pub window_size: usize,

    /// Offset strobed before every command
    pub protocol_header: u16,

    /// Device file mapped for real hardware access; dry run when unset
    pub device: Option<PathBuf>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_address: DEFAULT_BASE_ADDRESS,
            window_size: DEFAULT_WINDOW_SIZE,
            protocol_header: DEFAULT_PROTOCOL_HEADER,
            device: None,
        }
    }
}

/// Main configuration struct for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub list: ListConfig,

    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)] // Backward compatibility - use default if missing
    pub logging: LoggerConfig,
}

impl Config {
    /// Loads config from the platform config dir, creating it with defaults
    /// when missing.
    pub async fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Ok(Self::load_from(&path).await?)
        } else {
            info!(
                "No config file found at {}, using default configuration. Creating it now.",
                path.display()
            );

            let default_config = Self::default();
            default_config.save_to(&path).await?;

            Ok(default_config)
        }
    }

    /// Loads and validates config from an explicit TOML file.
    pub async fn load_from(path: &Path) -> Result<Self, AppError> {
        info!("Loading config from {}", path.display());
        let text = TokioFs::read_to_string(path).await?;
        let cfg: Self = toml::from_str(&text)?;
        cfg.validate()?;

        Ok(cfg)
    }

    pub async fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        info!("Saving config to {}", path.display());

        if let Some(parent) = path.parent() {
            TokioFs::create_dir_all(parent).await?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        TokioFs::write(path, toml_str).await?;

        Ok(())
    }

    /// Reject settings the selector cannot draw or the transport cannot use.
    pub fn validate(&self) -> Result<(), AppError> {
        let ui = &self.ui;
        if ui.page_size == 0 {
            return Err(AppError::invalid_input(
                "ui.page_size",
                "must hold at least one item",
            ));
        }

        if ui.column_width == 0 {
            return Err(AppError::invalid_input("ui.column_width", "must be positive"));
        }

        let rows = usize::from(ui.layout().max_rows());
        if ui.page_size > rows {
            return Err(AppError::invalid_input(
                "ui.page_size",
                format!("{} rows do not fit above the help line ({rows} available)", ui.page_size),
            ));
        }

        if self.list.max_bytes < 2 {
            return Err(AppError::invalid_input(
                "list.max_bytes",
                "must cover at least the end-of-list marker",
            ));
        }

        if self.transport.window_size == 0 {
            return Err(AppError::invalid_input(
                "transport.window_size",
                "must be positive",
            ));
        }

        Ok(())
    }

    /// Returns the canonical config file path using `directories::ProjectDirs`.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "cartcfg", "cartcfg")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory."))?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }
}
