//! Configuration file support for forge-audit.
//!
//! Configuration is loaded with the following precedence (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables (prefixed with `FORGE_AUDIT_`, nested with `__`,
//!    e.g. `FORGE_AUDIT_FORGE__TOKEN`)
//! 3. Config file (./forge-audit.toml, then ~/.config/forge-audit/config.toml)
//! 4. Built-in defaults
//!
//! Example config file:
//! ```toml
//! [forge]
//! provider = "forgejo"                  # or "github"; inferred from base_url when unset
//! base_url = "https://codeberg.org"     # required for forgejo
//! token = "..."                         # single token
//! tokens_file = "tokens.txt"            # or one token per line
//!
//! [export]
//! pacing_ms = 50
//! include_forks = false
//! ```

use std::path::PathBuf;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use forge_audit::ProviderKind;
use forge_audit::platform::DEFAULT_PACING;
use serde::Deserialize;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which forge to talk to and how to authenticate.
    pub forge: ForgeConfig,
    /// Export defaults.
    pub export: ExportConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    pub provider: Option<ProviderKind>,
    /// API host. Required for Forgejo, a GitHub Enterprise root for GitHub.
    pub base_url: Option<String>,
    pub token: Option<String>,
    /// File with one token per line.
    pub tokens_file: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Delay between consecutive requests, in milliseconds.
    pub pacing_ms: u64,
    /// Also export every fork of each listed repository.
    pub include_forks: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            pacing_ms: DEFAULT_PACING.as_millis() as u64,
            include_forks: false,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier):
    /// 1. Built-in defaults
    /// 2. XDG config file (~/.config/forge-audit/config.toml)
    /// 3. Local config file (./forge-audit.toml)
    /// 4. Environment variables with FORGE_AUDIT_ prefix
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = Self::default_config_path()
            && path.exists()
        {
            tracing::debug!("Loading config from {:?}", path);
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(false));
        }

        let local_config = PathBuf::from("forge-audit.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./forge-audit.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        // FORGE_AUDIT_FORGE__BASE_URL -> forge.base_url
        builder = builder.add_source(Self::environment());

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        }
    }

    fn environment() -> Environment {
        Environment::with_prefix("FORGE_AUDIT")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "forge-audit").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
