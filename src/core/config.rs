//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.promptkit/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//!
//! Only `main` reads configuration. Everything below it receives the
//! resolved values.

use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::relay::server::DEFAULT_PORT;
use crate::core::tree::DEFAULT_MAX_DEPTH;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PromptkitConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub relay: RelayConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub max_depth: Option<usize>,
    pub poll_interval_secs: Option<u64>,
    pub log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RelayConfig {
    pub enabled: Option<bool>,
    pub bind: Option<String>,
    pub port: Option<u16>,
}

/// Values given on the command line. `None`/`false` means "not specified".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub root: Option<PathBuf>,
    pub port: Option<u16>,
    pub no_relay: bool,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;
pub const DEFAULT_BIND: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

const ENV_RELAY_PORT: &str = "PROMPTKIT_RELAY_PORT";
const ENV_LOG_LEVEL: &str = "PROMPTKIT_LOG_LEVEL";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub root: PathBuf,
    pub max_depth: usize,
    pub poll_interval: Duration,
    pub log_level: LevelFilter,
    pub relay_enabled: bool,
    pub relay_addr: SocketAddr,
    /// Values that were rejected during resolution. Resolution runs before
    /// the logger is up, so `main` logs these once it is.
    pub warnings: Vec<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Loading
// ============================================================================

fn promptkit_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".promptkit"))
}

/// Returns the path to `~/.promptkit/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    promptkit_dir().map(|d| d.join("config.toml"))
}

/// Returns the path to `~/.promptkit/promptkit.log`.
pub fn log_path() -> Option<PathBuf> {
    promptkit_dir().map(|d| d.join("promptkit.log"))
}

/// Load config from `~/.promptkit/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `PromptkitConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<PromptkitConfig, ConfigError> {
    let Some(path) = config_path() else {
        warn!("Could not determine home directory, using default config");
        return Ok(PromptkitConfig::default());
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<PromptkitConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(PromptkitConfig::default());
    }

    let contents = fs::read_to_string(path)?;
    let config: PromptkitConfig = toml::from_str(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

const DEFAULT_CONFIG: &str = r#"# promptkit configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# max_depth = 3                # Deepest directory level listed (root is 0)
# poll_interval_secs = 2       # How often extension connectivity is re-checked
# log_level = "info"           # Or set PROMPTKIT_LOG_LEVEL

# [relay]
# enabled = true               # Or pass --no-relay
# bind = "127.0.0.1"
# port = 32123                 # Or set PROMPTKIT_RELAY_PORT / pass --port
"#;

fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &PromptkitConfig, cli: &CliOverrides) -> ResolvedConfig {
    resolve_with_env(config, cli, |key| std::env::var(key).ok())
}

/// Same as [`resolve`], reading environment variables through `env`.
pub fn resolve_with_env(
    config: &PromptkitConfig,
    cli: &CliOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    let mut warnings = Vec::new();

    // Port: CLI → env → config → default
    let env_port = env(ENV_RELAY_PORT).and_then(|raw| match raw.parse::<u16>() {
        Ok(port) => Some(port),
        Err(_) => {
            warnings.push(format!("Ignoring invalid {}={:?}", ENV_RELAY_PORT, raw));
            None
        }
    });
    let port = cli
        .port
        .or(env_port)
        .or(config.relay.port)
        .unwrap_or(DEFAULT_PORT);

    let bind = match config.relay.bind.as_deref() {
        Some(raw) => raw.parse::<IpAddr>().unwrap_or_else(|_| {
            warnings.push(format!("Ignoring invalid relay bind address {:?}", raw));
            DEFAULT_BIND
        }),
        None => DEFAULT_BIND,
    };

    // Log level: env → config → default
    let log_level = match env(ENV_LOG_LEVEL).or_else(|| config.general.log_level.clone()) {
        Some(raw) => raw.parse::<LevelFilter>().unwrap_or_else(|_| {
            warnings.push(format!("Ignoring invalid log level {:?}", raw));
            DEFAULT_LOG_LEVEL
        }),
        None => DEFAULT_LOG_LEVEL,
    };

    if config.general.poll_interval_secs == Some(0) {
        warnings.push("Ignoring poll_interval_secs = 0".to_string());
    }
    let poll_secs = config
        .general
        .poll_interval_secs
        .filter(|secs| *secs > 0)
        .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);

    ResolvedConfig {
        root: cli.root.clone().unwrap_or_else(|| PathBuf::from(".")),
        max_depth: config.general.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
        poll_interval: Duration::from_secs(poll_secs),
        log_level,
        relay_enabled: !cli.no_relay && config.relay.enabled.unwrap_or(true),
        relay_addr: SocketAddr::new(bind, port),
        warnings,
    }
}
