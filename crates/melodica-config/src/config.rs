//! Configuration types and loading.
//!
//! The main entry point is [`MelodicaConfig`], assembled by [`load_config`]
//! from three layers, later layers winning:
//!
//! 1. serde defaults
//! 2. the YAML file located by [`crate::paths::resolve_config_path`]
//! 3. `MELODICA_*` environment variables (`__` separates nested keys, e.g.
//!    `MELODICA_VOLUME__INITIAL=0.5`)
//!
//! Command-line overrides are applied by the binary after loading.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::paths::resolve_config_path;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly named configuration file does not exist.
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The layered configuration could not be extracted.
    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),

    /// The configuration could not be rendered as YAML.
    #[error("failed to render configuration: {0}")]
    Render(#[from] serde_yaml::Error),

    /// A configuration value was invalid.
    #[error("invalid configuration value for key '{key}': {reason}")]
    InvalidValue {
        /// The configuration key that had an invalid value.
        key: String,
        /// A description of why the value is invalid.
        reason: String,
    },
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Volume configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeConfig {
    /// Gain factor at startup (1.0 = unchanged).
    #[serde(default = "default_volume_initial")]
    pub initial: f64,

    /// Increment applied by the volume keys.
    #[serde(default = "default_volume_step")]
    pub step: f64,

    /// Largest allowed gain factor.
    #[serde(default = "default_volume_max")]
    pub max: f64,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            initial: default_volume_initial(),
            step: default_volume_step(),
            max: default_volume_max(),
        }
    }
}

fn default_volume_initial() -> f64 {
    1.0
}

fn default_volume_step() -> f64 {
    0.1
}

fn default_volume_max() -> f64 {
    2.0
}

/// Playback configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Start the next track when one finishes, looping at the end.
    #[serde(default = "default_true")]
    pub auto_advance: bool,

    /// How often a paused worker checks whether it may continue.
    #[serde(default = "default_pause_poll_ms")]
    pub pause_poll_ms: u64,

    /// Maximum number of decoded chunks queued on the output device.
    #[serde(default = "default_queue_chunks")]
    pub queue_chunks: usize,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            auto_advance: true,
            pause_poll_ms: default_pause_poll_ms(),
            queue_chunks: default_queue_chunks(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_pause_poll_ms() -> u64 {
    100
}

fn default_queue_chunks() -> usize {
    8
}

/// Network configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Whole-request timeout for fetching a track.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Largest track body that will be buffered in memory.
    #[serde(default = "default_max_track_bytes")]
    pub max_track_bytes: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_track_bytes: default_max_track_bytes(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_track_bytes() -> u64 {
    256 * 1024 * 1024
}

// ---------------------------------------------------------------------------
// Main config struct
// ---------------------------------------------------------------------------

/// The full melodica configuration.
///
/// All fields use serde defaults so that a partially specified YAML file
/// deserializes with sensible values for everything it leaves out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MelodicaConfig {
    /// File the player appends its log to.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,

    /// Default tracing filter (overridden by `RUST_LOG`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Volume configuration.
    #[serde(default)]
    pub volume: VolumeConfig,

    /// Playback configuration.
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Network configuration.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Where the file layer came from (not serialized).
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl Default for MelodicaConfig {
    fn default() -> Self {
        Self {
            log_file: default_log_file(),
            log_level: default_log_level(),
            volume: VolumeConfig::default(),
            playback: PlaybackConfig::default(),
            network: NetworkConfig::default(),
            source: None,
        }
    }
}

fn default_log_file() -> PathBuf {
    PathBuf::from("melodica.log")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl MelodicaConfig {
    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending key.
    pub fn validate(&self) -> Result<()> {
        let v = &self.volume;
        if !(v.max.is_finite() && v.max > 0.0) {
            return Err(invalid("volume.max", "must be a positive number"));
        }
        if !(v.step.is_finite() && v.step > 0.0) {
            return Err(invalid("volume.step", "must be a positive number"));
        }
        if !(0.0..=v.max).contains(&v.initial) {
            return Err(invalid(
                "volume.initial",
                &format!("must be between 0.0 and {}", v.max),
            ));
        }
        if self.playback.queue_chunks == 0 {
            return Err(invalid("playback.queue_chunks", "must be at least 1"));
        }
        if self.playback.pause_poll_ms == 0 {
            return Err(invalid("playback.pause_poll_ms", "must be at least 1"));
        }
        if self.network.timeout_secs == 0 {
            return Err(invalid("network.timeout_secs", "must be at least 1"));
        }
        Ok(())
    }

    /// Render the configuration as YAML.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn invalid(key: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the layered figment for an optional configuration file.
pub fn figment(file: Option<&Path>) -> Figment {
    let mut figment = Figment::from(Serialized::defaults(MelodicaConfig::default()));
    if let Some(path) = file {
        figment = figment.merge(Yaml::file(path));
    }
    figment.merge(
        Env::prefixed("MELODICA_")
            .ignore(&["config"])
            .split("__"),
    )
}

/// Load and validate the configuration.
///
/// `explicit` is the `--config` flag; see [`crate::paths`] for the lookup order.
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] when an explicitly named file is missing,
/// [`ConfigError::Load`] when a layer cannot be parsed, or
/// [`ConfigError::InvalidValue`] when validation fails.
pub fn load_config(explicit: Option<&Path>) -> Result<MelodicaConfig> {
    let location = resolve_config_path(explicit);
    if let Some(ref loc) = location {
        if loc.explicit && !loc.path.is_file() {
            return Err(ConfigError::NotFound(loc.path.clone()));
        }
    }

    let file = location.as_ref().map(|loc| loc.path.as_path());
    let mut config: MelodicaConfig = figment(file).extract()?;
    config.source = file.map(Path::to_path_buf);
    config.validate()?;

    tracing::debug!(source = ?config.source, "configuration loaded");
    Ok(config)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
