//! Configuration management for melodica.
//!
//! This crate resolves where `config.yaml` lives and layers it with defaults
//! and `MELODICA_*` environment variables into a typed [`MelodicaConfig`].

pub mod config;
pub mod paths;

pub use config::{ConfigError, MelodicaConfig, load_config};
