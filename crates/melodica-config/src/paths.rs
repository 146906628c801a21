//! Discovery of the melodica configuration file.
//!
//! Lookup order:
//! 1. An explicit path (the `--config` flag)
//! 2. `$MELODICA_CONFIG`
//! 3. `$XDG_CONFIG_HOME/melodica/config.yaml`
//! 4. `~/.config/melodica/config.yaml`

use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "MELODICA_CONFIG";

/// File name looked up inside the configuration directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Where the configuration file was found and whether the user asked for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    /// Path of the file.
    pub path: PathBuf,
    /// `true` when named by flag or environment; such a file must exist.
    pub explicit: bool,
}

/// Resolve the configuration file location.
///
/// Returns `None` when nothing was named explicitly and no default file exists.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<ConfigLocation> {
    if let Some(path) = explicit {
        return Some(ConfigLocation {
            path: path.to_path_buf(),
            explicit: true,
        });
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        if !env_path.is_empty() {
            return Some(ConfigLocation {
                path: PathBuf::from(env_path),
                explicit: true,
            });
        }
    }

    default_config_path()
        .filter(|p| p.is_file())
        .map(|path| ConfigLocation {
            path,
            explicit: false,
        })
}

/// The default configuration file path, whether or not it exists.
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("melodica").join(CONFIG_FILE_NAME))
}

/// The user's configuration base directory.
fn config_dir() -> Option<PathBuf> {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return Some(PathBuf::from(xdg));
        }
    }
    home_dir().map(|home| home.join(".config"))
}

/// Get the user's home directory.
fn home_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE").ok().map(PathBuf::from)
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME").ok().map(PathBuf::from)
    }
}
