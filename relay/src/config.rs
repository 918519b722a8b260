//! Configuration loading
//!
//! A config file is searched in order:
//! 1. an explicit path (`--config` / `RELAY_CONFIG_PATH`), which must exist
//! 2. `./command-relay.toml`
//! 3. `$XDG_CONFIG_HOME/command-relay/config.toml`
//! 4. `~/.command-relay.toml`
//! 5. built-in defaults
//!
//! `API_TOKEN`, `ALLOWED_SUDO` (comma-separated) and `PORT` from the
//! environment override whatever the file says.

use std::path::{Path, PathBuf};

use crate::types::{ConfigError, RelayConfig};

impl RelayConfig {
    /// Load config from the file system and the process environment
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(explicit, &standard_paths(), |key| std::env::var(key).ok())
    }

    /// Load from `explicit`, else the first existing entry of `search`, else
    /// defaults; then apply environment overrides from `lookup`
    pub fn load_from<F>(
        explicit: Option<&Path>,
        search: &[PathBuf],
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::load_from_path(path)?
            }
            None => match search.iter().find(|p| p.exists()) {
                Some(path) => Self::load_from_path(path)?,
                None => {
                    tracing::info!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Load from a specific TOML file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: RelayConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.allowed_sudo = normalize_allow_list(config.allowed_sudo);

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply `API_TOKEN`, `ALLOWED_SUDO` and `PORT` overrides
    ///
    /// `lookup` abstracts the environment so callers can supply their own.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("API_TOKEN") {
            self.api_token = token;
        }

        if let Some(list) = lookup("ALLOWED_SUDO") {
            self.allowed_sudo =
                normalize_allow_list(list.split(',').map(str::to_string).collect());
        }

        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }

        Ok(())
    }

    /// Refuse to serve without a token
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        Ok(())
    }
}

/// Trim entries and drop blanks; surrounding whitespace could never match a
/// trimmed sudo remainder anyway
fn normalize_allow_list(entries: Vec<String>) -> Vec<String> {
    entries
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect()
}

fn standard_paths() -> Vec<PathBuf> {
    search_paths(
        Path::new("."),
        dirs::config_dir().as_deref(),
        dirs::home_dir().as_deref(),
    )
}

fn search_paths(cwd: &Path, config_dir: Option<&Path>, home: Option<&Path>) -> Vec<PathBuf> {
    let mut paths = vec![cwd.join("command-relay.toml")];

    if let Some(config_dir) = config_dir {
        paths.push(config_dir.join("command-relay").join("config.toml"));
    }

    if let Some(home) = home {
        paths.push(home.join(".command-relay.toml"));
    }

    paths
}
