use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::schema::SolaceConfig;

/// Loads the Solace configuration and serves read snapshots of it.
pub struct ConfigLoader {
    config: Arc<RwLock<SolaceConfig>>,
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Resolve the config path: explicit path > SOLACE_CONFIG env > ~/.solace/solace.toml
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(p) = std::env::var("SOLACE_CONFIG") {
            return PathBuf::from(p);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".solace")
            .join("solace.toml")
    }

    /// Load the config from disk, falling back to defaults.
    pub fn load(path: Option<&Path>) -> solace_core::Result<Self> {
        let config_path = Self::resolve_path(path);
        let config = if config_path.exists() {
            info!(?config_path, "loading configuration");
            let raw = std::fs::read_to_string(&config_path)?;
            toml::from_str::<SolaceConfig>(&raw).map_err(|e| {
                solace_core::SolaceError::Config(format!(
                    "failed to parse {}: {}",
                    config_path.display(),
                    e
                ))
            })?
        } else {
            warn!(?config_path, "config file not found, using defaults");
            SolaceConfig::default()
        };

        let config = Self::apply_env_overrides(config);

        // Validate config — log warnings, fail on errors
        match config.validate() {
            Ok(warnings) => {
                for w in &warnings {
                    warn!("{}", w);
                }
            }
            Err(e) => {
                return Err(solace_core::SolaceError::Config(e));
            }
        }

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// Get a read snapshot of the current config.
    pub fn get(&self) -> SolaceConfig {
        self.config.read().clone()
    }

    /// Get a shared reference for subscription.
    pub fn shared(&self) -> Arc<RwLock<SolaceConfig>> {
        Arc::clone(&self.config)
    }

    /// Path the config was loaded from.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Apply env var overrides (SOLACE_LOG_LEVEL, SOLACE_MEMORY_DIR, SOLACE_STORE_ID).
    fn apply_env_overrides(mut config: SolaceConfig) -> SolaceConfig {
        if let Ok(v) = std::env::var("SOLACE_LOG_LEVEL") {
            config.logging.level = v;
        }
        if let Ok(v) = std::env::var("SOLACE_MEMORY_DIR") {
            config.memory.data_dir = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("SOLACE_STORE_ID") {
            config.memory.store_id = v;
        }
        config
    }

    /// Reload the config from disk.
    pub fn reload(&self) -> solace_core::Result<()> {
        if !self.config_path.exists() {
            return Err(solace_core::SolaceError::Config(format!(
                "config file not found: {}",
                self.config_path.display()
            )));
        }
        let raw = std::fs::read_to_string(&self.config_path)?;
        let new_config = toml::from_str::<SolaceConfig>(&raw).map_err(|e| {
            solace_core::SolaceError::Config(format!(
                "failed to parse {}: {}",
                self.config_path.display(),
                e
            ))
        })?;
        let new_config = Self::apply_env_overrides(new_config);
        *self.config.write() = new_config;
        info!("configuration reloaded");
        Ok(())
    }
}
