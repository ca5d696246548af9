use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,

    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL for the user store, e.g. `sqlite:users.db`.
    pub url: String,

    pub max_connections: u32,

    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:userstore.db".to_string(),
            max_connections: 5,
            min_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Argon2 memory cost in KiB (default: 8192 = 8MB)
    /// Lower values reduce memory usage but decrease GPU resistance.
    pub argon2_memory_cost_kib: u32,

    /// Argon2 time cost (iterations) - higher = more CPU work
    pub argon2_time_cost: u32,

    /// Argon2 parallelism (default: 1)
    pub argon2_parallelism: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            argon2_memory_cost_kib: 8192,
            argon2_time_cost: 3,
            argon2_parallelism: 1,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Self::config_paths();

        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                return Self::load_from_path(path);
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.database.max_connections >= 1,
            "database.max_connections must be at least 1"
        );
        anyhow::ensure!(
            self.database.min_connections <= self.database.max_connections,
            "database.min_connections must not exceed max_connections"
        );
        anyhow::ensure!(
            self.security.argon2_parallelism >= 1,
            "security.argon2_parallelism must be at least 1"
        );
        anyhow::ensure!(
            self.security.argon2_time_cost >= 1,
            "security.argon2_time_cost must be at least 1"
        );
        anyhow::ensure!(
            self.security.argon2_memory_cost_kib >= 8,
            "security.argon2_memory_cost_kib must be at least 8"
        );
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        vec![PathBuf::from("userstore.toml")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.security.argon2_time_cost, 3);
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            [database]
            url = "sqlite:/tmp/auth.db"

            [security]
            argon2_time_cost = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.database.url, "sqlite:/tmp/auth.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.security.argon2_time_cost, 4);
        assert_eq!(config.security.argon2_memory_cost_kib, 8192);
    }

    #[test]
    fn rejects_zero_parallelism() {
        let mut config = Config::default();
        config.security.argon2_parallelism = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_inverted_pool_sizes() {
        let mut config = Config::default();
        config.database.min_connections = 10;
        assert!(config.validate().is_err());
    }
}
