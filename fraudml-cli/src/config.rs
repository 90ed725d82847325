//! Layered configuration: built-in defaults, then an optional TOML file,
//! then `FRAUDML__SECTION__KEY` environment variables. Command-line flags
//! are applied on top by the caller.

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use fraudml::pipeline::{ArtifactPaths, TrainingConfig, TrainingParams};
use serde::{Deserialize, Serialize};

/// Config file read when `--config` is not given, if it exists.
pub const DEFAULT_CONFIG_PATH: &str = "config/fraudml.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub paths: ArtifactPaths,
    pub training: TrainingParams,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig { host: "0.0.0.0".to_string(), port: 8000 }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset (trace, debug, info, ...).
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig { level: "info".to_string(), format: LogFormat::Pretty }
    }
}

impl AppConfig {
    /// Load configuration. An explicit `path` must exist; otherwise
    /// [`DEFAULT_CONFIG_PATH`] is read when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        AppConfig::load_with_env(path, environment())
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let defaults = Config::try_from(&AppConfig::default()).context("Failed to encode default configuration")?;
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name(DEFAULT_CONFIG_PATH).required(false),
        };
        let config = Config::builder()
            .add_source(defaults)
            .add_source(file)
            .add_source(env)
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    pub fn training_config(&self) -> TrainingConfig {
        TrainingConfig {
            paths: self.paths.clone(),
            params: self.training.clone(),
        }
    }
}

/// `FRAUDML__SECTION__KEY` variables, e.g. `FRAUDML__SERVER__PORT`.
fn environment() -> Environment {
    Environment::with_prefix("FRAUDML")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_standard_layout() {
        let config = AppConfig::default();
        assert_eq!(config.paths.data, Path::new("data/creditcard.csv"));
        assert_eq!(config.paths.model, Path::new("ml_model/fraud_model.json"));
        assert_eq!(config.paths.scaler, Path::new("ml_model/scaler.json"));
        assert_eq!(config.server.bind_addr(), "0.0.0.0:8000");
        assert_eq!(config.training.sample_size, 50_000);
        assert_eq!(config.training.n_iter, 10);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[paths]
model = "artifacts/model.json"

[training]
n_iter = 4

[training.grid]
max_depth = [2, 4]

[server]
port = 9100
"#
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.paths.model, Path::new("artifacts/model.json"));
        assert_eq!(config.paths.scaler, Path::new("ml_model/scaler.json"));
        assert_eq!(config.training.n_iter, 4);
        assert_eq!(config.training.grid.max_depth, vec![2, 4]);
        assert_eq!(config.training.grid.n_estimators, vec![50, 100, 200]);
        assert_eq!(config.server.port, 9100);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        assert!(AppConfig::load(Some(Path::new("/nonexistent/fraudml.toml"))).is_err());
    }

    #[test]
    fn test_environment_overrides_defaults() {
        let vars = config::Map::from([
            ("FRAUDML__LOGGING__FORMAT".to_string(), "json".to_string()),
            ("FRAUDML__SERVER__PORT".to_string(), "9200".to_string()),
        ]);
        let config = AppConfig::load_with_env(None, environment().source(Some(vars))).unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.server.port, 9200);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_training_config_carries_paths_and_params() {
        let mut config = AppConfig::default();
        config.training.seed = 7;
        let training = config.training_config();
        assert_eq!(training.params.seed, 7);
        assert_eq!(training.paths, config.paths);
    }
}
