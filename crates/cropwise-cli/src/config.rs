//! Service configuration

use crate::cli::Cli;
use anyhow::Context;
use cropwise_engine::{ConstraintTable, EngineConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration loaded from `cropwise.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Directory holding the label encoder and model artifacts
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,

    /// Constraint table file; the built-in table is used when unset
    #[serde(default)]
    pub constraints_path: Option<PathBuf>,

    /// Default model, smoothing and filter settings
    #[serde(flatten)]
    pub engine: EngineConfig,
}

impl ServiceConfig {
    /// Load configuration from file and CLI
    pub fn load(config_path: &str, cli: &Cli) -> anyhow::Result<Self> {
        // Try to load from file, or use defaults
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("failed to read {}", config_path))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("invalid configuration in {}", config_path))?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(models_dir) = &cli.models_dir {
            config.models_dir = models_dir.clone();
        }

        if let Some(constraints) = &cli.constraints {
            config.constraints_path = Some(constraints.clone());
        }

        config.engine.validate()?;
        Ok(config)
    }

    /// Constraint table named by the configuration
    pub fn constraint_table(&self) -> anyhow::Result<ConstraintTable> {
        match &self.constraints_path {
            Some(path) => Ok(ConstraintTable::from_file(path)?),
            None => Ok(ConstraintTable::builtin()),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            constraints_path: None,
            engine: EngineConfig::default(),
        }
    }
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("./models/saved_models")
}
