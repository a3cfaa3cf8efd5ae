use std::{fs, path::{Path, PathBuf}};

use anyhow::Context;
use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::{cross_validation::CrossValidationConfig, models::random};

/// The config file name inside an experiment folder
pub static CONFIG_FILE: &str = "config.json";

/// Folders, corpus, and model settings shared by every run mode
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, new)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Dataset name, used for file stems and result folders
    #[new(value = "\"compuframes\".to_string()")]
    pub dataset: String,

    /// The annotated JSON corpus
    #[new(value = "PathBuf::from(\"corpus.json\")")]
    pub json_file: PathBuf,

    /// Top-level data folder
    #[new(value = "PathBuf::from(\"data\")")]
    pub data_folder: PathBuf,

    /// Folder under `data_folder` for the unpartitioned format
    #[new(value = "\"format\".to_string()")]
    pub format_folder: String,

    /// Cross-validation folder
    #[new(value = "PathBuf::from(\"cv\")")]
    pub cv_folder: PathBuf,

    /// Top-level experiment output folder
    #[new(value = "PathBuf::from(\"experiment\")")]
    pub expt_folder: PathBuf,

    /// Partitioning and formatting options
    #[new(default)]
    pub cross_validation: CrossValidationConfig,

    /// Model name (e.g., "random")
    #[new(value = "random::NAME.to_string()")]
    pub model: String,

    /// Model seed
    #[new(value = "1")]
    pub seed: u64,

    /// Optional decision threshold for models that score labels
    #[new(default)]
    pub threshold: Option<f64>,

    /// Folds to run. Empty means every fold.
    #[new(default)]
    pub folds: Vec<usize>,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ExperimentConfig {
    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("unable to read config {}", path.display()))?;

        serde_json::from_str(&json).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Save the config as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("unable to write config {}", path.display()))
    }

    /// Where the unpartitioned format is written
    pub fn format_path(&self) -> PathBuf {
        self.data_folder.join(&self.format_folder)
    }

    /// Where a fold's results for the configured model go
    pub fn results_folder(&self, fold_name: &str) -> PathBuf {
        self.expt_folder
            .join(&self.dataset)
            .join(fold_name)
            .join(&self.model)
            .join("te-results")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        let mut config = ExperimentConfig::default();
        config.folds = vec![0, 2];
        config.cross_validation.partition.num_folds = 3;
        config.save(&path).unwrap();

        assert_eq!(ExperimentConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        let json = r#"{"dataset": "frames", "cross_validation": {"partition": {"num_folds": 2}}}"#;
        fs::write(&path, json).unwrap();

        let config = ExperimentConfig::load(&path).unwrap();

        assert_eq!(config.dataset, "frames");
        assert_eq!(config.model, "random");
        assert_eq!(config.cross_validation.partition.num_folds, 2);
        assert_eq!(config.cross_validation.partition.train_to_dev_ratio, 0.8);
        assert_eq!(
            config.results_folder("fold-1"),
            PathBuf::from("experiment/frames/fold-1/random/te-results")
        );
    }
}
