use std::path::PathBuf;

use pico_args::Arguments;

use super::FoldList;
use crate::experiment::ExperimentConfig;

/// Command line overrides for an [`ExperimentConfig`]. Unset options keep the config's values.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    /// A JSON config to start from
    pub config: Option<PathBuf>,

    /// Dataset name
    pub dataset: Option<String>,

    /// The annotated JSON corpus
    pub json_file: Option<PathBuf>,

    /// Top-level data folder
    pub data_folder: Option<PathBuf>,

    /// Cross-validation folder
    pub cv_folder: Option<PathBuf>,

    /// Experiment output folder
    pub expt_folder: Option<PathBuf>,

    /// Number of folds
    pub num_folds: Option<usize>,

    /// Train to dev ratio of the non-test documents
    pub ratio: Option<f64>,

    /// Partition and model seed
    pub seed: Option<u64>,

    /// Group documents by their first label when partitioning
    pub stratify: bool,

    /// Model name
    pub model: Option<String>,

    /// Decision threshold for models that score labels
    pub threshold: Option<f64>,

    /// Folds to run
    pub folds: Option<FoldList>,
}

impl ConfigOverrides {
    /// Consume the shared options from the argument list
    pub fn parse(pargs: &mut Arguments) -> Result<Self, pico_args::Error> {
        Ok(Self {
            config: pargs.opt_value_from_str(["-c", "--config"])?,
            dataset: pargs.opt_value_from_str("--dataset")?,
            json_file: pargs.opt_value_from_str(["-j", "--json-file"])?,
            data_folder: pargs.opt_value_from_str(["-d", "--data-folder"])?,
            cv_folder: pargs.opt_value_from_str("--cv-folder")?,
            expt_folder: pargs.opt_value_from_str(["-e", "--expt-folder"])?,
            num_folds: pargs.opt_value_from_str(["-k", "--num-folds"])?,
            ratio: pargs.opt_value_from_str(["-r", "--ratio"])?,
            seed: pargs.opt_value_from_str(["-s", "--seed"])?,
            stratify: pargs.contains("--stratify"),
            model: pargs.opt_value_from_str(["-m", "--model"])?,
            threshold: pargs.opt_value_from_str(["-t", "--threshold"])?,
            folds: pargs.opt_value_from_str(["-f", "--fold"])?,
        })
    }

    /// Load the base config, if one was given, and apply every override to it
    pub fn resolve(self) -> anyhow::Result<ExperimentConfig> {
        let mut config = match &self.config {
            Some(path) => ExperimentConfig::load(path)?,
            None => ExperimentConfig::default(),
        };

        self.apply(&mut config);

        Ok(config)
    }

    /// Apply every set override to `config`
    pub fn apply(self, config: &mut ExperimentConfig) {
        if let Some(dataset) = self.dataset {
            config.dataset = dataset;
        }

        if let Some(json_file) = self.json_file {
            config.json_file = json_file;
        }

        if let Some(data_folder) = self.data_folder {
            config.data_folder = data_folder;
        }

        if let Some(cv_folder) = self.cv_folder {
            config.cv_folder = cv_folder;
        }

        if let Some(expt_folder) = self.expt_folder {
            config.expt_folder = expt_folder;
        }

        if let Some(num_folds) = self.num_folds {
            config.cross_validation.partition.num_folds = num_folds;
        }

        if let Some(ratio) = self.ratio {
            config.cross_validation.partition.train_to_dev_ratio = ratio;
        }

        if let Some(seed) = self.seed {
            config.cross_validation.partition.seed = seed;
            config.seed = seed;
        }

        if self.stratify {
            config.cross_validation.stratify = true;
        }

        if let Some(model) = self.model {
            config.model = model;
        }

        if self.threshold.is_some() {
            config.threshold = self.threshold;
        }

        if let Some(FoldList(folds)) = self.folds {
            config.folds = folds;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsString;

    use super::*;

    fn args(values: &[&str]) -> Arguments {
        Arguments::from_vec(values.iter().map(OsString::from).collect())
    }

    #[test]
    fn test_overrides_apply_to_defaults() {
        let mut pargs = args(&[
            "-k",
            "3",
            "--ratio",
            "0.5",
            "--fold",
            "0,2",
            "-m",
            "none",
            "--stratify",
        ]);
        let config = ConfigOverrides::parse(&mut pargs).unwrap().resolve().unwrap();

        assert_eq!(config.cross_validation.partition.num_folds, 3);
        assert_eq!(config.cross_validation.partition.train_to_dev_ratio, 0.5);
        assert!(config.cross_validation.stratify);
        assert_eq!(config.folds, vec![0, 2]);
        assert_eq!(config.model, "none");
        assert_eq!(config.dataset, "compuframes");
    }

    #[test]
    fn test_overrides_apply_on_top_of_a_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut base = ExperimentConfig::default();
        base.dataset = "frames".to_string();
        base.seed = 9;
        base.save(&path).unwrap();

        let mut pargs = args(&["--config", path.to_str().unwrap(), "--dataset", "other"]);
        let config = ConfigOverrides::parse(&mut pargs).unwrap().resolve().unwrap();

        assert_eq!(config.dataset, "other");
        assert_eq!(config.seed, 9);
    }

    #[test]
    fn test_bad_fold_list_is_rejected() {
        let mut pargs = args(&["--fold", "0,x"]);

        assert!(ConfigOverrides::parse(&mut pargs).is_err());
    }
}
