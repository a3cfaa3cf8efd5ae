use std::{
    fmt::{self, Display},
    fs,
    path::{Path, PathBuf},
};

use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::{
    corpus::LabeledTexts,
    format::{
        FormatSummary, FormattedDataset, Formatter, FormatterConfig, FormattingError,
        UnseenLabelPolicy,
    },
    vocab::VocabularyContext,
};

/// Fold descriptors and split naming
pub mod fold;

/// Seeded document partitioning
pub mod partition;

pub use fold::{Fold, Split};
pub use partition::{partition, PartitionConfig, PartitionError};

/// The descriptor file at the root of a cross-validation folder
pub static CV_FILE: &str = "cv.json";

/// Cross-validation options
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, new)]
#[serde(default)]
pub struct CrossValidationConfig {
    /// Fold dealing
    #[new(default)]
    pub partition: PartitionConfig,

    /// Per-split formatting
    #[new(default)]
    pub formatter: FormatterConfig,

    /// Deal each document's first label evenly across folds
    #[new(value = "false")]
    pub stratify: bool,
}

impl Default for CrossValidationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Persisted cross-validation layout
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Descriptor {
    config: CrossValidationConfig,
    ids: Vec<String>,
    num_folds: usize,
}

/// How far a fold got through formatting
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FoldStage {
    /// Descriptor persisted, nothing formatted
    Created,

    /// Training split written, vocabulary frozen
    TrainFormatted,

    /// Development split written
    DevFormatted,

    /// Test split written
    TestFormatted,

    /// Every split written
    Ready,
}

impl FoldStage {
    fn after(split: Split) -> Self {
        match split {
            Split::Train => FoldStage::TrainFormatted,
            Split::Dev => FoldStage::DevFormatted,
            Split::Test => FoldStage::TestFormatted,
        }
    }
}

/// The result of formatting one fold
#[derive(Debug)]
pub struct FoldOutcome {
    /// Fold index
    pub fold: usize,

    /// The last stage reached
    pub stage: FoldStage,

    /// Summaries of the splits written, in formatting order
    pub summaries: Vec<FormatSummary>,

    /// Why the fold stopped short of `Ready`
    pub error: Option<FormattingError>,
}

impl FoldOutcome {
    /// Whether every split was written
    pub fn is_ready(&self) -> bool {
        self.stage == FoldStage::Ready
    }
}

impl Display for FoldOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            None => write!(f, "{}: {:?}", Fold::name_for(self.fold), self.stage),
            Some(e) => write!(
                f,
                "{}: failed after {:?}: {}",
                Fold::name_for(self.fold),
                self.stage,
                e
            ),
        }
    }
}

/// A fold's formatted splits
#[derive(Clone, Debug, PartialEq)]
pub struct FoldData {
    /// The fold descriptor
    pub fold: Fold,

    /// Training split
    pub train: FormattedDataset,

    /// Development split
    pub dev: FormattedDataset,

    /// Test split
    pub test: FormattedDataset,
}

/// A persisted set of folds over one corpus
#[derive(Clone, Debug, PartialEq)]
pub struct CrossValidation {
    /// Root folder holding `cv.json` and one folder per fold
    pub folder: PathBuf,

    /// Options the folds were created with
    pub config: CrossValidationConfig,

    /// Corpus document IDs, in the position order fold indices refer to
    pub ids: Vec<String>,

    /// Fold descriptors in index order
    pub folds: Vec<Fold>,
}

impl CrossValidation {
    /// Partition `texts` and persist every descriptor. Nothing is formatted yet, and nothing is
    /// written when the configuration is invalid.
    pub fn create<P: AsRef<Path>>(
        folder: P,
        texts: &LabeledTexts,
        config: CrossValidationConfig,
    ) -> Result<Self, CrossValidationError> {
        let folder = folder.as_ref().to_path_buf();

        let group_keys = config.stratify.then(|| stratification_keys(texts));
        let folds = partition(texts.len(), &config.partition, group_keys.as_deref())?;

        log::info!(
            "Creating {} folds over {} documents in {}",
            folds.len(),
            texts.len(),
            folder.display()
        );

        fs::create_dir_all(&folder).map_err(|source| CrossValidationError::Io {
            path: folder.clone(),
            source,
        })?;

        let descriptor = Descriptor {
            config: config.clone(),
            ids: texts.ids.clone(),
            num_folds: folds.len(),
        };
        write_json(&folder.join(CV_FILE), &descriptor)?;

        for fold in &folds {
            fold.save(&folder)?;
        }

        Ok(Self {
            folder,
            config,
            ids: texts.ids.clone(),
            folds,
        })
    }

    /// Reopen a cross-validation folder
    pub fn load<P: AsRef<Path>>(folder: P) -> Result<Self, CrossValidationError> {
        let folder = folder.as_ref().to_path_buf();
        let path = folder.join(CV_FILE);

        let json = fs::read_to_string(&path).map_err(|source| CrossValidationError::Io {
            path: path.clone(),
            source,
        })?;
        let descriptor: Descriptor = serde_json::from_str(&json)
            .map_err(|source| CrossValidationError::Json { path, source })?;

        let folds = (0..descriptor.num_folds)
            .map(|k| Fold::load(&folder, k))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            folder,
            config: descriptor.config,
            ids: descriptor.ids,
            folds,
        })
    }

    /// Format every fold in index order. A fold that fails is reported and the rest continue.
    pub fn run(&self, texts: &LabeledTexts) -> Result<Vec<FoldOutcome>, CrossValidationError> {
        if texts.ids != self.ids {
            return Err(CrossValidationError::Mismatch {
                expected: self.ids.len(),
                found: texts.len(),
            });
        }

        let formatter = Formatter::new(self.config.formatter.clone());
        let outcomes: Vec<FoldOutcome> = self
            .folds
            .iter()
            .map(|fold| self.format_fold(&formatter, fold, texts))
            .collect();

        let ready = outcomes.iter().filter(|o| o.is_ready()).count();
        log::info!("--- {} of {} folds ready", ready, outcomes.len());

        Ok(outcomes)
    }

    fn format_fold(&self, formatter: &Formatter, fold: &Fold, texts: &LabeledTexts) -> FoldOutcome {
        let mut outcome = FoldOutcome {
            fold: fold.index,
            stage: FoldStage::Created,
            summaries: Vec::with_capacity(Split::ALL.len()),
            error: None,
        };

        let mut vocab = match self.config.formatter.unseen_labels {
            UnseenLabelPolicy::ReserveCorpus => VocabularyContext::with_labels(texts.label_codes()),
            UnseenLabelPolicy::Drop | UnseenLabelPolicy::Error => VocabularyContext::new(),
        };

        for split in Split::ALL {
            let result = texts
                .subset(fold.positions(split))
                .ok_or_else(|| FormattingError::Misaligned {
                    path: fold.folder(&self.folder).join(fold::FOLD_FILE),
                    expected: texts.len(),
                    found: fold.positions(split).iter().max().map_or(0, |m| m + 1),
                })
                .and_then(|subset| {
                    formatter.format(&subset, &mut vocab, &fold.split_paths(&self.folder, split))
                });

            match result {
                Ok(summary) => {
                    outcome.summaries.push(summary);
                    outcome.stage = FoldStage::after(split);
                }
                Err(e) => {
                    log::error!("{} {} split failed: {}", fold.name, split, e);
                    outcome.error = Some(e);

                    return outcome;
                }
            }
        }

        outcome.stage = FoldStage::Ready;
        outcome
    }

    /// Load the formatted splits of fold `index`
    pub fn load_fold<P: AsRef<Path>>(
        folder: P,
        index: usize,
    ) -> Result<FoldData, CrossValidationError> {
        let folder = folder.as_ref();
        let fold = Fold::load(folder, index)?;

        let load = |split| {
            FormattedDataset::load(&fold.split_paths(folder, split))
                .map_err(|source| CrossValidationError::Formatting { fold: index, source })
        };

        let train = load(Split::Train)?;
        let dev = load(Split::Dev)?;
        let test = load(Split::Test)?;

        log::info!(
            "Loaded {}: {} train, {} dev, {} test",
            fold.name,
            train.len(),
            dev.len(),
            test.len()
        );

        Ok(FoldData {
            fold,
            train,
            dev,
            test,
        })
    }
}

/// The first label of each document, or an empty key when it has none
fn stratification_keys(texts: &LabeledTexts) -> Vec<String> {
    texts
        .labels
        .iter()
        .map(|labels| labels.first().cloned().unwrap_or_default())
        .collect()
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), CrossValidationError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| CrossValidationError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    fs::write(path, json).map_err(|source| CrossValidationError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Cross Validation Error
#[derive(thiserror::Error, Debug)]
pub enum CrossValidationError {
    /// Invalid partitioning options
    #[error(transparent)]
    Partition(#[from] PartitionError),

    /// A descriptor could not be read or written
    #[error("unable to access {path}: {source}")]
    Io {
        /// The file or folder
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// A descriptor is not valid JSON
    #[error("invalid descriptor {path}: {source}")]
    Json {
        /// The descriptor file
        path: PathBuf,
        /// The JSON error
        source: serde_json::Error,
    },

    /// A fold's split could not be formatted or loaded
    #[error("fold {fold}: {source}")]
    Formatting {
        /// Fold index
        fold: usize,
        /// The formatting error
        source: FormattingError,
    },

    /// The texts are not the corpus the folds were created over
    #[error("folds were created over {expected} documents, found {found} different ones")]
    Mismatch {
        /// Documents in the descriptor
        expected: usize,
        /// Documents given
        found: usize,
    },
}
