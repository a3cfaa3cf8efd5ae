use std::fmt::Display;

/// The unique string token for each run mode
pub static PREPROCESS: &str = "preprocess";

/// Partition and format folds
pub static CREATE_CV: &str = "create-cv";

/// Train and evaluate on folds
pub static RUN: &str = "run";

/// Average results across folds
pub static SUMMARIZE: &str = "summarize";

/// Experiment Run Modes
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum RunMode {
    /// Format the whole corpus
    Preprocess,

    /// Create cross-validation folds
    CreateCv,

    /// Train and evaluate a model
    Run,

    /// Summarize fold results
    Summarize,
}

impl TryFrom<&str> for RunMode {
    type Error = RunModeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            v if v == PREPROCESS => Ok(RunMode::Preprocess),
            v if v == CREATE_CV => Ok(RunMode::CreateCv),
            v if v == RUN => Ok(RunMode::Run),
            v if v == SUMMARIZE => Ok(RunMode::Summarize),
            _ => Err(RunModeError::Unknown(value.to_string())),
        }
    }
}

impl Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunMode::Preprocess => PREPROCESS,
            RunMode::CreateCv => CREATE_CV,
            RunMode::Run => RUN,
            RunMode::Summarize => SUMMARIZE,
        };

        write!(f, "{}", name)
    }
}

/// Run Mode Error
#[derive(thiserror::Error, Debug)]
pub enum RunModeError {
    /// No run mode found for the given string
    #[error("no run mode found for {0}")]
    Unknown(String),
}
