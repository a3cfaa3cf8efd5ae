use std::fmt::Display;

use crate::evaluation::Classifier;

/// Seeded uniform-score baseline
pub mod random;

pub use random::RandomBaseline;

/// The unique string token for skipping training and evaluation
pub static NONE: &str = "none";

/// Available Models
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Model {
    /// Uniform random scores
    Random,

    /// Load the fold and do nothing else
    None,
}

impl Model {
    /// Build the classifier, if the model has one
    pub fn classifier(&self, seed: u64, threshold: Option<f64>) -> Option<Box<dyn Classifier>> {
        match self {
            Model::Random => {
                let baseline = RandomBaseline::new(seed);

                Some(Box::new(match threshold {
                    Some(threshold) => baseline.with_threshold(threshold),
                    None => baseline,
                }))
            }
            Model::None => None,
        }
    }
}

impl TryFrom<&str> for Model {
    type Error = ModelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            v if v == random::NAME => Ok(Model::Random),
            v if v == NONE => Ok(Model::None),
            _ => Err(ModelError::Unknown(value.to_string())),
        }
    }
}

impl Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Model::Random => random::NAME,
            Model::None => NONE,
        };

        write!(f, "{}", name)
    }
}

/// Model Error
#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    /// No model found for the given string
    #[error("no model found for {0}")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_names() {
        assert_eq!(Model::try_from("Random").unwrap(), Model::Random);
        assert_eq!(Model::None.to_string(), "none");
        assert!(Model::try_from("labeled-lda").is_err());
    }

    #[test]
    fn test_classifier() {
        assert!(Model::None.classifier(1, None).is_none());

        let random = Model::Random.classifier(1, Some(0.5)).unwrap();
        assert_eq!(random.name(), "random");
        assert!(random.describe().bipartition);
    }
}
