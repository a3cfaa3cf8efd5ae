use std::cmp::Ordering;

use derive_new::new;

use super::{EvaluationError, Instance, Instances};

/// The kinds of output a classifier produces
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, new)]
pub struct Capabilities {
    /// A hard relevant/irrelevant decision per label
    pub bipartition: bool,

    /// A 1-based rank per label
    pub ranking: bool,

    /// A real-valued score per label
    pub confidences: bool,
}

impl Capabilities {
    /// Whether the classifier produces anything at all
    pub fn is_empty(&self) -> bool {
        !(self.bipartition || self.ranking || self.confidences)
    }
}

/// A classifier's output for one instance. Every present vector has one entry per label.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Prediction {
    /// Hard decisions
    pub bipartition: Option<Vec<bool>>,

    /// 1-based ranks, 1 being the most relevant label
    pub ranking: Option<Vec<usize>>,

    /// Scores, higher meaning more relevant
    pub confidences: Option<Vec<f64>>,
}

impl Prediction {
    /// A prediction with confidences and the ranking they imply
    pub fn from_confidences(confidences: Vec<f64>) -> Self {
        Self {
            bipartition: None,
            ranking: Some(rank(&confidences)),
            confidences: Some(confidences),
        }
    }

    /// A prediction with hard decisions only
    pub fn from_bipartition(bipartition: Vec<bool>) -> Self {
        Self {
            bipartition: Some(bipartition),
            ..Default::default()
        }
    }

    /// Add hard decisions: labels scoring at least `threshold` are relevant
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.bipartition = self
            .confidences
            .as_ref()
            .map(|scores| scores.iter().map(|&score| score >= threshold).collect());

        self
    }

    /// The per-label values written to the predictions file: confidences when present, the
    /// bipartition as 0/1 otherwise, then the ranking
    pub fn output_values(&self) -> Vec<String> {
        if let Some(confidences) = &self.confidences {
            return confidences.iter().map(|c| c.to_string()).collect();
        }

        if let Some(bipartition) = &self.bipartition {
            return bipartition
                .iter()
                .map(|&relevant| if relevant { "1" } else { "0" }.to_string())
                .collect();
        }

        self.ranking
            .iter()
            .flatten()
            .map(|rank| rank.to_string())
            .collect()
    }
}

/// 1-based ranks by descending score. Ties keep label order and NaN scores rank last.
pub fn rank(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| match (scores[a].is_nan(), scores[b].is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => scores[b].partial_cmp(&scores[a]).unwrap_or(Ordering::Equal),
    });

    let mut ranks = vec![0; scores.len()];
    for (position, &label) in order.iter().enumerate() {
        ranks[label] = position + 1;
    }

    ranks
}

/// A multi-label classifier that can be trained and evaluated
pub trait Classifier {
    /// A short name for logs and result folders
    fn name(&self) -> &str;

    /// The outputs every prediction carries
    fn describe(&self) -> Capabilities;

    /// Fit the classifier to labeled instances
    fn train(&mut self, instances: &Instances) -> Result<(), EvaluationError>;

    /// Predict an instance whose label columns are blank
    fn predict(&mut self, instance: &Instance) -> Prediction;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank() {
        assert_eq!(rank(&[0.2, 0.9, 0.5]), vec![3, 1, 2]);
        assert_eq!(rank(&[0.5, 0.5, 1.0]), vec![2, 3, 1]);
        assert!(rank(&[]).is_empty());
    }

    #[test]
    fn test_rank_puts_nan_scores_last() {
        assert_eq!(rank(&[f64::NAN, 0.1, 0.9, f64::NAN]), vec![3, 2, 1, 4]);

        let scores: Vec<f64> = (0..40)
            .map(|i| if i % 3 == 0 { f64::NAN } else { i as f64 / 40.0 })
            .collect();
        let mut ranks = rank(&scores);

        for (label, &r) in ranks.iter().enumerate() {
            assert_eq!(scores[label].is_nan(), r > 26);
        }

        ranks.sort_unstable();
        assert_eq!(ranks, (1..=40).collect::<Vec<_>>());
    }

    #[test]
    fn test_prediction_outputs() {
        let prediction = Prediction::from_confidences(vec![0.25, 0.75]).with_threshold(0.5);

        assert_eq!(prediction.bipartition, Some(vec![false, true]));
        assert_eq!(prediction.ranking, Some(vec![2, 1]));
        assert_eq!(prediction.output_values(), vec!["0.25", "0.75"]);

        let hard = Prediction::from_bipartition(vec![true, false, true]);
        assert_eq!(hard.output_values(), vec!["1", "0", "1"]);
    }

    #[test]
    fn test_empty_capabilities() {
        assert!(Capabilities::default().is_empty());
        assert!(!Capabilities::new(false, true, false).is_empty());
    }
}
