use super::{Capabilities, LabelHierarchy, Prediction};

/// Precision, recall, and related ratios over confusion counts
pub mod ir;

/// Measures over hard decisions
pub mod bipartition;

/// Measures over label rankings
pub mod ranking;

/// Measures over per-label scores
pub mod confidence;

/// Measures over a label hierarchy
pub mod hierarchical;

pub use bipartition::{Averaging, ExampleKind, ExampleMeasure, LabelKind, LabelMeasure};
pub use confidence::{ConfidenceKind, ConfidenceMeasure, ScoreTable, SharedScores};
pub use hierarchical::HierarchicalLoss;
pub use ranking::{RankingKind, RankingMeasure};

/// Recall levels between 0 and 1 for interpolated precision
pub const INTERPOLATION_STEPS: usize = 10;

/// A metric accumulated one instance at a time
pub trait Measure {
    /// The name shown in reports
    fn name(&self) -> &str;

    /// Forget everything accumulated
    fn reset(&mut self);

    /// Accumulate one instance
    fn update(
        &mut self,
        prediction: &Prediction,
        truth: &[bool],
    ) -> Result<(), MetricComputationFailure>;

    /// The value so far. NaN when nothing defined it.
    fn value(&self) -> f64;
}

/// The measures a classifier's outputs support, in report order
pub fn standard(
    capabilities: Capabilities,
    num_labels: usize,
    hierarchy: Option<&LabelHierarchy>,
) -> Vec<Box<dyn Measure>> {
    let mut measures: Vec<Box<dyn Measure>> = Vec::new();

    if capabilities.bipartition {
        for kind in ExampleKind::ALL {
            measures.push(Box::new(ExampleMeasure::new(kind)));
        }

        for averaging in [Averaging::Micro, Averaging::Macro] {
            for kind in LabelKind::ALL {
                measures.push(Box::new(LabelMeasure::new(kind, averaging, num_labels)));
            }
        }
    }

    if capabilities.ranking {
        for kind in RankingKind::ALL {
            measures.push(Box::new(RankingMeasure::new(kind)));
        }
    }

    if capabilities.confidences {
        let table = ScoreTable::shared(num_labels);
        for kind in ConfidenceKind::ALL {
            measures.push(Box::new(ConfidenceMeasure::with_table(kind, table.clone())));
        }
    }

    if let Some(hierarchy) = hierarchy {
        measures.push(Box::new(HierarchicalLoss::new(hierarchy.clone())));
    }

    measures
}

/// A measure could not accumulate an instance
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{metric}: {reason}")]
pub struct MetricComputationFailure {
    /// The measure name
    pub metric: String,

    /// What was wrong
    pub reason: String,
}

impl MetricComputationFailure {
    pub(crate) fn new(metric: &str, reason: impl ToString) -> Self {
        Self {
            metric: metric.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub(crate) fn bipartition<'a>(
    metric: &str,
    prediction: &'a Prediction,
    truth: &[bool],
) -> Result<&'a [bool], MetricComputationFailure> {
    let bipartition = prediction
        .bipartition
        .as_deref()
        .ok_or_else(|| MetricComputationFailure::new(metric, "prediction has no bipartition"))?;

    check_len(metric, bipartition.len(), truth.len())?;

    Ok(bipartition)
}

pub(crate) fn ranking<'a>(
    metric: &str,
    prediction: &'a Prediction,
    truth: &[bool],
) -> Result<&'a [usize], MetricComputationFailure> {
    let ranking = prediction
        .ranking
        .as_deref()
        .ok_or_else(|| MetricComputationFailure::new(metric, "prediction has no ranking"))?;

    check_len(metric, ranking.len(), truth.len())?;

    if let Some(rank) = ranking.iter().find(|&&r| r == 0 || r > ranking.len()) {
        return Err(MetricComputationFailure::new(
            metric,
            format!("rank {} outside 1..={}", rank, ranking.len()),
        ));
    }

    Ok(ranking)
}

pub(crate) fn confidences<'a>(
    metric: &str,
    prediction: &'a Prediction,
    truth: &[bool],
) -> Result<&'a [f64], MetricComputationFailure> {
    let confidences = prediction
        .confidences
        .as_deref()
        .ok_or_else(|| MetricComputationFailure::new(metric, "prediction has no confidences"))?;

    check_len(metric, confidences.len(), truth.len())?;

    if let Some(score) = confidences.iter().find(|c| !c.is_finite()) {
        return Err(MetricComputationFailure::new(
            metric,
            format!("confidence {} is not finite", score),
        ));
    }

    Ok(confidences)
}

fn check_len(metric: &str, found: usize, expected: usize) -> Result<(), MetricComputationFailure> {
    if found != expected {
        return Err(MetricComputationFailure::new(
            metric,
            format!("prediction has {} labels, expected {}", found, expected),
        ));
    }

    Ok(())
}

/// The mean of accumulated per-instance values, NaN before any
pub(crate) fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(measures: &[Box<dyn Measure>]) -> Vec<&str> {
        measures.iter().map(|m| m.name()).collect()
    }

    #[test]
    fn test_standard_order() {
        let bipartition_only = standard(Capabilities::new(true, false, false), 3, None);
        assert_eq!(
            names(&bipartition_only),
            vec![
                "Hamming Loss",
                "Subset Accuracy",
                "Example-Based Precision",
                "Example-Based Recall",
                "Example-Based F-Measure",
                "Example-Based Accuracy",
                "Example-Based Specificity",
                "Micro-averaged Precision",
                "Micro-averaged Recall",
                "Micro-averaged F-Measure",
                "Micro-averaged Specificity",
                "Macro-averaged Precision",
                "Macro-averaged Recall",
                "Macro-averaged F-Measure",
                "Macro-averaged Specificity",
            ]
        );

        let hierarchy = LabelHierarchy::new(vec![None, Some(0)]).unwrap();
        let scores = standard(Capabilities::new(false, true, true), 2, Some(&hierarchy));
        assert_eq!(
            names(&scores),
            vec![
                "Average Precision",
                "Coverage",
                "OneError",
                "IsError",
                "ErrorSetSize",
                "Ranking Loss",
                "Mean Average Precision",
                "Geometric Mean Average Precision",
                "Mean Average Interpolated Precision",
                "Geometric Mean Average Interpolated Precision",
                "Micro-averaged AUC",
                "Macro-averaged AUC",
                "Hierarchical Loss",
            ]
        );
    }

    #[test]
    fn test_missing_output_fails() {
        let prediction = Prediction::from_bipartition(vec![true]);

        assert!(ranking("x", &prediction, &[true]).is_err());
        assert!(bipartition("x", &prediction, &[true, false]).is_err());
        assert!(bipartition("x", &prediction, &[false]).is_ok());
    }
}
