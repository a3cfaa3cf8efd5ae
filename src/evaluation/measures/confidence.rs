use std::{cell::RefCell, cmp::Ordering, rc::Rc};

use super::{confidences, Measure, MetricComputationFailure, INTERPOLATION_STEPS};
use crate::evaluation::Prediction;

/// Measures over the scores each label received across all instances
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConfidenceKind {
    /// Arithmetic mean of per-label average precision
    MeanAveragePrecision,

    /// Geometric mean of per-label average precision
    GeometricMeanAveragePrecision,

    /// Arithmetic mean of per-label interpolated average precision
    MeanAverageInterpolatedPrecision,

    /// Geometric mean of per-label interpolated average precision
    GeometricMeanAverageInterpolatedPrecision,

    /// Area under the ROC curve of every label's scores pooled
    MicroAuc,

    /// Mean area under the ROC curve per label
    MacroAuc,
}

impl ConfidenceKind {
    /// Every kind in report order
    pub const ALL: [ConfidenceKind; 6] = [
        ConfidenceKind::MeanAveragePrecision,
        ConfidenceKind::GeometricMeanAveragePrecision,
        ConfidenceKind::MeanAverageInterpolatedPrecision,
        ConfidenceKind::GeometricMeanAverageInterpolatedPrecision,
        ConfidenceKind::MicroAuc,
        ConfidenceKind::MacroAuc,
    ];

    fn name(&self) -> &'static str {
        match self {
            ConfidenceKind::MeanAveragePrecision => "Mean Average Precision",
            ConfidenceKind::GeometricMeanAveragePrecision => "Geometric Mean Average Precision",
            ConfidenceKind::MeanAverageInterpolatedPrecision => {
                "Mean Average Interpolated Precision"
            }
            ConfidenceKind::GeometricMeanAverageInterpolatedPrecision => {
                "Geometric Mean Average Interpolated Precision"
            }
            ConfidenceKind::MicroAuc => "Micro-averaged AUC",
            ConfidenceKind::MacroAuc => "Macro-averaged AUC",
        }
    }
}

/// Every `(score, relevant)` pair per label, appended once per instance no matter how many
/// confidence measures read it
#[derive(Clone, Debug, Default)]
pub struct ScoreTable {
    labels: Vec<Vec<(f64, bool)>>,
    rows: usize,
}

/// A score table shared by the confidence measures of one evaluation
pub type SharedScores = Rc<RefCell<ScoreTable>>;

impl ScoreTable {
    /// An empty table over `num_labels` labels, ready to share
    pub fn shared(num_labels: usize) -> SharedScores {
        Rc::new(RefCell::new(Self {
            labels: vec![Vec::new(); num_labels],
            rows: 0,
        }))
    }
}

/// A confidence-based measure. Reads the first `rows` instances of its score table, so a
/// measure that stops accumulating keeps the instances it had.
#[derive(Clone, Debug)]
pub struct ConfidenceMeasure {
    kind: ConfidenceKind,
    table: SharedScores,
    rows: usize,
}

impl ConfidenceMeasure {
    /// A fresh measure over `num_labels` labels with a table of its own
    pub fn new(kind: ConfidenceKind, num_labels: usize) -> Self {
        Self::with_table(kind, ScoreTable::shared(num_labels))
    }

    /// A fresh measure reading a shared table
    pub fn with_table(kind: ConfidenceKind, table: SharedScores) -> Self {
        Self {
            kind,
            table,
            rows: 0,
        }
    }

    fn per_label(&self, f: fn(&[(f64, bool)]) -> Option<f64>) -> Vec<f64> {
        self.table
            .borrow()
            .labels
            .iter()
            .filter_map(|pairs| f(&pairs[..self.rows]))
            .collect()
    }

    fn pooled(&self) -> Vec<(f64, bool)> {
        self.table
            .borrow()
            .labels
            .iter()
            .flat_map(|pairs| pairs[..self.rows].iter().copied())
            .collect()
    }
}

impl Measure for ConfidenceMeasure {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn reset(&mut self) {
        let mut table = self.table.borrow_mut();
        table.labels.iter_mut().for_each(Vec::clear);
        table.rows = 0;

        self.rows = 0;
    }

    fn update(
        &mut self,
        prediction: &Prediction,
        truth: &[bool],
    ) -> Result<(), MetricComputationFailure> {
        let scores = confidences(self.name(), prediction, truth)?;

        let mut table = self.table.borrow_mut();
        if truth.len() != table.labels.len() {
            return Err(MetricComputationFailure::new(
                self.kind.name(),
                format!("instance has {} labels, expected {}", truth.len(), table.labels.len()),
            ));
        }

        // the first measure to reach an instance records it for the others
        if self.rows == table.rows {
            for ((pairs, &score), &relevant) in table.labels.iter_mut().zip(scores).zip(truth) {
                pairs.push((score, relevant));
            }
            table.rows += 1;
        }

        self.rows += 1;

        Ok(())
    }

    fn value(&self) -> f64 {
        match self.kind {
            ConfidenceKind::MeanAveragePrecision => {
                arithmetic_mean(&self.per_label(average_precision))
            }
            ConfidenceKind::GeometricMeanAveragePrecision => {
                geometric_mean(&self.per_label(average_precision))
            }
            ConfidenceKind::MeanAverageInterpolatedPrecision => {
                arithmetic_mean(&self.per_label(interpolated_precision))
            }
            ConfidenceKind::GeometricMeanAverageInterpolatedPrecision => {
                geometric_mean(&self.per_label(interpolated_precision))
            }
            ConfidenceKind::MicroAuc => auc(&self.pooled()).unwrap_or(f64::NAN),
            ConfidenceKind::MacroAuc => arithmetic_mean(&self.per_label(auc)),
        }
    }
}

/// Pairs by descending score. Ties keep instance order.
fn by_score(pairs: &[(f64, bool)]) -> Vec<(f64, bool)> {
    let mut sorted = pairs.to_vec();
    sorted.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    sorted
}

/// `(recall, precision)` after each position of the descending ranking
fn precision_recall(pairs: &[(f64, bool)]) -> Option<Vec<(f64, f64)>> {
    let positives = pairs.iter().filter(|(_, relevant)| *relevant).count();
    if positives == 0 {
        return None;
    }

    let mut hits = 0;
    let points = by_score(pairs)
        .iter()
        .enumerate()
        .map(|(position, &(_, relevant))| {
            if relevant {
                hits += 1;
            }

            (hits as f64 / positives as f64, hits as f64 / (position + 1) as f64)
        })
        .collect();

    Some(points)
}

fn average_precision(pairs: &[(f64, bool)]) -> Option<f64> {
    let positives = pairs.iter().filter(|(_, relevant)| *relevant).count();
    let points = precision_recall(pairs)?;

    let sum: f64 = by_score(pairs)
        .iter()
        .zip(&points)
        .filter(|((_, relevant), _)| *relevant)
        .map(|(_, &(_, precision))| precision)
        .sum();

    Some(sum / positives as f64)
}

/// Mean of the best precision at or beyond each of the evenly spaced recall levels 0, 0.1, ..., 1
fn interpolated_precision(pairs: &[(f64, bool)]) -> Option<f64> {
    let points = precision_recall(pairs)?;

    let sum: f64 = (0..=INTERPOLATION_STEPS)
        .map(|step| {
            let level = step as f64 / INTERPOLATION_STEPS as f64;
            points
                .iter()
                .filter(|(recall, _)| *recall + 1e-12 >= level)
                .map(|&(_, precision)| precision)
                .fold(0.0, f64::max)
        })
        .sum();

    Some(sum / (INTERPOLATION_STEPS + 1) as f64)
}

/// Mann-Whitney area under the ROC curve, with tied scores sharing their mean rank
fn auc(pairs: &[(f64, bool)]) -> Option<f64> {
    let positives = pairs.iter().filter(|(_, relevant)| *relevant).count();
    let negatives = pairs.len() - positives;
    if positives == 0 || negatives == 0 {
        return None;
    }

    let mut sorted = pairs.to_vec();
    sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < sorted.len() {
        let mut end = start;
        while end + 1 < sorted.len() && sorted[end + 1].0 == sorted[start].0 {
            end += 1;
        }

        // 1-based ranks start + 1 ..= end + 1
        let mean_rank = (start + end) as f64 / 2.0 + 1.0;
        let tied_positives = sorted[start..=end].iter().filter(|(_, r)| *r).count();
        positive_rank_sum += mean_rank * tied_positives as f64;

        start = end + 1;
    }

    let p = positives as f64;
    Some((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * negatives as f64))
}

fn arithmetic_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }

    values.iter().sum::<f64>() / values.len() as f64
}

fn geometric_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    if values.iter().any(|&v| v == 0.0) {
        return 0.0;
    }

    (values.iter().map(|v| v.ln()).sum::<f64>() / values.len() as f64).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_average_precision() {
        // descending: +, -, +  → (1 + 2/3) / 2
        let pairs = [(0.9, true), (0.5, true), (0.7, false)];

        assert!(close(average_precision(&pairs).unwrap(), (1.0 + 2.0 / 3.0) / 2.0));
        assert_eq!(average_precision(&[(0.3, false)]), None);
    }

    #[test]
    fn test_interpolated_precision() {
        let pairs = [(0.9, true), (0.5, true), (0.7, false)];

        // recall 0.5 reached at precision 1, recall 1 at precision 2/3
        let expected = (6.0 * 1.0 + 5.0 * (2.0 / 3.0)) / 11.0;
        assert!(close(interpolated_precision(&pairs).unwrap(), expected));
    }

    #[test]
    fn test_auc() {
        assert!(close(auc(&[(0.9, true), (0.1, false)]).unwrap(), 1.0));
        assert!(close(auc(&[(0.1, true), (0.9, false)]).unwrap(), 0.0));
        assert!(close(auc(&[(0.5, true), (0.5, false)]).unwrap(), 0.5));
        assert!(close(
            auc(&[(0.8, true), (0.4, true), (0.6, false), (0.2, false)]).unwrap(),
            0.75
        ));
        assert_eq!(auc(&[(0.5, true)]), None);
    }

    #[test]
    fn test_means() {
        assert!(close(geometric_mean(&[0.25, 1.0]), 0.5));
        assert_eq!(geometric_mean(&[0.0, 1.0]), 0.0);
        assert!(arithmetic_mean(&[]).is_nan());
    }

    #[test]
    fn test_macro_auc_skips_undefined_labels() {
        let mut measure = ConfidenceMeasure::new(ConfidenceKind::MacroAuc, 2);
        measure
            .update(&Prediction::from_confidences(vec![0.9, 0.3]), &[true, false])
            .unwrap();
        measure
            .update(&Prediction::from_confidences(vec![0.2, 0.4]), &[false, false])
            .unwrap();

        // label 1 never relevant
        assert!(close(measure.value(), 1.0));

        measure.reset();
        assert!(measure.value().is_nan());
    }

    #[test]
    fn test_measures_share_one_table() {
        let table = ScoreTable::shared(2);
        let mut map =
            ConfidenceMeasure::with_table(ConfidenceKind::MeanAveragePrecision, table.clone());
        let mut macro_auc = ConfidenceMeasure::with_table(ConfidenceKind::MacroAuc, table.clone());

        let first = Prediction::from_confidences(vec![0.9, 0.3]);
        map.update(&first, &[true, false]).unwrap();
        macro_auc.update(&first, &[true, false]).unwrap();

        // only one measure still accumulating
        macro_auc
            .update(&Prediction::from_confidences(vec![0.2, 0.4]), &[false, true])
            .unwrap();

        assert_eq!(table.borrow().rows, 2);
        assert_eq!(table.borrow().labels[0].len(), 2);
        assert!(close(map.value(), 1.0));
        assert!(close(macro_auc.value(), 1.0));
        assert_eq!(map.rows, 1);
    }
}
