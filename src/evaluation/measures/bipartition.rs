use super::{
    bipartition,
    ir::{self, Counts},
    mean, Measure, MetricComputationFailure,
};
use crate::evaluation::Prediction;

/// Per-instance measures, averaged over instances
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExampleKind {
    /// Share of labels decided wrongly
    HammingLoss,

    /// Whether every label was decided correctly
    SubsetAccuracy,

    /// Share of predicted labels that are relevant
    Precision,

    /// Share of relevant labels that were predicted
    Recall,

    /// Harmonic mean of precision and recall
    FMeasure,

    /// Jaccard index of predicted and relevant sets
    Accuracy,

    /// Share of irrelevant labels left out
    Specificity,
}

impl ExampleKind {
    /// Every kind in report order
    pub const ALL: [ExampleKind; 7] = [
        ExampleKind::HammingLoss,
        ExampleKind::SubsetAccuracy,
        ExampleKind::Precision,
        ExampleKind::Recall,
        ExampleKind::FMeasure,
        ExampleKind::Accuracy,
        ExampleKind::Specificity,
    ];

    fn name(&self) -> &'static str {
        match self {
            ExampleKind::HammingLoss => "Hamming Loss",
            ExampleKind::SubsetAccuracy => "Subset Accuracy",
            ExampleKind::Precision => "Example-Based Precision",
            ExampleKind::Recall => "Example-Based Recall",
            ExampleKind::FMeasure => "Example-Based F-Measure",
            ExampleKind::Accuracy => "Example-Based Accuracy",
            ExampleKind::Specificity => "Example-Based Specificity",
        }
    }

    fn score(&self, predicted: &[bool], truth: &[bool]) -> f64 {
        let counts = Counts::from_pairs(predicted, truth);

        match self {
            ExampleKind::HammingLoss => {
                if truth.is_empty() {
                    0.0
                } else {
                    (counts.fp + counts.fn_) as f64 / truth.len() as f64
                }
            }
            ExampleKind::SubsetAccuracy => (predicted == truth) as u8 as f64,
            ExampleKind::Precision => ir::precision(counts),
            ExampleKind::Recall => ir::recall(counts),
            ExampleKind::FMeasure => ir::f_measure(counts),
            ExampleKind::Accuracy => ir::accuracy(counts),
            ExampleKind::Specificity => ir::specificity(counts),
        }
    }
}

/// An example-based bipartition measure
#[derive(Clone, Debug)]
pub struct ExampleMeasure {
    kind: ExampleKind,
    sum: f64,
    count: usize,
}

impl ExampleMeasure {
    /// A fresh measure
    pub fn new(kind: ExampleKind) -> Self {
        Self {
            kind,
            sum: 0.0,
            count: 0,
        }
    }
}

impl Measure for ExampleMeasure {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn reset(&mut self) {
        self.sum = 0.0;
        self.count = 0;
    }

    fn update(
        &mut self,
        prediction: &Prediction,
        truth: &[bool],
    ) -> Result<(), MetricComputationFailure> {
        let predicted = bipartition(self.name(), prediction, truth)?;

        self.sum += self.kind.score(predicted, truth);
        self.count += 1;

        Ok(())
    }

    fn value(&self) -> f64 {
        mean(self.sum, self.count)
    }
}

/// Label-based ratios
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LabelKind {
    /// True positives over predicted positives
    Precision,

    /// True positives over relevant labels
    Recall,

    /// Harmonic mean of precision and recall
    FMeasure,

    /// True negatives over irrelevant labels
    Specificity,
}

impl LabelKind {
    /// Every kind in report order
    pub const ALL: [LabelKind; 4] = [
        LabelKind::Precision,
        LabelKind::Recall,
        LabelKind::FMeasure,
        LabelKind::Specificity,
    ];

    fn ratio(&self, counts: Counts) -> f64 {
        match self {
            LabelKind::Precision => ir::precision(counts),
            LabelKind::Recall => ir::recall(counts),
            LabelKind::FMeasure => ir::f_measure(counts),
            LabelKind::Specificity => ir::specificity(counts),
        }
    }
}

/// How per-label counts become one value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Averaging {
    /// Pool the counts of every label, then take the ratio
    Micro,
    /// Take the ratio per label, then the mean
    Macro,
}

/// A label-based bipartition measure
#[derive(Clone, Debug)]
pub struct LabelMeasure {
    name: &'static str,
    kind: LabelKind,
    averaging: Averaging,
    counts: Vec<Counts>,
}

impl LabelMeasure {
    /// A fresh measure over `num_labels` labels
    pub fn new(kind: LabelKind, averaging: Averaging, num_labels: usize) -> Self {
        let name = match (averaging, kind) {
            (Averaging::Micro, LabelKind::Precision) => "Micro-averaged Precision",
            (Averaging::Micro, LabelKind::Recall) => "Micro-averaged Recall",
            (Averaging::Micro, LabelKind::FMeasure) => "Micro-averaged F-Measure",
            (Averaging::Micro, LabelKind::Specificity) => "Micro-averaged Specificity",
            (Averaging::Macro, LabelKind::Precision) => "Macro-averaged Precision",
            (Averaging::Macro, LabelKind::Recall) => "Macro-averaged Recall",
            (Averaging::Macro, LabelKind::FMeasure) => "Macro-averaged F-Measure",
            (Averaging::Macro, LabelKind::Specificity) => "Macro-averaged Specificity",
        };

        Self {
            name,
            kind,
            averaging,
            counts: vec![Counts::default(); num_labels],
        }
    }
}

impl Measure for LabelMeasure {
    fn name(&self) -> &str {
        self.name
    }

    fn reset(&mut self) {
        self.counts.iter_mut().for_each(|c| *c = Counts::default());
    }

    fn update(
        &mut self,
        prediction: &Prediction,
        truth: &[bool],
    ) -> Result<(), MetricComputationFailure> {
        let predicted = bipartition(self.name, prediction, truth)?;
        if truth.len() != self.counts.len() {
            return Err(MetricComputationFailure::new(
                self.name,
                format!("instance has {} labels, expected {}", truth.len(), self.counts.len()),
            ));
        }

        for ((counts, &p), &r) in self.counts.iter_mut().zip(predicted).zip(truth) {
            counts.add(p, r);
        }

        Ok(())
    }

    fn value(&self) -> f64 {
        match self.averaging {
            Averaging::Micro => self
                .kind
                .ratio(self.counts.iter().fold(Counts::default(), |a, &b| a.merge(b))),
            Averaging::Macro => mean(
                self.counts.iter().map(|&c| self.kind.ratio(c)).sum(),
                self.counts.len(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accumulate(measure: &mut dyn Measure, rows: &[(&[bool], &[bool])]) -> f64 {
        for (predicted, truth) in rows {
            measure
                .update(&Prediction::from_bipartition(predicted.to_vec()), truth)
                .unwrap();
        }

        measure.value()
    }

    const ROWS: [(&[bool], &[bool]); 2] = [
        (&[true, false, true], &[true, false, false]),
        (&[false, false, false], &[false, true, false]),
    ];

    #[test]
    fn test_example_based() {
        let value = |kind| accumulate(&mut ExampleMeasure::new(kind), &ROWS);

        assert!((value(ExampleKind::HammingLoss) - 2.0 / 6.0).abs() < 1e-12);
        assert_eq!(value(ExampleKind::SubsetAccuracy), 0.0);
        // (1/2 + 0) / 2
        assert!((value(ExampleKind::Precision) - 0.25).abs() < 1e-12);
        // (1 + 0) / 2
        assert!((value(ExampleKind::Recall) - 0.5).abs() < 1e-12);
        assert!((value(ExampleKind::Accuracy) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_perfect_prediction() {
        let rows: [(&[bool], &[bool]); 1] = [(&[true, false, true], &[true, false, true])];

        assert_eq!(accumulate(&mut ExampleMeasure::new(ExampleKind::HammingLoss), &rows), 0.0);
        assert_eq!(accumulate(&mut ExampleMeasure::new(ExampleKind::SubsetAccuracy), &rows), 1.0);
    }

    #[test]
    fn test_micro_and_macro() {
        let micro = accumulate(
            &mut LabelMeasure::new(LabelKind::Precision, Averaging::Micro, 3),
            &ROWS,
        );
        let macro_ = accumulate(
            &mut LabelMeasure::new(LabelKind::Recall, Averaging::Macro, 3),
            &ROWS,
        );

        // tp 1, fp 1
        assert!((micro - 0.5).abs() < 1e-12);
        // label recalls 1, 0, and 0 (label 2 has a false positive, nothing relevant)
        assert!((macro_ - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_reset_and_empty() {
        let mut measure = ExampleMeasure::new(ExampleKind::Recall);
        assert!(measure.value().is_nan());

        accumulate(&mut measure, &ROWS);
        measure.reset();
        assert!(measure.value().is_nan());
    }
}
