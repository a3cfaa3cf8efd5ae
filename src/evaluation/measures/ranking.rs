use super::{mean, ranking, Measure, MetricComputationFailure};
use crate::evaluation::Prediction;

/// Ranking measures, averaged over the instances they are defined for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RankingKind {
    /// Mean precision at the rank of each relevant label
    AveragePrecision,

    /// Steps down the ranking needed to reach every relevant label
    Coverage,

    /// Whether the top-ranked label is irrelevant
    OneError,

    /// Whether any irrelevant label outranks a relevant one
    IsError,

    /// Relevant/irrelevant label pairs in the wrong order
    ErrorSetSize,

    /// Share of relevant/irrelevant label pairs in the wrong order
    RankingLoss,
}

impl RankingKind {
    /// Every kind in report order
    pub const ALL: [RankingKind; 6] = [
        RankingKind::AveragePrecision,
        RankingKind::Coverage,
        RankingKind::OneError,
        RankingKind::IsError,
        RankingKind::ErrorSetSize,
        RankingKind::RankingLoss,
    ];

    fn name(&self) -> &'static str {
        match self {
            RankingKind::AveragePrecision => "Average Precision",
            RankingKind::Coverage => "Coverage",
            RankingKind::OneError => "OneError",
            RankingKind::IsError => "IsError",
            RankingKind::ErrorSetSize => "ErrorSetSize",
            RankingKind::RankingLoss => "Ranking Loss",
        }
    }

    /// The instance's score, or `None` when the measure is undefined for it
    fn score(&self, ranks: &[usize], truth: &[bool]) -> Option<f64> {
        let relevant: Vec<usize> = (0..truth.len()).filter(|&l| truth[l]).collect();
        let irrelevant: Vec<usize> = (0..truth.len()).filter(|&l| !truth[l]).collect();

        let misordered = || {
            relevant
                .iter()
                .flat_map(|&r| irrelevant.iter().map(move |&i| (r, i)))
                .filter(|&(r, i)| ranks[i] < ranks[r])
                .count()
        };

        match self {
            RankingKind::AveragePrecision => {
                if relevant.is_empty() {
                    return None;
                }

                let sum: f64 = relevant
                    .iter()
                    .map(|&r| {
                        let above = relevant.iter().filter(|&&o| ranks[o] <= ranks[r]).count();
                        above as f64 / ranks[r] as f64
                    })
                    .sum();

                Some(sum / relevant.len() as f64)
            }
            RankingKind::Coverage => relevant
                .iter()
                .map(|&r| ranks[r])
                .max()
                .map(|worst| (worst - 1) as f64),
            RankingKind::OneError => {
                let top = ranks.iter().position(|&rank| rank == 1)?;
                Some((!truth[top]) as u8 as f64)
            }
            RankingKind::IsError => Some((misordered() > 0) as u8 as f64),
            RankingKind::ErrorSetSize => Some(misordered() as f64),
            RankingKind::RankingLoss => {
                if relevant.is_empty() || irrelevant.is_empty() {
                    return None;
                }

                Some(misordered() as f64 / (relevant.len() * irrelevant.len()) as f64)
            }
        }
    }
}

/// A ranking-based measure
#[derive(Clone, Debug)]
pub struct RankingMeasure {
    kind: RankingKind,
    sum: f64,
    count: usize,
}

impl RankingMeasure {
    /// A fresh measure
    pub fn new(kind: RankingKind) -> Self {
        Self {
            kind,
            sum: 0.0,
            count: 0,
        }
    }
}

impl Measure for RankingMeasure {
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
        let ranks = ranking(self.name(), prediction, truth)?;

        if let Some(score) = self.kind.score(ranks, truth) {
            self.sum += score;
            self.count += 1;
        }

        Ok(())
    }

    fn value(&self) -> f64 {
        mean(self.sum, self.count)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn value(kind: RankingKind, rows: &[(Vec<f64>, Vec<bool>)]) -> f64 {
        let mut measure = RankingMeasure::new(kind);
        for (scores, truth) in rows {
            measure
                .update(&Prediction::from_confidences(scores.clone()), truth)
                .unwrap();
        }

        measure.value()
    }

    fn rows() -> Vec<(Vec<f64>, Vec<bool>)> {
        vec![
            // ranks 1, 3, 2, 4
            (vec![0.9, 0.2, 0.6, 0.1], vec![true, false, false, true]),
            // ranks 2, 1, 3, 4
            (vec![0.5, 0.8, 0.3, 0.0], vec![false, true, false, false]),
        ]
    }

    #[rstest]
    // (1/1 + 2/4) / 2 = 0.75, then 1/1
    #[case(RankingKind::AveragePrecision, (0.75 + 1.0) / 2.0)]
    #[case(RankingKind::Coverage, (3.0 + 0.0) / 2.0)]
    #[case(RankingKind::OneError, 0.0)]
    #[case(RankingKind::IsError, 0.5)]
    // label 3 is outranked by labels 1 and 2
    #[case(RankingKind::ErrorSetSize, 1.0)]
    #[case(RankingKind::RankingLoss, (2.0 / 4.0 + 0.0) / 2.0)]
    fn test_ranking_measures(#[case] kind: RankingKind, #[case] expected: f64) {
        assert!((value(kind, &rows()) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_instances_without_relevant_labels_are_skipped() {
        let rows = vec![
            (vec![0.9, 0.1], vec![false, false]),
            (vec![0.9, 0.1], vec![true, false]),
        ];

        assert_eq!(value(RankingKind::AveragePrecision, &rows), 1.0);
        assert_eq!(value(RankingKind::Coverage, &rows), 0.0);
        assert_eq!(value(RankingKind::RankingLoss, &rows), 0.0);
        assert_eq!(value(RankingKind::OneError, &rows), 0.5);
    }

    #[test]
    fn test_out_of_range_rank_fails() {
        let prediction = Prediction {
            ranking: Some(vec![1, 5]),
            ..Default::default()
        };

        assert!(RankingMeasure::new(RankingKind::Coverage)
            .update(&prediction, &[true, false])
            .is_err());
    }
}
