use super::{bipartition, mean, Measure, MetricComputationFailure};
use crate::evaluation::{LabelHierarchy, Prediction};

/// Counts a mistake at a label only when its parent was decided correctly, so an error high in
/// the hierarchy is not charged again for every descendant
#[derive(Clone, Debug)]
pub struct HierarchicalLoss {
    hierarchy: LabelHierarchy,
    sum: f64,
    count: usize,
}

impl HierarchicalLoss {
    /// A fresh measure over `hierarchy`
    pub fn new(hierarchy: LabelHierarchy) -> Self {
        Self {
            hierarchy,
            sum: 0.0,
            count: 0,
        }
    }

    fn loss(&self, predicted: &[bool], truth: &[bool]) -> usize {
        let mut loss = 0;
        let mut pending = self.hierarchy.roots();

        while let Some(label) = pending.pop() {
            if predicted[label] != truth[label] {
                loss += 1;
            } else {
                pending.extend(self.hierarchy.children(label));
            }
        }

        loss
    }
}

impl Measure for HierarchicalLoss {
    fn name(&self) -> &str {
        "Hierarchical Loss"
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
        if truth.len() != self.hierarchy.len() {
            return Err(MetricComputationFailure::new(
                self.name(),
                format!(
                    "instance has {} labels, hierarchy has {}",
                    truth.len(),
                    self.hierarchy.len()
                ),
            ));
        }

        self.sum += self.loss(predicted, truth) as f64;
        self.count += 1;

        Ok(())
    }

    fn value(&self) -> f64 {
        mean(self.sum, self.count)
    }
}
