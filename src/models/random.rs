use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::evaluation::{Capabilities, Classifier, EvaluationError, Instance, Instances, Prediction};

/// The unique string token that identifies this model
pub static NAME: &str = "random";

/// Scores every label uniformly at random. Seeded, so two runs over the same instances agree.
#[derive(Clone, Debug)]
pub struct RandomBaseline {
    seed: u64,
    threshold: Option<f64>,
    rng: StdRng,
}

impl RandomBaseline {
    /// A baseline producing confidences and the ranking they imply
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            threshold: None,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Also decide labels scoring at least `threshold` as relevant
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }
}

impl Classifier for RandomBaseline {
    fn name(&self) -> &str {
        NAME
    }

    fn describe(&self) -> Capabilities {
        Capabilities::new(self.threshold.is_some(), true, true)
    }

    fn train(&mut self, instances: &Instances) -> Result<(), EvaluationError> {
        log::debug!(
            "Random baseline ignores {} training instances",
            instances.len()
        );

        self.rng = StdRng::seed_from_u64(self.seed);

        Ok(())
    }

    fn predict(&mut self, instance: &Instance) -> Prediction {
        let scores = (0..instance.labels.len()).map(|_| self.rng.gen::<f64>()).collect();
        let prediction = Prediction::from_confidences(scores);

        match self.threshold {
            Some(threshold) => prediction.with_threshold(threshold),
            None => prediction,
        }
    }
}
