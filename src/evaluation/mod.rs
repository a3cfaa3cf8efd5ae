use std::{
    collections::HashSet,
    fmt::{self, Display},
    io::Write,
    path::{Path, PathBuf},
};

use derive_new::new;

/// The classifier contract
pub mod classifier;

/// Tabular instances with label columns
pub mod instances;

/// Streaming metrics
pub mod measures;

pub use classifier::{Capabilities, Classifier, Prediction};
pub use instances::{Instance, Instances, LabelHierarchy};
pub use measures::{Measure, MetricComputationFailure};

/// Metric values in the order the metrics were assembled
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EvaluationReport {
    /// `(name, value)` pairs
    pub metrics: Vec<(String, f64)>,

    /// Metrics that stopped accumulating, with the first failure of each
    pub failed: Vec<MetricComputationFailure>,

    /// Instances predicted and measured
    pub evaluated: usize,

    /// Instances skipped for missing labels
    pub skipped: usize,
}

impl EvaluationReport {
    /// The value of a metric, if it was computed
    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics
            .iter()
            .find(|(metric, _)| metric == name)
            .map(|&(_, value)| value)
    }

    /// Write `name<TAB>value` lines
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), EvaluationError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_path(path)?;

        for (name, value) in &self.metrics {
            writer.write_record([name.as_str(), value.to_string().as_str()])?;
        }

        writer.flush()?;

        Ok(())
    }

    /// Read metrics written by [`EvaluationReport::write`]
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, EvaluationError> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_path(path)?;

        let mut report = Self::default();
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let (name, value) = match (record.get(0), record.get(1), record.len()) {
                (Some(name), Some(value), 2) => (name, value),
                _ => {
                    return Err(EvaluationError::Results {
                        path: path.to_path_buf(),
                        line: line + 1,
                        reason: "expected a name and a value".to_string(),
                    })
                }
            };

            let value = value.parse().map_err(|e| EvaluationError::Results {
                path: path.to_path_buf(),
                line: line + 1,
                reason: format!("bad value {:?}: {}", value, e),
            })?;

            report.metrics.push((name.to_string(), value));
        }

        Ok(report)
    }
}

impl Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.metrics {
            writeln!(f, "{}\t{}", name, value)?;
        }

        Ok(())
    }
}

/// Runs a classifier over held-out instances and accumulates every applicable metric
#[derive(Clone, Copy, Debug, Default, new)]
pub struct Evaluator;

impl Evaluator {
    /// The metrics a classifier's outputs support on these instances, in report order
    pub fn measures(
        &self,
        capabilities: Capabilities,
        instances: &Instances,
    ) -> Vec<Box<dyn Measure>> {
        measures::standard(capabilities, instances.num_labels(), instances.hierarchy.as_ref())
    }

    /// Predict each fully labeled instance with its label columns blanked, write one
    /// predictions line per instance, and accumulate every metric. A metric that fails on an
    /// instance keeps what it had and skips the rest of the run.
    pub fn evaluate<C, W>(
        &self,
        classifier: &mut C,
        instances: &Instances,
        predictions: W,
    ) -> Result<EvaluationReport, EvaluationError>
    where
        C: Classifier + ?Sized,
        W: Write,
    {
        let capabilities = classifier.describe();
        validate(capabilities, instances)?;

        let mut measures = self.measures(capabilities, instances);
        measures.iter_mut().for_each(|m| m.reset());

        log::info!(
            "Evaluating {} on {} instances with {} metrics",
            classifier.name(),
            instances.len(),
            measures.len()
        );

        let mut writer = csv::WriterBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .flexible(true)
            .from_writer(predictions);

        let mut report = EvaluationReport::default();
        let mut failed: HashSet<usize> = HashSet::new();

        for instance in instances.iter() {
            let truth = match instance.true_labels() {
                Some(truth) => truth,
                None => {
                    report.skipped += 1;
                    continue;
                }
            };

            let prediction = classifier.predict(&instance.without_labels());

            for (index, measure) in measures.iter_mut().enumerate() {
                if failed.contains(&index) {
                    continue;
                }

                if let Err(failure) = measure.update(&prediction, &truth) {
                    log::warn!("Dropping metric after failure: {}", failure);
                    failed.insert(index);
                    report.failed.push(failure);
                }
            }

            writer.write_record(prediction.output_values())?;
            report.evaluated += 1;
        }

        writer.flush()?;

        report.metrics = measures
            .iter()
            .map(|m| (m.name().to_string(), m.value()))
            .collect();

        log::info!(
            "--- {} evaluated, {} skipped, {} metrics failed",
            report.evaluated,
            report.skipped,
            report.failed.len()
        );

        Ok(report)
    }
}

fn validate(capabilities: Capabilities, instances: &Instances) -> Result<(), EvaluationError> {
    if instances.is_empty() {
        return Err(EvaluationError::InvalidEvaluationInput(
            "the instance set is empty".to_string(),
        ));
    }

    if instances.num_labels() == 0 {
        return Err(EvaluationError::InvalidEvaluationInput(
            "the instance set has no label columns".to_string(),
        ));
    }

    if capabilities.is_empty() {
        return Err(EvaluationError::InvalidEvaluationInput(
            "the classifier declares no output".to_string(),
        ));
    }

    if let Some(position) = instances
        .iter()
        .position(|i| i.labels.len() != instances.num_labels())
    {
        return Err(EvaluationError::InvalidEvaluationInput(format!(
            "instance {} does not have {} label columns",
            position,
            instances.num_labels()
        )));
    }

    if let Some(hierarchy) = &instances.hierarchy {
        if hierarchy.len() != instances.num_labels() {
            return Err(EvaluationError::InvalidEvaluationInput(format!(
                "hierarchy covers {} labels, expected {}",
                hierarchy.len(),
                instances.num_labels()
            )));
        }
    }

    Ok(())
}

/// Evaluation Error
#[derive(thiserror::Error, Debug)]
pub enum EvaluationError {
    /// The classifier or instance set cannot be evaluated
    #[error("invalid evaluation input: {0}")]
    InvalidEvaluationInput(String),

    /// The classifier could not be trained
    #[error("classifier {name} failed: {reason}")]
    Classifier {
        /// Classifier name
        name: String,
        /// What went wrong
        reason: String,
    },

    /// A results file has a malformed line
    #[error("{path}, line {line}: {reason}")]
    Results {
        /// The results file
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// What was wrong
        reason: String,
    },

    /// Predictions or results could not be written
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Predictions or results could not be encoded
    #[error(transparent)]
    Csv(#[from] csv::Error),
}
