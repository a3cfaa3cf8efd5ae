use std::{collections::HashMap, fs, path::Path};

use anyhow::Context;

use crate::evaluation::EvaluationReport;

/// The average of one metric over the folds that produced a finite value
#[derive(Clone, Debug, PartialEq)]
pub struct MetricSummary {
    /// Metric name
    pub name: String,

    /// Mean value, NaN when no fold produced one
    pub mean: f64,

    /// Folds contributing to the mean
    pub folds: usize,
}

/// Average each metric across reports, keeping first-seen metric order
pub fn average(reports: &[EvaluationReport]) -> Vec<MetricSummary> {
    let mut order: Vec<String> = Vec::new();
    let mut totals: HashMap<String, (f64, usize)> = HashMap::new();

    for (name, value) in reports.iter().flat_map(|r| r.metrics.iter()) {
        let entry = totals.entry(name.clone()).or_insert_with(|| {
            order.push(name.clone());
            (0.0, 0)
        });

        if value.is_finite() {
            entry.0 += value;
            entry.1 += 1;
        }
    }

    order
        .into_iter()
        .map(|name| {
            let (sum, folds) = totals.get(&name).copied().unwrap_or((0.0, 0));
            let mean = if folds == 0 { f64::NAN } else { sum / folds as f64 };

            MetricSummary { name, mean, folds }
        })
        .collect()
}

/// Write `name<TAB>mean<TAB>folds` lines
pub fn write<P: AsRef<Path>>(path: P, summaries: &[MetricSummary]) -> anyhow::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("unable to create {}", path.display()))?;

    for summary in summaries {
        writer.write_record([
            summary.name.clone(),
            summary.mean.to_string(),
            summary.folds.to_string(),
        ])?;
    }

    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(metrics: &[(&str, f64)]) -> EvaluationReport {
        EvaluationReport {
            metrics: metrics.iter().map(|&(n, v)| (n.to_string(), v)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_average_skips_undefined_values() {
        let summaries = average(&[
            report(&[("Coverage", 2.0), ("Macro-averaged AUC", f64::NAN)]),
            report(&[("Coverage", 4.0), ("Macro-averaged AUC", 0.5)]),
        ]);

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "Coverage");
        assert_eq!(summaries[0].mean, 3.0);
        assert_eq!(summaries[0].folds, 2);
        assert_eq!(summaries[1].mean, 0.5);
        assert_eq!(summaries[1].folds, 1);
    }

    #[test]
    fn test_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.txt");

        write(&path, &average(&[report(&[("OneError", 0.25)])])).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "OneError\t0.25\t1\n");
    }
}
