use std::{
    fs::{self, File},
    io::BufWriter,
    path::PathBuf,
};

use anyhow::Context;

use crate::{
    corpus::Corpus,
    cross_validation::{CrossValidation, Fold, FoldOutcome},
    evaluation::{EvaluationReport, Evaluator, Instances},
    format::{FormatSummary, Formatter, SplitPaths},
    models::Model,
    vocab::VocabularyContext,
};

/// Experiment folders and model settings
pub mod config;

/// Cross-fold result averaging
pub mod summary;

pub use config::ExperimentConfig;
pub use summary::MetricSummary;

/// The predictions file inside a results folder
pub static PREDICTIONS_FILE: &str = "predictions.txt";

/// The metrics file inside a results folder
pub static RESULT_FILE: &str = "result.txt";

/// The cross-fold summary file
pub static SUMMARY_FILE: &str = "summary.txt";

/// Runs the preprocessing, cross-validation, evaluation, and summary stages of one experiment
#[derive(Clone, Debug)]
pub struct Experiment {
    config: ExperimentConfig,
}

impl Experiment {
    /// An experiment over the given folders and settings
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    /// The experiment settings
    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    fn load_corpus(&self) -> anyhow::Result<Corpus> {
        let corpus = Corpus::load(&self.config.json_file)?;

        log::info!("--- {}", corpus.summary());

        Ok(corpus)
    }

    /// Format the whole corpus into the data folder
    pub fn preprocess(&self) -> anyhow::Result<FormatSummary> {
        log::info!("Preprocessing {}", self.config.dataset);

        let corpus = self.load_corpus()?;
        let paths = SplitPaths::new(self.config.format_path(), self.config.dataset.clone());
        let formatter = Formatter::new(self.config.cross_validation.formatter.clone());

        let summary = formatter
            .format(&corpus.labeled_texts(), &mut VocabularyContext::new(), &paths)
            .with_context(|| format!("unable to format {}", self.config.dataset))?;

        Ok(summary)
    }

    /// Partition the corpus, persist the folds, and format each of them
    pub fn create_cv(&self) -> anyhow::Result<Vec<FoldOutcome>> {
        log::info!("Creating cross-validation in {}", self.config.cv_folder.display());

        let texts = self.load_corpus()?.labeled_texts();
        let cv = CrossValidation::create(
            &self.config.cv_folder,
            &texts,
            self.config.cross_validation.clone(),
        )?;

        let outcomes = cv.run(&texts)?;
        for outcome in &outcomes {
            log::info!("--- {}", outcome);
        }

        if !outcomes.iter().any(FoldOutcome::is_ready) {
            return Err(anyhow!("no fold could be formatted"));
        }

        Ok(outcomes)
    }

    /// Train and evaluate the configured model on each selected fold. Folds whose test split has no
    /// documents or no labels, such as the only fold of a single-fold setup, are skipped.
    pub fn run(&self) -> anyhow::Result<Vec<(usize, EvaluationReport)>> {
        let model = Model::try_from(self.config.model.as_str())?;
        let cv = CrossValidation::load(&self.config.cv_folder)?;

        let selected = self.selected_folds(cv.folds.len())?;
        let mut reports = Vec::with_capacity(selected.len());

        for index in selected {
            log::info!("Running fold {} with {}", index, model);

            let data = CrossValidation::load_fold(&self.config.cv_folder, index)?;
            log::info!(
                "--- {} labels, {} train, {} dev, {} test",
                data.train.label_vocab.len(),
                data.train.len(),
                data.dev.len(),
                data.test.len()
            );

            if data.test.is_empty() || data.test.label_vocab.is_empty() {
                log::warn!(
                    "--- Skipping {}: nothing to evaluate in its test split",
                    data.fold.name
                );
                continue;
            }

            let mut classifier = match model.classifier(self.config.seed, self.config.threshold) {
                Some(classifier) => classifier,
                None => {
                    log::info!("--- Nothing to run for {}", model);
                    continue;
                }
            };

            classifier.train(&Instances::from_dataset(&data.train))?;

            let folder = self.config.results_folder(&data.fold.name);
            fs::create_dir_all(&folder)
                .with_context(|| format!("unable to create {}", folder.display()))?;

            let predictions = File::create(folder.join(PREDICTIONS_FILE))?;
            let report = Evaluator.evaluate(
                classifier.as_mut(),
                &Instances::from_dataset(&data.test),
                BufWriter::new(predictions),
            )?;

            report.write(folder.join(RESULT_FILE))?;
            log::info!("--- Results written to {}", folder.display());

            reports.push((index, report));
        }

        Ok(reports)
    }

    /// Average the configured model's results across folds into the summary file
    pub fn summarize(&self) -> anyhow::Result<Vec<MetricSummary>> {
        let dataset_folder = self.config.expt_folder.join(&self.config.dataset);

        let mut fold_names: Vec<String> = fs::read_dir(&dataset_folder)
            .with_context(|| format!("unable to read {}", dataset_folder.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| name.starts_with("fold-"))
            .collect();
        fold_names.sort_by_key(|name| {
            name.trim_start_matches("fold-")
                .parse::<usize>()
                .unwrap_or(usize::MAX)
        });

        let mut reports = Vec::new();
        for name in &fold_names {
            let path = self.config.results_folder(name).join(RESULT_FILE);
            if !path.exists() {
                log::warn!("No results for {} at {}", name, path.display());
                continue;
            }

            reports.push(EvaluationReport::read(&path)?);
        }

        if reports.is_empty() {
            return Err(anyhow!(
                "no {} results found under {}",
                self.config.model,
                dataset_folder.display()
            ));
        }

        let summaries = summary::average(&reports);
        let path = self.summary_path();
        summary::write(&path, &summaries)?;

        log::info!(
            "Summarized {} folds into {}",
            reports.len(),
            path.display()
        );

        Ok(summaries)
    }

    /// Where the cross-fold summary goes
    pub fn summary_path(&self) -> PathBuf {
        self.config
            .expt_folder
            .join(&self.config.dataset)
            .join(&self.config.model)
            .join(SUMMARY_FILE)
    }

    fn selected_folds(&self, num_folds: usize) -> anyhow::Result<Vec<usize>> {
        if self.config.folds.is_empty() {
            return Ok((0..num_folds).collect());
        }

        if let Some(missing) = self.config.folds.iter().find(|&&k| k >= num_folds) {
            return Err(anyhow!(
                "{} does not exist, only {} folds were created",
                Fold::name_for(*missing),
                num_folds
            ));
        }

        Ok(self.config.folds.clone())
    }
}
