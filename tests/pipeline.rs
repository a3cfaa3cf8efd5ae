use std::fs;

use multilabel_cv::{
    corpus::Corpus,
    cross_validation::{CrossValidation, CrossValidationConfig, Split},
    experiment::{Experiment, ExperimentConfig, PREDICTIONS_FILE, RESULT_FILE},
    format::{FormattedDataset, Formatter, FormatterConfig, SplitPaths},
    utils::files::read_file,
    vocab::VocabularyContext,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn corpus_json(num_documents: usize) -> String {
    let documents: Vec<String> = (0..num_documents)
        .map(|i| {
            format!(
                r#""doc-{:02}": [["topic{} policy debate", [["a", {}.0, 1], ["b", {}.0, 1]]], ["vote{} tonight", [["a", 2.0, 1]]]]"#,
                i,
                i,
                i % 3,
                (i + 1) % 4,
                i % 2
            )
        })
        .collect();

    format!("{{{}}}", documents.join(","))
}

fn corpus(num_documents: usize) -> Corpus {
    corpus_json(num_documents).parse().unwrap()
}

#[test]
fn test_single_fold_matches_unpartitioned_format() {
    let dir = TempDir::new().unwrap();
    let texts = corpus(6).labeled_texts();

    let paths = SplitPaths::new(dir.path().join("format"), "corpus".to_string());
    Formatter::new(FormatterConfig::default())
        .format(&texts, &mut VocabularyContext::new(), &paths)
        .unwrap();
    let whole = FormattedDataset::load(&paths).unwrap();

    let mut config = CrossValidationConfig::default();
    config.partition.num_folds = 1;
    config.partition.train_to_dev_ratio = 1.0;

    let cv_folder = dir.path().join("cv");
    let cv = CrossValidation::create(&cv_folder, &texts, config).unwrap();
    let outcomes = cv.run(&texts).unwrap();
    assert!(outcomes.iter().all(|outcome| outcome.is_ready()));

    let data = CrossValidation::load_fold(&cv_folder, 0).unwrap();

    assert_eq!(data.fold.positions(Split::Train).len(), 6);
    assert!(data.dev.is_empty());
    assert!(data.test.is_empty());
    assert_eq!(data.train.word_vocab, whole.word_vocab);
    assert_eq!(data.train.label_vocab, whole.label_vocab);
    assert_eq!(data.train.ids, whole.ids);
    assert_eq!(data.train.words, whole.words);
}

#[test]
fn test_ten_documents_over_five_folds() {
    let dir = TempDir::new().unwrap();
    let texts = corpus(10).labeled_texts();
    let cv_folder = dir.path().join("cv");

    let cv = CrossValidation::create(&cv_folder, &texts, CrossValidationConfig::default()).unwrap();
    cv.run(&texts).unwrap();

    let mut tested = Vec::new();
    for k in 0..5 {
        let data = CrossValidation::load_fold(&cv_folder, k).unwrap();

        assert_eq!(data.train.len(), 6);
        assert_eq!(data.dev.len(), 2);
        assert_eq!(data.test.len(), 2);
        assert_eq!(data.dev.word_vocab, data.train.word_vocab);
        assert_eq!(data.test.label_vocab, data.train.label_vocab);

        tested.extend(data.test.ids.clone());
    }

    tested.sort();
    assert_eq!(tested, texts.ids);
}

#[test]
fn test_experiment_end_to_end() {
    let dir = TempDir::new().unwrap();
    let json_file = dir.path().join("corpus.json");
    fs::write(&json_file, corpus_json(10)).unwrap();

    let mut config = ExperimentConfig::default();
    config.dataset = "frames".to_string();
    config.json_file = json_file;
    config.data_folder = dir.path().join("data");
    config.cv_folder = dir.path().join("cv");
    config.expt_folder = dir.path().join("experiment");

    let experiment = Experiment::new(config.clone());

    let summary = experiment.preprocess().unwrap();
    assert_eq!(summary.documents, 10);
    assert!(SplitPaths::new(config.format_path(), "frames".to_string())
        .all()
        .iter()
        .all(|path| path.exists()));

    let outcomes = experiment.create_cv().unwrap();
    assert_eq!(outcomes.len(), 5);

    let reports = experiment.run().unwrap();
    assert_eq!(reports.len(), 5);

    for (k, report) in &reports {
        let folder = config.results_folder(&format!("fold-{}", k));

        assert_eq!(report.evaluated, 2);
        assert_eq!(read_file(folder.join(PREDICTIONS_FILE)).unwrap().len(), 2);
        assert!(folder.join(RESULT_FILE).exists());
    }

    let summaries = experiment.summarize().unwrap();
    assert!(!summaries.is_empty());
    assert!(summaries.iter().all(|summary| summary.folds <= 5));
    assert!(experiment.summary_path().exists());
}

#[test]
fn test_experiment_rejects_missing_fold() {
    let dir = TempDir::new().unwrap();
    let json_file = dir.path().join("corpus.json");
    fs::write(&json_file, corpus_json(6)).unwrap();

    let mut config = ExperimentConfig::default();
    config.json_file = json_file;
    config.cv_folder = dir.path().join("cv");
    config.expt_folder = dir.path().join("experiment");
    config.cross_validation.partition.num_folds = 3;

    Experiment::new(config.clone()).create_cv().unwrap();

    config.folds = vec![1, 3];
    assert!(Experiment::new(config).run().is_err());
}

#[test]
fn test_experiment_skips_fold_without_test_split() {
    let dir = TempDir::new().unwrap();
    let json_file = dir.path().join("corpus.json");
    fs::write(&json_file, corpus_json(6)).unwrap();

    let mut config = ExperimentConfig::default();
    config.json_file = json_file;
    config.cv_folder = dir.path().join("cv");
    config.expt_folder = dir.path().join("experiment");
    config.cross_validation.partition.num_folds = 1;

    let experiment = Experiment::new(config.clone());
    assert_eq!(experiment.create_cv().unwrap().len(), 1);

    let reports = experiment.run().unwrap();

    assert!(reports.is_empty());
    assert!(!config.results_folder("fold-0").exists());
}
