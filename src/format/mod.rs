use std::{
    collections::HashMap,
    fmt::{self, Display},
    path::PathBuf,
};

use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::{
    corpus::LabeledTexts,
    processing::{Tokenize, TokenizerConfig},
    utils::classes::dedup_ordered,
    vocab::{VocabularyContext, VocabularyError},
};

/// Bag-of-words encodings
pub mod bag;

/// On-disk split layout
pub mod paths;

/// Formatted splits and their file I/O
pub mod dataset;

pub use bag::BagOfWords;
pub use dataset::FormattedDataset;
pub use paths::SplitPaths;

/// The unique string token for [`UnseenLabelPolicy::ReserveCorpus`]
pub static RESERVE_CORPUS: &str = "reserve-corpus";

/// The unique string token for [`UnseenLabelPolicy::Drop`]
pub static DROP: &str = "drop";

/// The unique string token for [`UnseenLabelPolicy::Error`]
pub static ERROR: &str = "error";

/// What to do with a development or test label the training split never saw
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnseenLabelPolicy {
    /// Seed every fold's label vocabulary with all corpus labels, so no label is unseen
    #[default]
    ReserveCorpus,

    /// Remove the label from the document, with a warning
    Drop,

    /// Fail the split
    Error,
}

impl TryFrom<&str> for UnseenLabelPolicy {
    type Error = FormattingError;

    fn try_from(value: &str) -> Result<Self, FormattingError> {
        match value {
            v if v == RESERVE_CORPUS => Ok(UnseenLabelPolicy::ReserveCorpus),
            v if v == DROP => Ok(UnseenLabelPolicy::Drop),
            v if v == ERROR => Ok(UnseenLabelPolicy::Error),
            _ => Err(FormattingError::UnknownPolicy(value.to_string())),
        }
    }
}

impl Display for UnseenLabelPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnseenLabelPolicy::ReserveCorpus => RESERVE_CORPUS,
            UnseenLabelPolicy::Drop => DROP,
            UnseenLabelPolicy::Error => ERROR,
        };

        write!(f, "{}", name)
    }
}

/// Formatter options
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(default)]
pub struct FormatterConfig {
    /// Token extraction options
    #[new(default)]
    pub tokenizer: TokenizerConfig,

    /// Tokens seen fewer times than this across the split stay out of the vocabulary
    #[new(value = "1")]
    pub min_word_count: usize,

    /// Documents with fewer vocabulary tokens than this are not retained
    #[new(value = "0")]
    pub min_doc_tokens: usize,

    /// Handling of labels outside a frozen label vocabulary
    #[new(default)]
    pub unseen_labels: UnseenLabelPolicy,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts for one formatted split
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSummary {
    /// Documents written
    pub documents: usize,

    /// Documents below the token threshold
    pub skipped_documents: usize,

    /// Sentences written
    pub sentences: usize,

    /// Word vocabulary size
    pub words: usize,

    /// Label vocabulary size
    pub labels: usize,
}

impl Display for FormatSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} documents ({} skipped), {} sentences, {} words, {} labels",
            self.documents, self.skipped_documents, self.sentences, self.words, self.labels
        )
    }
}

/// Turns labeled texts into vocabulary-indexed splits
#[derive(Clone, Debug)]
pub struct Formatter<T: Tokenize = TokenizerConfig> {
    config: FormatterConfig,
    tokenizer: T,
}

impl Formatter {
    /// A formatter using the configured default tokenizer
    pub fn new(config: FormatterConfig) -> Self {
        let tokenizer = config.tokenizer.clone();

        Self { config, tokenizer }
    }
}

impl<T: Tokenize> Formatter<T> {
    /// A formatter with a custom tokenizer. The config's tokenizer options are ignored.
    pub fn with_tokenizer(config: FormatterConfig, tokenizer: T) -> Self {
        Self { config, tokenizer }
    }

    /// The formatter options
    pub fn config(&self) -> &FormatterConfig {
        &self.config
    }

    /// Encode `texts` and write the split's files. The vocabulary is frozen afterwards.
    pub fn format(
        &self,
        texts: &LabeledTexts,
        vocab: &mut VocabularyContext,
        paths: &SplitPaths,
    ) -> Result<FormatSummary, FormattingError> {
        log::info!("Formatting {} into {}", paths.name, paths.folder.display());

        let dataset = self.encode(texts, vocab)?;
        dataset.write(paths)?;

        let summary = FormatSummary {
            documents: dataset.len(),
            skipped_documents: texts.len() - dataset.len(),
            sentences: dataset.sentence_words.iter().map(Vec::len).sum(),
            words: dataset.word_vocab.len(),
            labels: dataset.label_vocab.len(),
        };

        log::info!("--- {}", summary);

        Ok(summary)
    }

    /// Encode `texts` in memory. A learning vocabulary picks up every surviving word and every
    /// label of the retained documents, then is frozen.
    pub fn encode(
        &self,
        texts: &LabeledTexts,
        vocab: &mut VocabularyContext,
    ) -> Result<FormattedDataset, FormattingError> {
        let doc_tokens: Vec<Vec<String>> = texts
            .texts
            .iter()
            .map(|text| self.tokenizer.tokenize(text))
            .collect();

        if !vocab.is_frozen() {
            self.learn_words(&doc_tokens, vocab);
        }

        let mut dataset = FormattedDataset::default();
        let mut pending_labels = Vec::new();

        for (i, tokens) in doc_tokens.iter().enumerate() {
            let words = bag::count(tokens.iter().filter_map(|t| vocab.words().get(t)));

            if bag::total(&words) < self.config.min_doc_tokens {
                log::debug!("Skipping {}: {} tokens", texts.ids[i], bag::total(&words));
                continue;
            }

            let mut sentence_words = Vec::new();
            let mut raw_sentences = Vec::new();
            let mut sentence_labels = Vec::new();

            for (sentence, codes) in texts.sentences[i].iter().zip(&texts.sentence_labels[i]) {
                let encoded = bag::count(
                    self.tokenizer
                        .tokenize(sentence)
                        .iter()
                        .filter_map(|t| vocab.words().get(t)),
                );

                if encoded.is_empty() {
                    continue;
                }

                sentence_words.push(encoded);
                raw_sentences.push(single_line(sentence));
                sentence_labels.push(codes.clone());
            }

            dataset.ids.push(texts.ids[i].clone());
            dataset.texts.push(single_line(&texts.texts[i]));
            dataset.words.push(words);
            dataset.sentence_words.push(sentence_words);
            dataset.raw_sentences.push(raw_sentences);
            dataset.sentence_labels.push(sentence_labels);
            pending_labels.push(dedup_ordered(&texts.labels[i]));
        }

        for code in pending_labels.iter().flatten() {
            vocab.learn_label(code);
        }

        for (position, codes) in pending_labels.into_iter().enumerate() {
            let id = &dataset.ids[position];
            let known = self.known_labels(id, codes, vocab)?;
            dataset.labels.push(known);

            for sentence in dataset.sentence_labels[position].iter_mut() {
                let codes = std::mem::take(sentence);
                *sentence = self.known_labels(id, codes, vocab)?;
            }
        }

        vocab.freeze();

        dataset.word_vocab = vocab.words().clone();
        dataset.label_vocab = vocab.labels().clone();

        Ok(dataset)
    }

    /// Learn tokens meeting the count threshold, in first-seen order
    fn learn_words(&self, doc_tokens: &[Vec<String>], vocab: &mut VocabularyContext) {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for token in doc_tokens.iter().flatten() {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }

        for token in doc_tokens.iter().flatten() {
            if counts.get(token.as_str()).copied().unwrap_or(0) >= self.config.min_word_count {
                vocab.learn_word(token);
            }
        }
    }

    /// Keep the codes present in the label vocabulary, applying the unseen-label policy
    fn known_labels(
        &self,
        id: &str,
        codes: Vec<String>,
        vocab: &VocabularyContext,
    ) -> Result<Vec<String>, FormattingError> {
        let mut known = Vec::with_capacity(codes.len());

        for code in codes {
            if vocab.labels().contains(&code) {
                known.push(code);
                continue;
            }

            match self.config.unseen_labels {
                UnseenLabelPolicy::Error => {
                    return Err(FormattingError::UnseenLabel {
                        id: id.to_string(),
                        code,
                    })
                }
                UnseenLabelPolicy::Drop | UnseenLabelPolicy::ReserveCorpus => {
                    log::warn!("Dropping unseen label {} from {}", code, id);
                }
            }
        }

        Ok(known)
    }
}

fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

/// Formatting Error
#[derive(thiserror::Error, Debug)]
pub enum FormattingError {
    /// A split file could not be read or written
    #[error("unable to access {path}: {source}")]
    Io {
        /// The file or folder
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// A split file has a malformed line
    #[error("{path}, line {line}: {reason}")]
    Parse {
        /// The file
        path: PathBuf,
        /// The 1-based line number
        line: usize,
        /// What was wrong
        reason: String,
    },

    /// A split file does not line up with the document list
    #[error("{path} has {found} entries, expected {expected}")]
    Misaligned {
        /// The file
        path: PathBuf,
        /// Entries expected
        expected: usize,
        /// Entries found
        found: usize,
    },

    /// A vocabulary file lists the same item twice
    #[error("invalid vocabulary {path}: {source}")]
    Vocabulary {
        /// The file
        path: PathBuf,
        /// The vocabulary error
        source: VocabularyError,
    },

    /// A document carries a label the frozen label vocabulary lacks
    #[error("document {id} has unseen label {code}")]
    UnseenLabel {
        /// The document ID
        id: String,
        /// The label code
        code: String,
    },

    /// No unseen-label policy found for the given string
    #[error("no unseen-label policy found for {0}")]
    UnknownPolicy(String),
}
