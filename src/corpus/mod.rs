use std::{
    collections::{BTreeMap, BTreeSet},
    fmt::{self, Display},
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Deserialize;

/// Annotation, Sentence and Document records
pub mod document;

/// Flattened, index-aligned text and label arrays
pub mod texts;

mod wire;

pub use document::{Annotation, Document, Sentence};
pub use texts::LabeledTexts;

/// An annotated corpus keyed by unique document ID
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Corpus {
    documents: BTreeMap<String, Document>,
}

impl Corpus {
    /// Load a corpus from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CorpusParseError> {
        let path = path.as_ref();

        log::info!("Loading corpus from {}", path.display());

        let file = File::open(path).map_err(|source| CorpusParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let corpus = Self::from_reader(BufReader::new(file))?;

        log::info!("--- Loaded {} documents", corpus.len());

        Ok(corpus)
    }

    /// Parse a corpus from any JSON reader. Nothing is returned unless every document parses.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CorpusParseError> {
        let mut de = serde_json::Deserializer::from_reader(reader);
        let raw = wire::RawCorpus::deserialize(&mut de).map_err(CorpusParseError::Json)?;
        de.end().map_err(CorpusParseError::Json)?;

        Self::from_raw(raw)
    }

    fn from_raw(raw: wire::RawCorpus) -> Result<Self, CorpusParseError> {
        let mut documents = BTreeMap::new();

        for (id, value) in raw.0 {
            if documents.contains_key(&id) {
                return Err(CorpusParseError::DuplicateDocument(id));
            }

            let document = wire::parse_document(&id, value)?;
            documents.insert(id, document);
        }

        Ok(Self { documents })
    }

    /// The number of documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the corpus has no documents
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Look up a document by ID
    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    /// Documents in document ID order
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    /// Document IDs in order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    /// Flatten the corpus into index-aligned text and label arrays
    pub fn labeled_texts(&self) -> LabeledTexts {
        LabeledTexts::from_documents(self.documents())
    }

    /// Count documents, sentences, and annotations
    pub fn summary(&self) -> CorpusSummary {
        let mut summary = CorpusSummary {
            documents: self.len(),
            ..Default::default()
        };

        for sentence in self.documents().flat_map(|d| d.sentences.iter()) {
            summary.sentences += 1;
            if sentence.annotations.is_empty() {
                summary.unannotated_sentences += 1;
            }

            for annotation in &sentence.annotations {
                summary.annotations += 1;
                summary.annotators.insert(annotation.annotator.clone());
                summary.rounds.insert(annotation.round);
                summary.labels.insert(annotation.label_code());
            }
        }

        summary
    }
}

impl FromStr for Corpus {
    type Err = CorpusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_reader(s.as_bytes())
    }
}

/// Corpus-wide counts
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CorpusSummary {
    /// Number of documents
    pub documents: usize,

    /// Number of sentences
    pub sentences: usize,

    /// Number of sentences without any annotation
    pub unannotated_sentences: usize,

    /// Number of annotations
    pub annotations: usize,

    /// Distinct annotators
    pub annotators: BTreeSet<String>,

    /// Distinct annotation rounds
    pub rounds: BTreeSet<i64>,

    /// Distinct label codes
    pub labels: BTreeSet<String>,
}

impl Display for CorpusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} documents, {} sentences ({} unannotated), {} annotations, {} labels, {} annotators, rounds {:?}",
            self.documents,
            self.sentences,
            self.unannotated_sentences,
            self.annotations,
            self.labels.len(),
            self.annotators.len(),
            self.rounds,
        )
    }
}

/// Corpus ingestion error
#[derive(thiserror::Error, Debug)]
pub enum CorpusParseError {
    /// The corpus file could not be read
    #[error("unable to read corpus {path}: {source}")]
    Io {
        /// The corpus path
        path: PathBuf,
        /// The underlying I/O error
        source: std::io::Error,
    },

    /// The input is not a JSON object keyed by document ID
    #[error("malformed corpus: {0}")]
    Json(#[source] serde_json::Error),

    /// The same document ID appears twice
    #[error("duplicate document ID {0}")]
    DuplicateDocument(String),

    /// A document value has the wrong shape
    #[error("document {id}: {reason}")]
    Document {
        /// The document ID
        id: String,
        /// What was wrong
        reason: String,
    },

    /// A sentence has the wrong shape
    #[error("document {id}, sentence {sentence}: {reason}")]
    Sentence {
        /// The document ID
        id: String,
        /// The sentence position in the document
        sentence: usize,
        /// What was wrong
        reason: String,
    },

    /// An annotation has the wrong shape
    #[error("document {id}, sentence {sentence}, annotation {annotation}: {reason}")]
    Annotation {
        /// The document ID
        id: String,
        /// The sentence position in the document
        sentence: usize,
        /// The annotation position in the sentence
        annotation: usize,
        /// What was wrong
        reason: String,
    },
}

impl CorpusParseError {
    pub(crate) fn document(id: &str, reason: impl Display) -> Self {
        Self::Document {
            id: id.to_string(),
            reason: reason.to_string(),
        }
    }
}
