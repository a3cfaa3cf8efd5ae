use std::path::PathBuf;

use derive_new::new;

/// The files of one formatted split, all named `<name>.<ext>` inside `folder`
#[derive(Clone, Debug, PartialEq, Eq, new)]
pub struct SplitPaths {
    /// The folder holding the split's files
    pub folder: PathBuf,

    /// The split's file stem (e.g., `fold-0.tr`)
    pub name: String,
}

impl SplitPaths {
    fn with_ext(&self, ext: &str) -> PathBuf {
        self.folder.join(format!("{}.{}", self.name, ext))
    }

    /// Word vocabulary, one token per line
    pub fn word_vocab(&self) -> PathBuf {
        self.with_ext("wvoc")
    }

    /// Label vocabulary, one label code per line
    pub fn label_vocab(&self) -> PathBuf {
        self.with_ext("lvoc")
    }

    /// Label descriptor for external multi-label tooling
    pub fn label_descriptor(&self) -> PathBuf {
        self.with_ext("xml")
    }

    /// Document bag-of-words
    pub fn words(&self) -> PathBuf {
        self.with_ext("dat")
    }

    /// Raw document texts
    pub fn texts(&self) -> PathBuf {
        self.with_ext("text")
    }

    /// Document IDs and label sets
    pub fn doc_info(&self) -> PathBuf {
        self.with_ext("docinfo")
    }

    /// Sentence bag-of-words
    pub fn sentence_words(&self) -> PathBuf {
        self.with_ext("sent-dat")
    }

    /// Raw sentences with a per-document count header
    pub fn raw_sentences(&self) -> PathBuf {
        self.with_ext("sent-dat.raw")
    }

    /// Sentence label codes
    pub fn sentence_info(&self) -> PathBuf {
        self.with_ext("sentinfo")
    }

    /// Every file written for the split
    pub fn all(&self) -> Vec<PathBuf> {
        vec![
            self.word_vocab(),
            self.label_vocab(),
            self.label_descriptor(),
            self.words(),
            self.texts(),
            self.doc_info(),
            self.sentence_words(),
            self.raw_sentences(),
            self.sentence_info(),
        ]
    }
}
