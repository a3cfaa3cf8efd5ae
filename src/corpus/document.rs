use std::collections::BTreeMap;

use derive_new::new;
use serde::{Deserialize, Serialize};

/// One annotator's frame judgment on a sentence
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, new)]
pub struct Annotation {
    /// The annotator who assigned the frame
    pub annotator: String,

    /// The frame code, an integer category encoded as a float
    pub frame: f64,

    /// The annotation round
    pub round: i64,
}

impl Annotation {
    /// The integer category code of the frame, as used in label vocabularies
    pub fn label_code(&self) -> String {
        (self.frame.trunc() as i64).to_string()
    }
}

/// A sentence and the annotations assigned to it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, new)]
pub struct Sentence {
    /// The raw sentence text
    pub text: String,

    /// Annotations in the order they appear in the corpus (may be empty)
    pub annotations: Vec<Annotation>,
}

impl Sentence {
    /// Label codes of every annotation on this sentence, in order
    pub fn label_codes(&self) -> Vec<String> {
        self.annotations.iter().map(Annotation::label_code).collect()
    }
}

/// A document made of ordered sentences
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, new)]
pub struct Document {
    /// The unique document ID
    pub id: String,

    /// Sentences in document order
    pub sentences: Vec<Sentence>,

    /// The source filename, when the corpus records one
    #[new(default)]
    pub filename: Option<String>,

    /// Irrelevance markers recorded by annotators
    #[new(default)]
    pub irrelevant: BTreeMap<String, i64>,

    /// The source XML files, when the corpus records them
    #[new(default)]
    pub xml_files: Vec<String>,
}

impl Document {
    /// The raw document text: every sentence prefixed with a single space
    pub fn text(&self) -> String {
        self.sentences
            .iter()
            .fold(String::new(), |mut text, sentence| {
                text.push(' ');
                text.push_str(&sentence.text);
                text
            })
    }

    /// Label codes of every annotation across all sentences, duplicates retained
    pub fn label_codes(&self) -> Vec<String> {
        self.sentences
            .iter()
            .flat_map(|sentence| sentence.annotations.iter().map(Annotation::label_code))
            .collect()
    }

    /// The total number of annotations on this document
    pub fn num_annotations(&self) -> usize {
        self.sentences.iter().map(|s| s.annotations.len()).sum()
    }
}
