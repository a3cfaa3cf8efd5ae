use std::collections::HashMap;

use crate::utils::classes::invert_map;

/// An order-stable bijection between items and dense indices. The first item inserted gets
/// index 0, the next new item index 1, and so on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Vocabulary {
    items: Vec<String>,
    index: HashMap<String, usize>,
}

impl Vocabulary {
    /// An empty vocabulary
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a vocabulary whose indices are the positions in `items`
    pub fn from_items(items: Vec<String>) -> Result<Self, VocabularyError> {
        let index: HashMap<String, usize> = invert_map(items.iter().cloned().enumerate());

        if index.len() != items.len() {
            let mut seen = HashMap::with_capacity(items.len());
            let duplicate = items
                .iter()
                .find(|item| seen.insert(item.as_str(), ()).is_some())
                .cloned()
                .unwrap_or_default();

            return Err(VocabularyError::Duplicate(duplicate));
        }

        Ok(Self { items, index })
    }

    /// The index of `item`, inserting it at the next free index when unseen
    pub fn insert(&mut self, item: &str) -> usize {
        if let Some(&index) = self.index.get(item) {
            return index;
        }

        let index = self.items.len();
        self.items.push(item.to_string());
        self.index.insert(item.to_string(), index);

        index
    }

    /// The index of `item`, if present
    pub fn get(&self, item: &str) -> Option<usize> {
        self.index.get(item).copied()
    }

    /// Whether `item` is present
    pub fn contains(&self, item: &str) -> bool {
        self.index.contains_key(item)
    }

    /// The item at `index`, if any
    pub fn item(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    /// Items in index order
    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// The number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the vocabulary is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The word and label vocabularies shared by the splits of one dataset.
///
/// A fresh context learns every word and label it sees. After the training split is formatted
/// the context is frozen, and the development and test splits only look items up: anything the
/// training split never saw drops out of their encodings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VocabularyContext {
    words: Vocabulary,
    labels: Vocabulary,
    frozen: bool,
}

impl VocabularyContext {
    /// A fresh, learning context
    pub fn new() -> Self {
        Self::default()
    }

    /// A learning context whose label vocabulary is seeded with `labels`, in order
    pub fn with_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut context = Self::new();
        for label in labels {
            context.labels.insert(label.as_ref());
        }

        context
    }

    /// A frozen context built from existing vocabularies
    pub fn from_parts(words: Vocabulary, labels: Vocabulary) -> Self {
        Self {
            words,
            labels,
            frozen: true,
        }
    }

    /// Stop learning new items
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Whether the context has stopped learning
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// The word vocabulary
    pub fn words(&self) -> &Vocabulary {
        &self.words
    }

    /// The label vocabulary
    pub fn labels(&self) -> &Vocabulary {
        &self.labels
    }

    /// The index of a word, learning it unless frozen
    pub fn learn_word(&mut self, token: &str) -> Option<usize> {
        if self.frozen {
            self.words.get(token)
        } else {
            Some(self.words.insert(token))
        }
    }

    /// The index of a label code, learning it unless frozen
    pub fn learn_label(&mut self, code: &str) -> Option<usize> {
        if self.frozen {
            self.labels.get(code)
        } else {
            Some(self.labels.insert(code))
        }
    }
}

/// Vocabulary Error
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum VocabularyError {
    /// The same item appears at two indices
    #[error("duplicate vocabulary entry {0}")]
    Duplicate(String),
}
