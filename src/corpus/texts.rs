use super::Document;
use crate::utils::classes::dedup_ordered;

/// Per-document text and labels, every field index-aligned with `ids`
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LabeledTexts {
    /// Document IDs
    pub ids: Vec<String>,

    /// Raw document texts
    pub texts: Vec<String>,

    /// Label codes of every annotation in the document, duplicates retained
    pub labels: Vec<Vec<String>>,

    /// Raw sentence texts per document
    pub sentences: Vec<Vec<String>>,

    /// Label codes per sentence per document
    pub sentence_labels: Vec<Vec<Vec<String>>>,
}

impl LabeledTexts {
    /// Flatten documents into aligned arrays, keeping the iteration order
    pub fn from_documents<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut texts = Self::default();

        for document in documents {
            texts.ids.push(document.id.clone());
            texts.texts.push(document.text());
            texts.labels.push(document.label_codes());
            texts.sentences.push(
                document
                    .sentences
                    .iter()
                    .map(|sentence| sentence.text.clone())
                    .collect(),
            );
            texts.sentence_labels.push(
                document
                    .sentences
                    .iter()
                    .map(|sentence| sentence.label_codes())
                    .collect(),
            );
        }

        texts
    }

    /// The number of documents
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether there are no documents
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The documents at the given positions, in the given order. Returns `None` if any position
    /// is out of range.
    pub fn subset(&self, indices: &[usize]) -> Option<Self> {
        if indices.iter().any(|&i| i >= self.len()) {
            return None;
        }

        Some(Self {
            ids: indices.iter().map(|&i| self.ids[i].clone()).collect(),
            texts: indices.iter().map(|&i| self.texts[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i].clone()).collect(),
            sentences: indices.iter().map(|&i| self.sentences[i].clone()).collect(),
            sentence_labels: indices
                .iter()
                .map(|&i| self.sentence_labels[i].clone())
                .collect(),
        })
    }

    /// Every label code in first-occurrence order, without duplicates
    pub fn label_codes(&self) -> Vec<String> {
        dedup_ordered(self.labels.iter().flatten())
    }

    /// The deduplicated label set of each document, in first-occurrence order
    pub fn label_sets(&self) -> Vec<Vec<String>> {
        self.labels.iter().map(dedup_ordered).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::Corpus;

    fn texts() -> LabeledTexts {
        let corpus: Corpus = r#"{
            "a": [["one two", [["x", 3.0, 1], ["y", 1.0, 1]]], ["three", [["x", 3.0, 1]]]],
            "b": [["four", [["x", 5.0, 2]]]],
            "c": [["five", []]]
        }"#
        .parse()
        .unwrap();

        corpus.labeled_texts()
    }

    #[test]
    fn test_arrays_are_aligned() {
        let texts = texts();

        assert_eq!(texts.len(), 3);
        assert_eq!(texts.ids, vec!["a", "b", "c"]);
        assert_eq!(texts.texts[0], " one two three");
        assert_eq!(texts.labels[0], vec!["3", "1", "3"]);
        assert_eq!(texts.sentence_labels[0], vec![vec!["3", "1"], vec!["3"]]);
        assert!(texts.labels[2].is_empty());
        assert_eq!(texts.sentence_labels[2], vec![Vec::<String>::new()]);
    }

    #[test]
    fn test_label_codes_are_deduplicated_in_order() {
        let texts = texts();

        assert_eq!(texts.label_codes(), vec!["3", "1", "5"]);
        assert_eq!(texts.label_sets()[0], vec!["3", "1"]);
    }

    #[test]
    fn test_subset() {
        let texts = texts();
        let subset = texts.subset(&[2, 0]).unwrap();

        assert_eq!(subset.ids, vec!["c", "a"]);
        assert_eq!(subset.sentences[1], vec!["one two", "three"]);
        assert!(texts.subset(&[3]).is_none());
    }
}
