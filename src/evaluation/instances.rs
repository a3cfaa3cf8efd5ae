use super::EvaluationError;
use crate::format::FormattedDataset;

/// One row of an instance table: sparse word-count features and one label column per label.
/// A label column is `None` when its value is missing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Instance {
    /// `(word index, count)` pairs
    pub features: Vec<(usize, f64)>,

    /// Label columns
    pub labels: Vec<Option<bool>>,
}

impl Instance {
    /// Whether any label column is missing
    pub fn has_missing_labels(&self) -> bool {
        self.labels.iter().any(Option::is_none)
    }

    /// The label columns as booleans, if none is missing
    pub fn true_labels(&self) -> Option<Vec<bool>> {
        self.labels.iter().copied().collect()
    }

    /// A copy with every label column blanked
    pub fn without_labels(&self) -> Self {
        Self {
            features: self.features.clone(),
            labels: vec![None; self.labels.len()],
        }
    }
}

/// Parent links between labels. Roots have no parent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelHierarchy {
    parents: Vec<Option<usize>>,
}

impl LabelHierarchy {
    /// Build a hierarchy from each label's parent, rejecting dangling links and cycles
    pub fn new(parents: Vec<Option<usize>>) -> Result<Self, EvaluationError> {
        for (label, parent) in parents.iter().enumerate() {
            if let Some(parent) = parent {
                if *parent >= parents.len() {
                    return Err(EvaluationError::InvalidEvaluationInput(format!(
                        "label {} has unknown parent {}",
                        label, parent
                    )));
                }
            }

            let mut steps = 0;
            let mut current = parents[label];
            while let Some(ancestor) = current {
                steps += 1;
                if ancestor == label || steps > parents.len() {
                    return Err(EvaluationError::InvalidEvaluationInput(format!(
                        "label {} is its own ancestor",
                        label
                    )));
                }
                current = parents[ancestor];
            }
        }

        Ok(Self { parents })
    }

    /// The number of labels
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Whether the hierarchy has no labels
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Labels without a parent
    pub fn roots(&self) -> Vec<usize> {
        (0..self.len()).filter(|&l| self.parents[l].is_none()).collect()
    }

    /// Direct children of `label`
    pub fn children(&self, label: usize) -> Vec<usize> {
        (0..self.len())
            .filter(|&l| self.parents[l] == Some(label))
            .collect()
    }
}

/// A table of instances sharing one label space
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Instances {
    /// Label column names
    pub label_names: Vec<String>,

    /// The number of feature columns
    pub num_features: usize,

    /// Rows in order
    pub instances: Vec<Instance>,

    /// Optional structure over the label columns
    pub hierarchy: Option<LabelHierarchy>,
}

impl Instances {
    /// One instance per document: bag-of-words features and a column per label-vocabulary entry
    pub fn from_dataset(dataset: &FormattedDataset) -> Self {
        let label_names = dataset
            .label_vocab
            .items()
            .iter()
            .map(|code| format!("label_{}", code))
            .collect();

        let instances = dataset
            .words
            .iter()
            .zip(&dataset.labels)
            .map(|(words, codes)| {
                let mut labels = vec![Some(false); dataset.label_vocab.len()];
                for index in codes.iter().filter_map(|c| dataset.label_vocab.get(c)) {
                    labels[index] = Some(true);
                }

                Instance {
                    features: words.iter().map(|&(i, c)| (i, c as f64)).collect(),
                    labels,
                }
            })
            .collect();

        Self {
            label_names,
            num_features: dataset.word_vocab.len(),
            instances,
            hierarchy: None,
        }
    }

    /// The number of label columns
    pub fn num_labels(&self) -> usize {
        self.label_names.len()
    }

    /// The number of instances
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Whether there are no instances
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Iterate over instances
    pub fn iter(&self) -> impl Iterator<Item = &Instance> {
        self.instances.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{corpus::Corpus, format::Formatter, vocab::VocabularyContext};

    #[test]
    fn test_from_dataset() {
        let texts = r#"{"a": [["red red blue", [["x", 4.0, 1]]]], "b": [["blue", [["x", 2.0, 1], ["y", 4.0, 1]]]]}"#
            .parse::<Corpus>()
            .unwrap()
            .labeled_texts();
        let dataset = Formatter::new(Default::default())
            .encode(&texts, &mut VocabularyContext::new())
            .unwrap();

        let instances = Instances::from_dataset(&dataset);

        assert_eq!(instances.label_names, vec!["label_4", "label_2"]);
        assert_eq!(instances.num_features, 2);
        assert_eq!(instances.instances[0].features, vec![(0, 2.0), (1, 1.0)]);
        assert_eq!(instances.instances[0].labels, vec![Some(true), Some(false)]);
        assert_eq!(instances.instances[1].true_labels(), Some(vec![true, true]));
    }

    #[test]
    fn test_missing_labels() {
        let instance = Instance {
            features: vec![(0, 1.0)],
            labels: vec![Some(true), None],
        };

        assert!(instance.has_missing_labels());
        assert_eq!(instance.true_labels(), None);
        assert_eq!(instance.without_labels().labels, vec![None, None]);
    }

    #[test]
    fn test_hierarchy_validation() {
        let hierarchy = LabelHierarchy::new(vec![None, Some(0), Some(0), Some(1)]).unwrap();

        assert_eq!(hierarchy.roots(), vec![0]);
        assert_eq!(hierarchy.children(0), vec![1, 2]);
        assert!(LabelHierarchy::new(vec![Some(1), Some(0)]).is_err());
        assert!(LabelHierarchy::new(vec![Some(5)]).is_err());
    }
}
