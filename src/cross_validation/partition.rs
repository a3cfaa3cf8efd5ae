use std::collections::BTreeMap;

use derive_new::new;
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use super::Fold;

/// How documents are dealt into folds
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, new)]
#[serde(default)]
pub struct PartitionConfig {
    /// The number of folds. A single fold has no test partition.
    #[new(value = "5")]
    pub num_folds: usize,

    /// The share of each fold's non-test documents that go to training
    #[new(value = "0.8")]
    pub train_to_dev_ratio: f64,

    /// Shuffle seed
    #[new(value = "1")]
    pub seed: u64,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Deal `num_documents` corpus positions into folds.
///
/// Documents are grouped by `group_keys` (one group when `None`). Each group is shuffled and
/// dealt round-robin into `num_folds` test partitions, continuing from where the previous group
/// stopped so partitions stay near-equal overall. Fold `k` tests on partition `k`; the remaining
/// documents of each group are split into train and dev, `round(n * ratio)` going to train.
pub fn partition(
    num_documents: usize,
    config: &PartitionConfig,
    group_keys: Option<&[String]>,
) -> Result<Vec<Fold>, PartitionError> {
    validate(num_documents, config, group_keys)?;

    let mut groups: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for position in 0..num_documents {
        let key = group_keys.map_or("", |keys| keys[position].as_str());
        groups.entry(key).or_default().push(position);
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut assignment = vec![0; num_documents];
    let mut dealt = 0;

    let groups: Vec<Vec<usize>> = groups
        .into_values()
        .map(|mut members| {
            members.shuffle(&mut rng);
            for &member in &members {
                assignment[member] = dealt % config.num_folds;
                dealt += 1;
            }

            members
        })
        .collect();

    let folds = (0..config.num_folds)
        .map(|k| {
            let mut train = Vec::new();
            let mut dev = Vec::new();
            let mut test = Vec::new();

            for members in &groups {
                let remaining: Vec<usize> = if config.num_folds == 1 {
                    members.clone()
                } else {
                    test.extend(members.iter().filter(|&&m| assignment[m] == k));
                    members
                        .iter()
                        .copied()
                        .filter(|&m| assignment[m] != k)
                        .collect()
                };

                let num_train = train_count(remaining.len(), config.train_to_dev_ratio);
                train.extend_from_slice(&remaining[..num_train]);
                dev.extend_from_slice(&remaining[num_train..]);
            }

            train.sort_unstable();
            dev.sort_unstable();
            test.sort_unstable();

            Fold::new(k, Fold::name_for(k), train, dev, test)
        })
        .collect();

    Ok(folds)
}

fn train_count(n: usize, ratio: f64) -> usize {
    ((n as f64 * ratio).round() as usize).min(n)
}

fn validate(
    num_documents: usize,
    config: &PartitionConfig,
    group_keys: Option<&[String]>,
) -> Result<(), PartitionError> {
    if config.num_folds == 0 {
        return Err(PartitionError::NoFolds);
    }

    if config.num_folds > num_documents {
        return Err(PartitionError::TooManyFolds {
            folds: config.num_folds,
            documents: num_documents,
        });
    }

    let ratio = config.train_to_dev_ratio;
    if !(ratio > 0.0 && ratio <= 1.0) {
        return Err(PartitionError::Ratio(ratio));
    }

    if let Some(keys) = group_keys {
        if keys.len() != num_documents {
            return Err(PartitionError::GroupKeys {
                expected: num_documents,
                found: keys.len(),
            });
        }
    }

    Ok(())
}

/// Partition Error
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum PartitionError {
    /// Zero folds requested
    #[error("the number of folds must be positive")]
    NoFolds,

    /// More folds than documents
    #[error("cannot deal {documents} documents into {folds} folds")]
    TooManyFolds {
        /// Folds requested
        folds: usize,
        /// Documents available
        documents: usize,
    },

    /// The train-to-dev ratio is outside (0, 1]
    #[error("train-to-dev ratio {0} is outside (0, 1]")]
    Ratio(f64),

    /// The group keys do not cover the documents
    #[error("expected {expected} group keys, found {found}")]
    GroupKeys {
        /// One per document
        expected: usize,
        /// Keys given
        found: usize,
    },
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use quickcheck::{QuickCheck, TestResult};
    use rstest::rstest;

    use super::*;

    fn config(num_folds: usize, train_to_dev_ratio: f64, seed: u64) -> PartitionConfig {
        PartitionConfig {
            num_folds,
            train_to_dev_ratio,
            seed,
        }
    }

    #[test]
    fn test_ten_documents_five_folds() {
        let folds = partition(10, &config(5, 0.8, 1), None).unwrap();

        assert_eq!(folds.len(), 5);
        for fold in &folds {
            assert_eq!(fold.test.len(), 2);
            assert_eq!(fold.train.len(), 6);
            assert_eq!(fold.dev.len(), 2);
        }
    }

    #[test]
    fn test_single_fold_has_no_test_partition() {
        let folds = partition(7, &config(1, 1.0, 3), None).unwrap();

        assert_eq!(folds.len(), 1);
        assert_eq!(folds[0].train, (0..7).collect::<Vec<_>>());
        assert!(folds[0].dev.is_empty());
        assert!(folds[0].test.is_empty());
    }

    #[test]
    fn test_same_seed_same_folds() {
        let a = partition(25, &config(4, 0.75, 9), None).unwrap();
        let b = partition(25, &config(4, 0.75, 9), None).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_groups_are_spread_across_test_partitions() {
        let keys: Vec<String> = (0..12).map(|i| (i % 3).to_string()).collect();
        let folds = partition(12, &config(4, 1.0, 5), Some(&keys)).unwrap();

        for fold in &folds {
            assert_eq!(fold.test.len(), 3);
            let groups: BTreeSet<_> = fold.test.iter().map(|&i| keys[i].as_str()).collect();
            assert!(groups.len() >= 2);
        }
    }

    #[rstest]
    #[case(5, config(0, 0.8, 1), PartitionError::NoFolds)]
    #[case(3, config(5, 0.8, 1), PartitionError::TooManyFolds { folds: 5, documents: 3 })]
    #[case(10, config(2, 0.0, 1), PartitionError::Ratio(0.0))]
    #[case(10, config(2, 1.5, 1), PartitionError::Ratio(1.5))]
    fn test_invalid_configs(
        #[case] documents: usize,
        #[case] config: PartitionConfig,
        #[case] expected: PartitionError,
    ) {
        assert_eq!(partition(documents, &config, None), Err(expected));
    }

    #[test]
    fn test_group_key_count_must_match() {
        let keys = vec!["a".to_string()];

        assert_eq!(
            partition(2, &config(2, 0.5, 1), Some(&keys)),
            Err(PartitionError::GroupKeys {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn test_property_folds_are_disjoint_and_cover_corpus() {
        fn disjoint_cover(documents: u8, folds: u8, ratio: u8, seed: u64) -> TestResult {
            let documents = documents as usize;
            let folds = (folds % 10) as usize;
            let ratio = (ratio % 100 + 1) as f64 / 100.0;

            if folds == 0 || folds > documents {
                return TestResult::discard();
            }

            let partitioned = match partition(documents, &config(folds, ratio, seed), None) {
                Ok(partitioned) => partitioned,
                Err(_) => return TestResult::failed(),
            };

            let mut tested = BTreeSet::new();
            for fold in &partitioned {
                let mut all: Vec<usize> = fold
                    .train
                    .iter()
                    .chain(&fold.dev)
                    .chain(&fold.test)
                    .copied()
                    .collect();
                all.sort_unstable();

                if all != (0..documents).collect::<Vec<_>>() {
                    return TestResult::failed();
                }

                tested.extend(fold.test.iter().copied());
            }

            TestResult::from_bool(folds == 1 || tested.len() == documents)
        }

        QuickCheck::new()
            .tests(500)
            .quickcheck(disjoint_cover as fn(u8, u8, u8, u64) -> TestResult);
    }
}
