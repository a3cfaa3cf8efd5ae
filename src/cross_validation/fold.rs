use std::{
    fmt::{self, Display},
    fs,
    path::{Path, PathBuf},
};

use derive_new::new;
use serde::{Deserialize, Serialize};

use super::CrossValidationError;
use crate::format::SplitPaths;

/// The descriptor file inside each fold folder
pub static FOLD_FILE: &str = "fold.json";

/// One of a fold's three splits
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Split {
    /// Training documents
    Train,

    /// Development documents
    Dev,

    /// Held-out test documents
    Test,
}

impl Split {
    /// Every split in formatting order
    pub const ALL: [Split; 3] = [Split::Train, Split::Dev, Split::Test];

    /// The file-name extension marking the split
    pub fn ext(&self) -> &'static str {
        match self {
            Split::Train => "tr",
            Split::Dev => "de",
            Split::Test => "te",
        }
    }
}

impl Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Split::Train => "train",
            Split::Dev => "dev",
            Split::Test => "test",
        };

        write!(f, "{}", name)
    }
}

/// Disjoint train, dev, and test corpus positions for one fold
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct Fold {
    /// Fold index
    pub index: usize,

    /// Fold name, also its folder name
    pub name: String,

    /// Training positions
    pub train: Vec<usize>,

    /// Development positions
    pub dev: Vec<usize>,

    /// Test positions
    pub test: Vec<usize>,
}

impl Fold {
    /// The name of fold `index`
    pub fn name_for(index: usize) -> String {
        format!("fold-{}", index)
    }

    /// The folder of fold `index` under `cv_folder`
    pub fn folder_for(cv_folder: &Path, index: usize) -> PathBuf {
        cv_folder.join(Self::name_for(index))
    }

    /// This fold's folder under `cv_folder`
    pub fn folder(&self, cv_folder: &Path) -> PathBuf {
        cv_folder.join(&self.name)
    }

    /// Corpus positions of a split
    pub fn positions(&self, split: Split) -> &[usize] {
        match split {
            Split::Train => &self.train,
            Split::Dev => &self.dev,
            Split::Test => &self.test,
        }
    }

    /// Where a split's files live
    pub fn split_paths(&self, cv_folder: &Path, split: Split) -> SplitPaths {
        SplitPaths::new(
            self.folder(cv_folder),
            format!("{}.{}", self.name, split.ext()),
        )
    }

    /// Write the fold descriptor
    pub fn save(&self, cv_folder: &Path) -> Result<(), CrossValidationError> {
        let folder = self.folder(cv_folder);
        fs::create_dir_all(&folder).map_err(|source| CrossValidationError::Io {
            path: folder.clone(),
            source,
        })?;

        let path = folder.join(FOLD_FILE);
        let json = serde_json::to_string_pretty(self).map_err(|source| {
            CrossValidationError::Json {
                path: path.clone(),
                source,
            }
        })?;

        fs::write(&path, json).map_err(|source| CrossValidationError::Io { path, source })
    }

    /// Read the descriptor of fold `index`
    pub fn load(cv_folder: &Path, index: usize) -> Result<Self, CrossValidationError> {
        let path = Self::folder_for(cv_folder, index).join(FOLD_FILE);
        let json = fs::read_to_string(&path).map_err(|source| CrossValidationError::Io {
            path: path.clone(),
            source,
        })?;

        serde_json::from_str(&json).map_err(|source| CrossValidationError::Json { path, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let fold = Fold::new(2, Fold::name_for(2), vec![0, 3], vec![1], vec![2, 4]);

        fold.save(dir.path()).unwrap();

        assert!(dir.path().join("fold-2").join(FOLD_FILE).exists());
        assert_eq!(Fold::load(dir.path(), 2).unwrap(), fold);
        assert!(Fold::load(dir.path(), 3).is_err());
    }

    #[test]
    fn test_split_paths() {
        let fold = Fold::new(0, Fold::name_for(0), vec![], vec![], vec![]);
        let paths = fold.split_paths(Path::new("cv"), Split::Dev);

        assert_eq!(paths.folder, PathBuf::from("cv/fold-0"));
        assert_eq!(paths.word_vocab(), PathBuf::from("cv/fold-0/fold-0.de.wvoc"));
    }
}
