use std::str::FromStr;

/// A comma-separated fold list, such as `0,2`
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct FoldList(pub Vec<usize>);

impl FromStr for FoldList {
    type Err = FoldListError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse()
                    .map_err(|_| FoldListError::Invalid(part.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(FoldList)
    }
}

/// Fold List Error
#[derive(thiserror::Error, Debug)]
pub enum FoldListError {
    /// A list entry is not a fold index
    #[error("invalid fold index {0}")]
    Invalid(String),
}
