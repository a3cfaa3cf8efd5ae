//! Sparse bag-of-words encodings, written as space-separated `index:count` pairs

use std::collections::BTreeMap;

/// Word index and count pairs, sorted by index
pub type BagOfWords = Vec<(usize, usize)>;

/// Count word indices into a bag sorted by index
pub fn count<I: IntoIterator<Item = usize>>(indices: I) -> BagOfWords {
    let mut counts = BTreeMap::new();
    for index in indices {
        *counts.entry(index).or_insert(0) += 1;
    }

    counts.into_iter().collect()
}

/// The total number of tokens in a bag
pub fn total(bag: &[(usize, usize)]) -> usize {
    bag.iter().map(|(_, count)| count).sum()
}

/// Render a bag as `index:count` pairs
pub fn to_line(bag: &[(usize, usize)]) -> String {
    bag.iter()
        .map(|(index, count)| format!("{}:{}", index, count))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse `index:count` pairs back into a bag
pub fn parse(line: &str) -> Result<BagOfWords, String> {
    line.split_whitespace()
        .map(|pair| {
            let (index, count) = pair
                .split_once(':')
                .ok_or_else(|| format!("expected index:count, found {:?}", pair))?;

            let index = index
                .parse()
                .map_err(|e| format!("bad index in {:?}: {}", pair, e))?;
            let count = count
                .parse()
                .map_err(|e| format!("bad count in {:?}: {}", pair, e))?;

            Ok((index, count))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_sorts_by_index() {
        let bag = count([4, 1, 4, 0, 4]);

        assert_eq!(bag, vec![(0, 1), (1, 1), (4, 3)]);
        assert_eq!(total(&bag), 5);
        assert_eq!(to_line(&bag), "0:1 1:1 4:3");
    }

    #[test]
    fn test_parse() {
        assert_eq!(parse("0:1 1:1  4:3").unwrap(), vec![(0, 1), (1, 1), (4, 3)]);
        assert_eq!(parse("").unwrap(), vec![]);
        assert!(parse("3-1").is_err());
        assert!(parse("x:1").is_err());
    }
}
