use derive_new::new;
use serde::{Deserialize, Serialize};

/// Stopword lists
pub mod stopwords;

/// Turns raw text into vocabulary tokens
pub trait Tokenize {
    /// Split `text` into tokens, in text order
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Token extraction options
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, new)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Lowercase every token
    #[new(value = "true")]
    pub lowercase: bool,

    /// Drop tokens shorter than this many characters
    #[new(value = "1")]
    pub min_token_length: usize,

    /// Drop common English function words
    #[new(value = "false")]
    pub remove_stopwords: bool,

    /// Drop tokens made only of digits
    #[new(value = "false")]
    pub remove_numbers: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenize for TokenizerConfig {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                if self.lowercase {
                    raw.to_lowercase()
                } else {
                    raw.to_string()
                }
            })
            .filter(|token| token.chars().count() >= self.min_token_length)
            .filter(|token| !(self.remove_numbers && token.chars().all(|c| c.is_numeric())))
            .filter(|token| {
                let lowered = token.to_lowercase();
                !(self.remove_stopwords && stopwords::ENGLISH.contains(lowered.as_str()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_tokenizer() {
        let tokens = TokenizerConfig::default().tokenize("Hello, World! It's 2024.");

        assert_eq!(tokens, vec!["hello", "world", "it", "s", "2024"]);
    }

    #[rstest]
    #[case(
        TokenizerConfig { min_token_length: 3, ..Default::default() },
        vec!["the", "cat", "sat", "mat", "2024"]
    )]
    #[case(
        TokenizerConfig { remove_stopwords: true, ..Default::default() },
        vec!["cat", "sat", "mat", "2024"]
    )]
    #[case(
        TokenizerConfig { remove_numbers: true, ..Default::default() },
        vec!["the", "cat", "sat", "on", "the", "mat"]
    )]
    #[case(
        TokenizerConfig { lowercase: false, ..Default::default() },
        vec!["The", "cat", "sat", "on", "the", "mat", "2024"]
    )]
    fn test_tokenizer_options(#[case] config: TokenizerConfig, #[case] expected: Vec<&str>) {
        assert_eq!(config.tokenize("The cat sat on the mat (2024)"), expected);
    }

    #[test]
    fn test_punctuation_only_is_empty() {
        assert!(TokenizerConfig::default().tokenize(" -- ... !").is_empty());
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: TokenizerConfig =
            serde_json::from_str(r#"{"remove_stopwords": true}"#).unwrap();

        assert!(config.lowercase);
        assert!(config.remove_stopwords);
        assert_eq!(config.min_token_length, 1);
    }
}
