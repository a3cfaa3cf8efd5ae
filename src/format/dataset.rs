use std::path::{Path, PathBuf};

use super::{bag, BagOfWords, FormattingError, SplitPaths};
use crate::{
    utils::files::{create_folder, read_file, write_file},
    vocab::{Vocabulary, VocabularyContext},
};

/// A numeric, vocabulary-indexed split. Every per-document field is index-aligned with `ids`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormattedDataset {
    /// Retained document IDs
    pub ids: Vec<String>,

    /// Raw document texts, one line each
    pub texts: Vec<String>,

    /// Document bag-of-words
    pub words: Vec<BagOfWords>,

    /// Document label sets, restricted to the label vocabulary
    pub labels: Vec<Vec<String>>,

    /// Bag-of-words of each retained sentence
    pub sentence_words: Vec<Vec<BagOfWords>>,

    /// Raw text of each retained sentence
    pub raw_sentences: Vec<Vec<String>>,

    /// Annotation label codes of each retained sentence
    pub sentence_labels: Vec<Vec<Vec<String>>>,

    /// The word vocabulary the encodings index into
    pub word_vocab: Vocabulary,

    /// The label vocabulary
    pub label_vocab: Vocabulary,
}

impl FormattedDataset {
    /// The number of retained documents
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no document was retained
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// A frozen vocabulary context holding this split's vocabularies
    pub fn vocabulary(&self) -> VocabularyContext {
        VocabularyContext::from_parts(self.word_vocab.clone(), self.label_vocab.clone())
    }

    /// Write every file of the split. Each file is flushed and closed before the next opens.
    pub fn write(&self, paths: &SplitPaths) -> Result<(), FormattingError> {
        create_folder(&paths.folder).map_err(|source| FormattingError::Io {
            path: paths.folder.clone(),
            source,
        })?;

        write(paths.word_vocab(), self.word_vocab.items())?;
        write(paths.label_vocab(), self.label_vocab.items())?;
        write(paths.label_descriptor(), label_descriptor(&self.label_vocab))?;
        write(paths.words(), self.words.iter().map(|b| bag::to_line(b)))?;
        write(paths.texts(), &self.texts)?;
        write(
            paths.doc_info(),
            self.ids.iter().zip(&self.labels).map(|(id, labels)| {
                std::iter::once(id.as_str())
                    .chain(labels.iter().map(String::as_str))
                    .collect::<Vec<_>>()
                    .join("\t")
            }),
        )?;
        write(
            paths.sentence_words(),
            self.sentence_words.iter().map(|sentences| {
                sentences
                    .iter()
                    .map(|b| bag::to_line(b))
                    .collect::<Vec<_>>()
                    .join("\t")
            }),
        )?;
        write(
            paths.raw_sentences(),
            self.raw_sentences.iter().flat_map(|sentences| {
                std::iter::once(sentences.len().to_string()).chain(sentences.iter().cloned())
            }),
        )?;
        write(
            paths.sentence_info(),
            self.sentence_labels.iter().map(|sentences| {
                sentences
                    .iter()
                    .map(|codes| codes.join(" "))
                    .collect::<Vec<_>>()
                    .join("\t")
            }),
        )?;

        Ok(())
    }

    /// Load a split written by [`FormattedDataset::write`], checking that its files line up
    pub fn load(paths: &SplitPaths) -> Result<Self, FormattingError> {
        let word_vocab = load_vocab(paths.word_vocab())?;
        let label_vocab = load_vocab(paths.label_vocab())?;

        let path = paths.words();
        let words = read(&path)?
            .iter()
            .enumerate()
            .map(|(line, text)| {
                bag::parse(text).map_err(|reason| parse_error(&path, line, reason))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let texts = read(&paths.texts())?;

        let mut ids = Vec::new();
        let mut labels = Vec::new();
        for line in read(&paths.doc_info())? {
            let mut fields = line.split('\t');
            ids.push(fields.next().unwrap_or_default().to_string());
            labels.push(
                fields
                    .filter(|code| !code.is_empty())
                    .map(str::to_string)
                    .collect(),
            );
        }

        let path = paths.sentence_words();
        let sentence_words = read(&path)?
            .iter()
            .enumerate()
            .map(|(line, text)| {
                if text.is_empty() {
                    return Ok(Vec::new());
                }

                text.split('\t')
                    .map(|sentence| {
                        bag::parse(sentence).map_err(|reason| parse_error(&path, line, reason))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let raw_sentences = parse_raw_sentences(&paths.raw_sentences())?;

        let path = paths.sentence_info();
        let info_lines = read(&path)?;
        check_len(&path, sentence_words.len(), info_lines.len())?;
        let sentence_labels = info_lines
            .iter()
            .zip(&sentence_words)
            .enumerate()
            .map(|(line, (text, sentences))| {
                if sentences.is_empty() {
                    return match text.is_empty() {
                        true => Ok(Vec::new()),
                        false => Err(parse_error(
                            &path,
                            line,
                            "labels for a document without sentences",
                        )),
                    };
                }

                let fields: Vec<_> = text.split('\t').collect();
                if fields.len() != sentences.len() {
                    return Err(FormattingError::Misaligned {
                        path: path.clone(),
                        expected: sentences.len(),
                        found: fields.len(),
                    });
                }

                Ok(fields
                    .into_iter()
                    .map(|codes| codes.split_whitespace().map(str::to_string).collect())
                    .collect())
            })
            .collect::<Result<Vec<_>, _>>()?;

        let dataset = Self {
            ids,
            texts,
            words,
            labels,
            sentence_words,
            raw_sentences,
            sentence_labels,
            word_vocab,
            label_vocab,
        };

        dataset.check_alignment(paths)?;

        Ok(dataset)
    }

    fn check_alignment(&self, paths: &SplitPaths) -> Result<(), FormattingError> {
        let expected = self.ids.len();

        check_len(&paths.doc_info(), expected, self.labels.len())?;
        check_len(&paths.words(), expected, self.words.len())?;
        check_len(&paths.texts(), expected, self.texts.len())?;
        check_len(&paths.sentence_words(), expected, self.sentence_words.len())?;
        check_len(&paths.raw_sentences(), expected, self.raw_sentences.len())?;
        check_len(&paths.sentence_info(), expected, self.sentence_labels.len())?;

        for (words, raw) in self.sentence_words.iter().zip(&self.raw_sentences) {
            check_len(&paths.raw_sentences(), words.len(), raw.len())?;
        }

        Ok(())
    }
}

/// The label descriptor consumed by external multi-label tooling
fn label_descriptor(labels: &Vocabulary) -> Vec<String> {
    let mut lines = vec![
        r#"<?xml version="1.0" encoding="utf-8"?>"#.to_string(),
        r#"<labels xmlns="http://mulan.sourceforge.net/labels">"#.to_string(),
    ];
    lines.extend(
        labels
            .items()
            .iter()
            .map(|code| format!(r#"<label name="label_{}"></label>"#, code)),
    );
    lines.push("</labels>".to_string());

    lines
}

fn parse_raw_sentences(path: &Path) -> Result<Vec<Vec<String>>, FormattingError> {
    let lines = read(path)?;
    let mut documents = Vec::new();
    let mut cursor = 0;

    while cursor < lines.len() {
        let count: usize = lines[cursor]
            .trim()
            .parse()
            .map_err(|e| parse_error(path, cursor, format!("bad sentence count: {}", e)))?;

        let end = cursor + 1 + count;
        if end > lines.len() {
            return Err(parse_error(path, cursor, format!("expected {} sentences", count)));
        }

        documents.push(lines[cursor + 1..end].to_vec());
        cursor = end;
    }

    Ok(documents)
}

fn load_vocab(path: PathBuf) -> Result<Vocabulary, FormattingError> {
    let items = read(&path)?;

    Vocabulary::from_items(items).map_err(|source| FormattingError::Vocabulary { path, source })
}

fn read(path: &Path) -> Result<Vec<String>, FormattingError> {
    read_file(path).map_err(|source| FormattingError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write<I, S>(path: PathBuf, lines: I) -> Result<(), FormattingError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    write_file(&path, lines).map_err(|source| FormattingError::Io { path, source })
}

fn check_len(path: &Path, expected: usize, found: usize) -> Result<(), FormattingError> {
    if expected != found {
        return Err(FormattingError::Misaligned {
            path: path.to_path_buf(),
            expected,
            found,
        });
    }

    Ok(())
}

fn parse_error(path: &Path, line: usize, reason: impl ToString) -> FormattingError {
    FormattingError::Parse {
        path: path.to_path_buf(),
        line: line + 1,
        reason: reason.to_string(),
    }
}
