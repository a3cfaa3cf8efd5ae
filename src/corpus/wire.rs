//! The JSON wire format: `{doc_id: [[text, [[annotator, frame, round], ...]], ...]}`, where a
//! document may also be an object carrying its sentence list under `sentences`.

use std::{collections::BTreeMap, fmt};

use serde::{
    de::{MapAccess, Visitor},
    Deserialize, Deserializer,
};
use serde_json::Value;

use super::{Annotation, CorpusParseError, Document, Sentence};

/// Document entries in file order. Duplicate keys are kept so they can be reported.
pub(super) struct RawCorpus(pub(super) Vec<(String, Value)>);

impl<'de> Deserialize<'de> for RawCorpus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawCorpus;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object keyed by document ID")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawCorpus, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));

                while let Some(entry) = map.next_entry::<String, Value>()? {
                    entries.push(entry);
                }

                Ok(RawCorpus(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

#[derive(Deserialize)]
struct RawRecord {
    sentences: Vec<Value>,

    #[serde(default)]
    filename: Option<String>,

    #[serde(default)]
    irrelevant: Option<BTreeMap<String, i64>>,

    #[serde(default, rename = "xml_file")]
    xml_files: Option<Vec<String>>,
}

pub(super) fn parse_document(id: &str, value: Value) -> Result<Document, CorpusParseError> {
    match value {
        Value::Array(sentences) => {
            Ok(Document::new(id.to_string(), parse_sentences(id, sentences)?))
        }
        Value::Object(_) => {
            let record: RawRecord =
                serde_json::from_value(value).map_err(|e| CorpusParseError::document(id, e))?;

            let sentences = parse_sentences(id, record.sentences)?;
            let mut document = Document::new(id.to_string(), sentences);
            document.filename = record.filename;
            document.irrelevant = record.irrelevant.unwrap_or_default();
            document.xml_files = record.xml_files.unwrap_or_default();

            Ok(document)
        }
        other => Err(CorpusParseError::document(
            id,
            format!("expected a sentence list or a document object, found {}", other),
        )),
    }
}

fn parse_sentences(id: &str, sentences: Vec<Value>) -> Result<Vec<Sentence>, CorpusParseError> {
    sentences
        .into_iter()
        .enumerate()
        .map(|(position, value)| parse_sentence(id, position, value))
        .collect()
}

fn parse_sentence(id: &str, position: usize, value: Value) -> Result<Sentence, CorpusParseError> {
    let (text, annotations): (String, Option<Vec<Value>>) =
        serde_json::from_value(value).map_err(|e| CorpusParseError::Sentence {
            id: id.to_string(),
            sentence: position,
            reason: e.to_string(),
        })?;

    let annotations = annotations
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            parse_annotation(value).map_err(|reason| CorpusParseError::Annotation {
                id: id.to_string(),
                sentence: position,
                annotation: index,
                reason,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Sentence::new(text, annotations))
}

fn parse_annotation(value: Value) -> Result<Annotation, String> {
    let (annotator, frame, round): (String, f64, f64) =
        serde_json::from_value(value).map_err(|e| e.to_string())?;

    if !frame.is_finite() {
        return Err(format!("frame {} is not a finite number", frame));
    }

    if !round.is_finite() || round.fract() != 0.0 {
        return Err(format!("round {} is not an integer", round));
    }

    Ok(Annotation::new(annotator, frame, round as i64))
}
