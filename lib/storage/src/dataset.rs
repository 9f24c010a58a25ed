//! Contrastive pair datasets
//!
//! Two JSON layouts are accepted:
//!
//! ```json
//! {"contrastive_pairs": [{"prompt": "...", "love_response": "...", "hate_response": "..."}]}
//! ```
//!
//! ```json
//! [{"positive_text": "...", "negative_text": "..."}]
//! ```
//!
//! Files ending in `.csv` are read by header instead: either
//! `love_response,hate_response` (with an optional `prompt` column), or
//! `text1,text2,label` where rows labelled above 0.5 give positives from
//! `text1`, rows labelled below 0.5 give negatives from `text2`, and the two
//! lists are paired in order and cut to the shorter one.
//!
//! Texts are trimmed. Pairs where either side is not strictly between
//! [`MIN_TEXT_CHARS`] and [`MAX_TEXT_CHARS`] characters are dropped.

use serde::Deserialize;
use std::path::Path;
use steerx_core::{ContrastiveExample, Error, Result};
use tracing::{info, warn};

pub const MIN_TEXT_CHARS: usize = 10;
pub const MAX_TEXT_CHARS: usize = 500;

#[derive(Debug, Deserialize)]
struct PromptedPair {
    #[serde(default)]
    prompt: String,
    #[serde(default)]
    love_response: String,
    #[serde(default)]
    hate_response: String,
}

#[derive(Debug, Deserialize)]
struct PlainPair {
    positive_text: String,
    negative_text: String,
}

#[derive(Debug, Deserialize)]
struct LabeledRow {
    text1: String,
    text2: String,
    label: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Document {
    Prompted { contrastive_pairs: Vec<PromptedPair> },
    Plain(Vec<PlainPair>),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DatasetOptions {
    /// Also emit each prompted pair with the prompt prepended to both sides.
    pub with_prompt_context: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PairDataset {
    pub examples: Vec<ContrastiveExample>,
    /// Rows rejected by the length filter.
    pub dropped: usize,
}

impl PairDataset {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with(path, DatasetOptions::default())
    }

    pub fn load_with<P: AsRef<Path>>(path: P, options: DatasetOptions) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        let dataset = if is_csv {
            Self::parse_csv(&data, options)?
        } else {
            Self::parse(&data, options)?
        };
        info!(
            path = %path.display(),
            pairs = dataset.examples.len(),
            dropped = dataset.dropped,
            "loaded contrastive pairs"
        );
        Ok(dataset)
    }

    /// Parse a JSON document.
    pub fn parse(data: &str, options: DatasetOptions) -> Result<Self> {
        let raw: Vec<RawPair> = match serde_json::from_str(data)? {
            Document::Prompted { contrastive_pairs } => contrastive_pairs
                .into_iter()
                .map(|p| (p.love_response, p.hate_response, Some(p.prompt)))
                .collect(),
            Document::Plain(pairs) => pairs
                .into_iter()
                .map(|p| (p.positive_text, p.negative_text, None))
                .collect(),
        };
        Ok(Self::filter(raw, options))
    }

    /// Parse a CSV document, picking the layout from its header row.
    pub fn parse_csv(data: &str, options: DatasetOptions) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::Headers).from_reader(data.as_bytes());
        let headers = reader.headers().map_err(csv_error)?.clone();
        let has = |column: &str| headers.iter().any(|h| h == column);

        let raw: Vec<RawPair> = if has("love_response") && has("hate_response") {
            reader
                .deserialize::<PromptedPair>()
                .map(|row| row.map(|p| (p.love_response, p.hate_response, Some(p.prompt))))
                .collect::<std::result::Result<_, _>>()
                .map_err(csv_error)?
        } else if has("text1") && has("text2") && has("label") {
            let rows: Vec<LabeledRow> = reader
                .deserialize()
                .collect::<std::result::Result<_, _>>()
                .map_err(csv_error)?;
            let mut positives = Vec::new();
            let mut negatives = Vec::new();
            for row in rows {
                if row.label > 0.5 {
                    positives.push(row.text1);
                } else if row.label < 0.5 {
                    negatives.push(row.text2);
                }
            }
            positives
                .into_iter()
                .zip(negatives)
                .map(|(positive, negative)| (positive, negative, None))
                .collect()
        } else {
            return Err(Error::Serialization(
                "unrecognized CSV layout: expected love_response,hate_response or text1,text2,label columns"
                    .to_string(),
            ));
        };
        Ok(Self::filter(raw, options))
    }

    fn filter(raw: Vec<RawPair>, options: DatasetOptions) -> Self {
        let mut dataset = PairDataset::default();
        for (positive, negative, prompt) in raw {
            let positive = positive.trim();
            let negative = negative.trim();
            if !acceptable(positive) || !acceptable(negative) {
                dataset.dropped += 1;
                continue;
            }

            dataset.examples.push(ContrastiveExample::new(positive, negative));
            if let Some(prompt) = prompt.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
                if options.with_prompt_context {
                    dataset.examples.push(ContrastiveExample::new(
                        format!("{prompt} {positive}"),
                        format!("{prompt} {negative}"),
                    ));
                }
            }
        }

        if dataset.dropped > 0 {
            warn!(
                dropped = dataset.dropped,
                min = MIN_TEXT_CHARS,
                max = MAX_TEXT_CHARS,
                "dropped contrastive pairs outside the length limits"
            );
        }
        dataset
    }
}

/// Positive text, negative text, optional prompt.
type RawPair = (String, String, Option<String>);

fn csv_error(e: csv::Error) -> Error {
    Error::Serialization(format!("reading CSV pairs: {e}"))
}

fn acceptable(text: &str) -> bool {
    let chars = text.chars().count();
    chars > MIN_TEXT_CHARS && chars < MAX_TEXT_CHARS
}
