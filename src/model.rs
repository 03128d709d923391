//! Structured tab payloads as returned by the parsing service.
//!
//! The service answers either with a flat record or with the record wrapped
//! in a `tab` object; [`TabRecord::from_json`] accepts both shapes.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One chord label plus the blank columns that precede it.
///
/// `pre_spaces` is relative to the end of the previous token on the same line
/// (or column 0 for the first token). It stays signed so negative offsets
/// coming off the wire can be rejected instead of silently wrapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordToken {
    pub note: String,
    #[serde(default)]
    pub pre_spaces: i64,
}

impl ChordToken {
    pub fn new(note: impl Into<String>, pre_spaces: i64) -> Self {
        Self {
            note: note.into(),
            pre_spaces,
        }
    }
}

/// A single line of a tab: blank, lyric-only, chord-only, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chords: Option<Vec<ChordToken>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyric: Option<String>,
}

impl CombinedLine {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn lyric(text: impl Into<String>) -> Self {
        Self {
            chords: None,
            lyric: Some(text.into()),
        }
    }

    pub fn chords(tokens: Vec<ChordToken>) -> Self {
        Self {
            chords: Some(tokens),
            lyric: None,
        }
    }

    pub fn with_lyric(mut self, text: impl Into<String>) -> Self {
        self.lyric = Some(text.into());
        self
    }

    /// Chord tokens, or `None` when the line carries no chords. An empty list
    /// counts as no chords.
    pub fn chord_tokens(&self) -> Option<&[ChordToken]> {
        self.chords
            .as_deref()
            .filter(|tokens| !tokens.is_empty())
    }

    /// Lyric text, or `None` when absent or empty.
    pub fn lyric_text(&self) -> Option<&str> {
        self.lyric.as_deref().filter(|text| !text.is_empty())
    }

    pub fn is_blank(&self) -> bool {
        self.chord_tokens().is_none() && self.lyric_text().is_none()
    }
}

/// Grouped text block produced by the service's post-processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TabBlock {
    Lyrics { lyrics: Vec<String> },
    Tabs { tabs: Vec<String> },
    Error { error: String },
}

/// Payload returned by the service for one identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tuning: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<CombinedLine>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<TabBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tabs_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TabRecord {
    /// Decodes a service response body.
    pub fn from_json(body: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(body).context("response body is not valid JSON")?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self> {
        let value = match value {
            Value::Object(mut map) if is_wrapped(&map) => map.remove("tab").unwrap_or_default(),
            other => other,
        };
        serde_json::from_value(value).context("response body does not match the tab schema")
    }

    pub fn has_lines(&self) -> bool {
        !self.lines.is_empty()
    }

    /// Error reported by the service inside an otherwise successful response.
    pub fn backend_error(&self) -> Option<&str> {
        self.error.as_deref().or_else(|| {
            self.blocks.iter().find_map(|block| match block {
                TabBlock::Error { error } => Some(error.as_str()),
                _ => None,
            })
        })
    }
}

fn is_wrapped(map: &serde_json::Map<String, Value>) -> bool {
    map.get("tab").is_some_and(Value::is_object)
        && !map.contains_key("lines")
        && !map.contains_key("blocks")
}
