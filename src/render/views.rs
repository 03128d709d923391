//! Lyric-only and chord-only text views plus the plain-text export.

use super::alignment::{chord_row, render};
use crate::error::TabError;
use crate::model::{CombinedLine, TabBlock, TabRecord};

const DEFAULT_FILENAME: &str = "tab-content";

/// Row-aligned lyric and chord views of the same tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitViews {
    pub lyrics: Vec<String>,
    pub tabs: Vec<String>,
}

/// Splits lines into a lyrics column and a chords column of equal length.
///
/// Each input line contributes one row to both columns. A lyric line fills the
/// lyrics row and leaves the chords row blank, even when it also carries
/// chords; a chord-only line fills the chords row. Trailing rows whose lyric is
/// blank are dropped from both columns, chords included.
pub fn split_views(lines: &[CombinedLine]) -> Result<SplitViews, TabError> {
    let mut views = SplitViews::default();

    for (idx, line) in lines.iter().enumerate() {
        let (lyric, tabs) = match (line.lyric_text(), line.chord_tokens()) {
            (Some(lyric), _) => (lyric.to_owned(), String::new()),
            (None, Some(tokens)) => (String::new(), chord_row(idx, tokens)?),
            (None, None) => (String::new(), String::new()),
        };
        views.lyrics.push(lyric);
        views.tabs.push(tabs);
    }

    while views.lyrics.last().is_some_and(|lyric| is_blank(lyric)) {
        views.lyrics.pop();
        views.tabs.pop();
    }

    Ok(views)
}

/// Collapses runs of blank lines to a single blank and strips blank lines
/// from both ends.
pub fn clean_lines<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::with_capacity(lines.len());
    let mut prev_blank = false;

    for line in lines {
        let line = line.as_ref();
        let blank = is_blank(line);
        if blank && prev_blank {
            continue;
        }
        cleaned.push(line.to_owned());
        prev_blank = blank;
    }

    let start = cleaned
        .iter()
        .position(|line| !is_blank(line))
        .unwrap_or(cleaned.len());
    let end = cleaned
        .iter()
        .rposition(|line| !is_blank(line))
        .map_or(start, |idx| idx + 1);
    cleaned.drain(start..end).collect()
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn join_cleaned<S: AsRef<str>>(lines: &[S]) -> String {
    clean_lines(lines).join("\n")
}

impl TabRecord {
    /// Lyrics text: the service's joined text when present, otherwise derived
    /// from the grouped blocks, otherwise from the line data.
    pub fn lyrics_view(&self) -> Result<String, TabError> {
        if let Some(text) = &self.lyrics_text {
            return Ok(text.clone());
        }
        if let Some(lines) = self.collect_blocks(|block| match block {
            TabBlock::Lyrics { lyrics } => Some(lyrics),
            _ => None,
        }) {
            return Ok(join_cleaned(lines.as_slice()));
        }
        Ok(join_cleaned(split_views(&self.lines)?.lyrics.as_slice()))
    }

    /// Chords text, resolved the same way as [`Self::lyrics_view`].
    pub fn tabs_view(&self) -> Result<String, TabError> {
        if let Some(text) = &self.tabs_text {
            return Ok(text.clone());
        }
        if let Some(lines) = self.collect_blocks(|block| match block {
            TabBlock::Tabs { tabs } => Some(tabs),
            _ => None,
        }) {
            return Ok(join_cleaned(lines.as_slice()));
        }
        Ok(join_cleaned(split_views(&self.lines)?.tabs.as_slice()))
    }

    fn collect_blocks<'a, F>(&'a self, select: F) -> Option<Vec<&'a str>>
    where
        F: Fn(&'a TabBlock) -> Option<&'a Vec<String>>,
    {
        let mut found = false;
        let mut lines = Vec::new();
        for rows in self.blocks.iter().filter_map(select) {
            found = true;
            lines.extend(rows.iter().map(String::as_str));
        }
        found.then_some(lines)
    }
}

/// Plain-text download body: lyrics, a blank separator line, then chords.
pub fn export_text(record: &TabRecord) -> Result<String, TabError> {
    let lyrics = record.lyrics_view()?;
    let tabs = record.tabs_view()?;

    let mut content = lyrics;
    if !content.is_empty() && !tabs.is_empty() {
        content.push_str("\n\n");
    }
    content.push_str(&tabs);
    Ok(content)
}

/// Printable text for a record: the stacked chord-over-lyric rendering when
/// the record carries `lines`, otherwise [`export_text`].
pub fn display_text(record: &TabRecord) -> Result<String, TabError> {
    if record.has_lines() {
        return Ok(render(&record.lines)?.to_string());
    }
    export_text(record)
}

/// Filename for an exported tab, built from the last two path segments of the
/// identifier.
pub fn download_filename(identifier: &str) -> String {
    let parts: Vec<&str> = identifier.split('/').collect();
    let stem = if parts.len() > 2 {
        parts[parts.len() - 2..].join("-")
    } else {
        DEFAULT_FILENAME.to_owned()
    };
    format!("{stem}.txt")
}
