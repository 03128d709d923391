//! Rebuilds the stacked chord-over-lyric display of a tab.
//!
//! Chord offsets are relative: each token's `pre_spaces` counts blank columns
//! from the end of the previous token on the same line, not from column 0. A
//! chord row is therefore a left fold over its tokens with the row built so
//! far acting as the cursor. Rendering tokens independently, or out of order,
//! shifts every token after the first mistake.

use crate::error::TabError;
use crate::model::{ChordToken, CombinedLine};
use std::fmt;

/// Output rows for one input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    chord_row: Option<String>,
    lyric_row: Option<String>,
}

impl RenderedLine {
    pub fn chord_row(&self) -> Option<&str> {
        self.chord_row.as_deref()
    }

    pub fn lyric_row(&self) -> Option<&str> {
        self.lyric_row.as_deref()
    }

    /// The chord row, then the lyric row; a single empty row when neither
    /// exists.
    pub fn rows(&self) -> Vec<&str> {
        let rows: Vec<&str> = self
            .chord_row
            .iter()
            .chain(self.lyric_row.iter())
            .map(String::as_str)
            .collect();
        if rows.is_empty() {
            vec![""]
        } else {
            rows
        }
    }
}

/// Monospaced rendering of a whole tab, one [`RenderedLine`] per input line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBlock {
    lines: Vec<RenderedLine>,
}

impl TextBlock {
    pub fn lines(&self) -> &[RenderedLine] {
        &self.lines
    }

    pub fn rows(&self) -> Vec<&str> {
        self.lines.iter().flat_map(RenderedLine::rows).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl fmt::Display for TextBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, row) in self.rows().into_iter().enumerate() {
            if idx > 0 {
                f.write_str("\n")?;
            }
            f.write_str(row)?;
        }
        Ok(())
    }
}

/// Renders every line in order. Fails on the first malformed chord offset.
pub fn render(lines: &[CombinedLine]) -> Result<TextBlock, TabError> {
    let lines = lines
        .iter()
        .enumerate()
        .map(|(idx, line)| render_line(idx, line))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TextBlock { lines })
}

/// Renders one line; `line_index` is only used to locate errors.
pub fn render_line(line_index: usize, line: &CombinedLine) -> Result<RenderedLine, TabError> {
    let chord_row = line
        .chord_tokens()
        .map(|tokens| chord_row(line_index, tokens))
        .transpose()?;

    Ok(RenderedLine {
        chord_row,
        lyric_row: line.lyric_text().map(str::to_owned),
    })
}

/// Builds a standalone chord row. Errors report line 0.
pub fn render_chord_row(tokens: &[ChordToken]) -> Result<String, TabError> {
    chord_row(0, tokens)
}

pub(crate) fn chord_row(line: usize, tokens: &[ChordToken]) -> Result<String, TabError> {
    tokens
        .iter()
        .enumerate()
        .try_fold(String::new(), |mut row, (token_index, token)| {
            let gap = column_gap(line, token_index, token.pre_spaces)?;
            row.extend(std::iter::repeat(' ').take(gap));
            row.push_str(&token.note);
            Ok(row)
        })
}

fn column_gap(line: usize, token: usize, pre_spaces: i64) -> Result<usize, TabError> {
    usize::try_from(pre_spaces).map_err(|_| TabError::MalformedAlignment {
        line,
        token,
        pre_spaces,
    })
}
