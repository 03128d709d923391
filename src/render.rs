//! Text rendering of structured tab data: the stacked chord/lyric display and
//! the lyric-only, chord-only and export views.

pub mod alignment;
pub mod views;

pub use alignment::{render, render_chord_row, render_line, RenderedLine, TextBlock};
pub use views::{
    clean_lines, display_text, download_filename, export_text, split_views, SplitViews,
};
