// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Markdown status block rendering for devotion reports.
//!
//! Produces a block with a Unicode block-glyph progress bar, the selected
//! tier, the window bounds and a generation timestamp, suitable for embedding
//! in a README or profile page.

use std::path::Path;

use crate::{artifact::write_artifact, devotion::DevotionReport, error::Error};

const FILLED_GLYPH: char = '█';
const EMPTY_GLYPH: char = '░';

/// Renders the devotion status block as Markdown.
pub fn render_markdown(report: &DevotionReport, bar_length: usize) -> String {
    let percentage = report.rounded_percentage();
    let bar = progress_bar(report.stats.percentage, bar_length);

    format!(
        "## Devotion meter\n\n\
         **{login}** · {start} → {end}\n\n\
         `{bar}` **{percentage}%**\n\n\
         **Tier:** {tier}\n\n\
         _{committed} of {total} days committed · generated {timestamp}_\n",
        login = report.login,
        start = report.window.start(),
        end = report.window.end(),
        bar = bar,
        percentage = percentage,
        tier = report.tier.label,
        committed = report.stats.committed_days,
        total = report.stats.total_days,
        timestamp = report.generated_at.format("%Y-%m-%d %H:%M UTC")
    )
}

/// Renders an error status block substituted for the meter when a run fails.
pub fn render_error_markdown(message: &str) -> String {
    format!(
        "## Devotion meter\n\n**Status:** unavailable\n\n> {message}\n"
    )
}

/// Writes the devotion status block to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`Error::ArtifactIo`](Error::ArtifactIo) when the file cannot be
/// written.
pub fn write_markdown_block(
    report: &DevotionReport,
    bar_length: usize,
    path: &Path
) -> Result<(), Error> {
    write_artifact(path, &render_markdown(report, bar_length))
}

/// Writes an error status block to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`Error::ArtifactIo`](Error::ArtifactIo) when the file cannot be
/// written.
pub fn write_error_markdown(message: &str, path: &Path) -> Result<(), Error> {
    write_artifact(path, &render_error_markdown(message))
}

/// Builds the block-glyph bar: `round(percentage / 100 × bar_length)` filled
/// glyphs, the remainder empty.
fn progress_bar(percentage: f64, bar_length: usize) -> String {
    let clamped = percentage.clamp(0.0, 100.0);
    let filled = ((clamped / 100.0) * bar_length as f64).round() as usize;
    let filled = filled.min(bar_length);

    let mut bar = String::with_capacity(bar_length * FILLED_GLYPH.len_utf8());
    for _ in 0..filled {
        bar.push(FILLED_GLYPH);
    }
    for _ in filled..bar_length {
        bar.push(EMPTY_GLYPH);
    }

    bar
}
