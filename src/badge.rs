// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! SVG badge rendering for devotion reports.
//!
//! The badge is a 320x90 document with a full-width background track, a
//! foreground bar whose width is proportional to the devotion percentage, and
//! two text labels. Output is deterministic for a given report so artifacts
//! can be committed and diffed.

use std::{borrow::Cow, path::Path};

use crate::{artifact::write_artifact, devotion::DevotionReport, error::Error};

const SVG_WIDTH: u32 = 320;
const SVG_HEIGHT: u32 = 90;
const BAR_HEIGHT: u32 = 20;
/// Foreground bar spans 3 px per percentage point, capped at 300 px.
const MAX_BAR_WIDTH: u32 = 300;
const BAR_TRACK_COLOR: &str = "#eee";
const BAR_FILL_COLOR: &str = "#9333ea";
const TEXT_COLOR: &str = "#333";
const ERROR_FILL_COLOR: &str = "#6b7280";

/// Renders the devotion badge as an SVG document.
pub fn render_svg(report: &DevotionReport) -> String {
    use std::fmt::Write as _;

    let percentage = report.rounded_percentage();
    let bar_width = (u32::from(percentage) * 3).min(MAX_BAR_WIDTH);
    let escaped_tier = escape_xml(&report.tier.label);
    let aria = format!(
        "Devotion meter for {}: {}% over {} to {}",
        report.login,
        percentage,
        report.window.start(),
        report.window.end()
    );
    let escaped_aria = escape_xml(&aria);

    let mut buffer = String::with_capacity(512);
    let _ = writeln!(
        buffer,
        "<svg width=\"{SVG_WIDTH}\" height=\"{SVG_HEIGHT}\" xmlns=\"http://www.w3.org/2000/svg\" role=\"img\" aria-label=\"{escaped_aria}\">",
    );
    let _ = writeln!(
        buffer,
        "  <rect width=\"100%\" height=\"{BAR_HEIGHT}\" fill=\"{BAR_TRACK_COLOR}\" rx=\"10\"/>",
    );
    let _ = writeln!(
        buffer,
        "  <rect width=\"{bar_width}\" height=\"{BAR_HEIGHT}\" fill=\"{BAR_FILL_COLOR}\" rx=\"10\"/>",
    );
    let _ = writeln!(
        buffer,
        "  <text x=\"10\" y=\"50\" font-family=\"sans-serif\" font-size=\"14\" fill=\"{TEXT_COLOR}\">Devotion: {percentage}%</text>",
    );
    let _ = writeln!(
        buffer,
        "  <text x=\"10\" y=\"70\" font-family=\"sans-serif\" font-size=\"16\" fill=\"{BAR_FILL_COLOR}\">{escaped_tier}</text>",
    );
    buffer.push_str("</svg>\n");

    buffer
}

/// Renders an error badge substituted for the meter when a run fails.
pub fn render_error_svg(message: &str) -> String {
    use std::fmt::Write as _;

    let escaped = escape_xml(message);

    let mut buffer = String::with_capacity(384);
    let _ = writeln!(
        buffer,
        "<svg width=\"{SVG_WIDTH}\" height=\"{SVG_HEIGHT}\" xmlns=\"http://www.w3.org/2000/svg\" role=\"img\" aria-label=\"Devotion meter unavailable\">",
    );
    let _ = writeln!(
        buffer,
        "  <rect width=\"100%\" height=\"{BAR_HEIGHT}\" fill=\"{BAR_TRACK_COLOR}\" rx=\"10\"/>",
    );
    let _ = writeln!(
        buffer,
        "  <text x=\"10\" y=\"50\" font-family=\"sans-serif\" font-size=\"14\" fill=\"{ERROR_FILL_COLOR}\">Devotion meter unavailable</text>",
    );
    let _ = writeln!(
        buffer,
        "  <text x=\"10\" y=\"70\" font-family=\"sans-serif\" font-size=\"12\" fill=\"{ERROR_FILL_COLOR}\">{escaped}</text>",
    );
    buffer.push_str("</svg>\n");

    buffer
}

/// Writes the devotion badge to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`Error::ArtifactIo`](Error::ArtifactIo) when the file cannot be
/// written.
pub fn write_svg_badge(report: &DevotionReport, path: &Path) -> Result<(), Error> {
    write_artifact(path, &render_svg(report))
}

/// Writes an error badge to `path`, creating parent directories.
///
/// # Errors
///
/// Returns [`Error::ArtifactIo`](Error::ArtifactIo) when the file cannot be
/// written.
pub fn write_error_svg(message: &str, path: &Path) -> Result<(), Error> {
    write_artifact(path, &render_error_svg(message))
}

fn escape_xml(value: &str) -> Cow<'_, str> {
    if value
        .chars()
        .any(|character| matches!(character, '&' | '<' | '>' | '\"' | '\''))
    {
        let mut escaped = String::with_capacity(value.len());
        for character in value.chars() {
            match character {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '\"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&apos;"),
                other => escaped.push(other)
            }
        }
        Cow::Owned(escaped)
    } else {
        Cow::Borrowed(value)
    }
}
