//! Utilities for rendering devotion meter badges from GitHub activity.
//!
//! The library fetches a user's per-day contribution counts over a date
//! window, reduces them into a devotion percentage, classifies the percentage
//! against an ordered tier table, and renders the result as an SVG badge or a
//! Markdown status block. The fetch, arithmetic, classification and rendering
//! stages are exposed separately so the transport and the output format can be
//! swapped independently and the arithmetic stays unit-testable without
//! network access.

mod artifact;
mod badge;
mod config;
mod contributions;
mod devotion;
mod error;
mod markdown;
pub mod retry;
mod tier;

pub use artifact::write_artifact;
pub use badge::{render_error_svg, render_svg, write_error_svg, write_svg_badge};
pub use config::{
    DEFAULT_BAR_LENGTH, ErrorPolicy, MeterConfig, MeterEntry, MeterSpec, OutputFormat,
    load_meters, parse_meters
};
pub use contributions::fetch_contributions;
pub use devotion::{
    ContributionMap, DevotionReport, DevotionStats, ObservationWindow, measure_devotion,
    measure_devotion_intraday
};
pub use error::{Error, artifact_io_error, io_error};
pub use markdown::{
    render_error_markdown, render_markdown, write_error_markdown, write_markdown_block
};
pub use tier::{TierSpec, TierTable};
