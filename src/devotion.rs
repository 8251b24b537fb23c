// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Devotion arithmetic over per-day contribution counts.
//!
//! Reduces a contribution map into a single percentage: the fraction of days
//! inside an inclusive observation window with at least one recorded
//! contribution, expressed 0-100 and clamped at both ends.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::Serialize;

use crate::{error::Error, tier::{TierSpec, TierTable}};

/// Per-day contribution counts keyed by calendar date, one entry per day.
pub type ContributionMap = BTreeMap<NaiveDate, u32>;

/// Seconds in a civil day, used for intraday progress fractions.
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Inclusive date window over which devotion is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObservationWindow {
    start: NaiveDate,
    end:   NaiveDate
}

impl ObservationWindow {
    /// Builds a window spanning `start..=end`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, Error> {
        if start > end {
            return Err(Error::validation(format!(
                "window start {start} is after window end {end}"
            )));
        }

        Ok(Self {
            start,
            end
        })
    }

    /// Resolves a window from configuration values against the current date.
    ///
    /// A missing end date defaults to `today`. The constraint
    /// `start <= end <= today` is enforced here, before any network activity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the end date lies in the future or
    /// precedes the start date.
    pub fn resolve(
        start: NaiveDate,
        end: Option<NaiveDate>,
        today: NaiveDate
    ) -> Result<Self, Error> {
        let end = end.unwrap_or(today);

        if end > today {
            return Err(Error::validation(format!(
                "window end {end} lies in the future (today is {today})"
            )));
        }

        Self::new(start, end)
    }

    /// First day of the window.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the window.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether the provided date falls inside the window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of whole days covered, inclusive of both ends, never below 1.
    pub fn total_days(&self) -> u32 {
        let days = (self.end - self.start).num_days() + 1;
        u32::try_from(days.max(1)).unwrap_or(1)
    }
}

/// Result of reducing a contribution map over an observation window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DevotionStats {
    /// Days inside the window with at least one recorded contribution.
    pub committed_days: u32,
    /// Whole days in the window, floored at 1.
    pub total_days:     u32,
    /// Devotion percentage in `[0, 100]`.
    pub percentage:     f64
}

impl DevotionStats {
    /// Derives clamped stats from raw day counts.
    ///
    /// Clamping holds even when `committed` exceeds `total` due to upstream
    /// data inconsistency, and a zero `total` is floored to 1 so the ratio is
    /// always defined.
    pub fn from_counts(committed: u32, total: u32) -> Self {
        let total = total.max(1);
        let percentage =
            (f64::from(committed) / f64::from(total) * 100.0).clamp(0.0, 100.0);

        Self {
            committed_days: committed,
            total_days: total,
            percentage
        }
    }

    fn from_fractional(committed: u32, fraction: f64, total: u32) -> Self {
        let total = total.max(1);
        let effective = f64::from(committed) + fraction.clamp(0.0, 1.0);
        let percentage = (effective / f64::from(total) * 100.0).clamp(0.0, 100.0);

        Self {
            committed_days: committed,
            total_days: total,
            percentage
        }
    }
}

impl std::fmt::Display for DevotionStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} days ({:.1}%)",
            self.committed_days, self.total_days, self.percentage
        )
    }
}

/// Measures binary-day devotion over the window.
///
/// A day is committed iff its recorded count is greater than 0; days absent
/// from the map are zero-activity days, not missing data. Map entries outside
/// the window are ignored.
pub fn measure_devotion(map: &ContributionMap, window: &ObservationWindow) -> DevotionStats {
    let committed = committed_days(map, window);
    DevotionStats::from_counts(committed, window.total_days())
}

/// Measures devotion with same-day partial progress.
///
/// Identical to [`measure_devotion`] except when the window ends on the
/// current day and that day has no recorded contribution yet: the current day
/// then contributes the elapsed fraction of the day instead of 0, so the
/// meter drains gradually rather than dropping a full day at UTC midnight.
pub fn measure_devotion_intraday(
    map: &ContributionMap,
    window: &ObservationWindow,
    now: DateTime<Utc>
) -> DevotionStats {
    let committed = committed_days(map, window);
    let today = now.date_naive();

    let today_uncommitted =
        window.end() == today && map.get(&today).copied().unwrap_or(0) == 0;

    if !today_uncommitted {
        return DevotionStats::from_counts(committed, window.total_days());
    }

    let elapsed = f64::from(now.num_seconds_from_midnight()) / SECONDS_PER_DAY;
    DevotionStats::from_fractional(committed, elapsed, window.total_days())
}

fn committed_days(map: &ContributionMap, window: &ObservationWindow) -> u32 {
    let counted = map
        .range(window.start()..=window.end())
        .filter(|(_, count)| **count > 0)
        .count();

    u32::try_from(counted).unwrap_or(u32::MAX)
}

/// Fully classified measurement ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DevotionReport {
    /// Login the contributions were fetched for.
    pub login:        String,
    /// Window the stats were measured over.
    pub window:       ObservationWindow,
    /// Reduced devotion stats.
    pub stats:        DevotionStats,
    /// Tier selected for the percentage.
    pub tier:         TierSpec,
    /// Timestamp the report was produced at.
    pub generated_at: DateTime<Utc>
}

impl DevotionReport {
    /// Assembles a report by classifying the stats against the tier table.
    ///
    /// Classification uses the whole-point percentage the renderers display,
    /// so the selected tier never contradicts the number on the artifact.
    pub fn new(
        login: impl Into<String>,
        window: ObservationWindow,
        stats: DevotionStats,
        table: &TierTable,
        generated_at: DateTime<Utc>
    ) -> Self {
        let tier = table.classify(rounded(stats.percentage)).clone();

        Self {
            login: login.into(),
            window,
            stats,
            tier,
            generated_at
        }
    }

    /// Percentage rounded to the nearest whole point for display.
    pub fn rounded_percentage(&self) -> u8 {
        rounded(self.stats.percentage) as u8
    }
}

fn rounded(percentage: f64) -> f64 {
    percentage.round().clamp(0.0, 100.0)
}
