// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Tier classification for devotion percentages.
//!
//! A tier table is a fixed ordered list of `(threshold, label)` pairs.
//! Classification selects the label of the greatest threshold that the
//! percentage qualifies for, so increasing percentages can never demote the
//! selected tier.

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Single entry of a tier table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierSpec {
    /// Minimum devotion percentage required to reach this tier.
    pub threshold: u8,
    /// Label shown on the rendered artifact.
    pub label:     String
}

/// Ordered threshold table evaluated highest-qualifying-bucket-first.
///
/// Invariants enforced at construction:
/// - the table is non-empty,
/// - the first threshold is 0 so every percentage has a bucket,
/// - thresholds are strictly increasing and never exceed 100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TierSpec>", into = "Vec<TierSpec>")]
pub struct TierTable {
    tiers: Vec<TierSpec>
}

impl TryFrom<Vec<TierSpec>> for TierTable {
    type Error = Error;

    /// Deserialized tables pass through the same validation as constructed
    /// ones.
    fn try_from(tiers: Vec<TierSpec>) -> Result<Self, Self::Error> {
        Self::new(tiers)
    }
}

impl From<TierTable> for Vec<TierSpec> {
    fn from(table: TierTable) -> Self {
        table.tiers
    }
}

impl TierTable {
    /// Builds a validated tier table from the provided entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] when the table is empty, does not start
    /// at threshold 0, contains a threshold above 100, or thresholds are not
    /// strictly increasing.
    pub fn new(tiers: Vec<TierSpec>) -> Result<Self, Error> {
        let first = tiers
            .first()
            .ok_or_else(|| Error::validation("tier table must not be empty"))?;

        if first.threshold != 0 {
            return Err(Error::validation(format!(
                "tier table must start at threshold 0, found {}",
                first.threshold
            )));
        }

        for pair in tiers.windows(2) {
            if pair[1].threshold <= pair[0].threshold {
                return Err(Error::validation(format!(
                    "tier thresholds must be strictly increasing, found {} after {}",
                    pair[1].threshold, pair[0].threshold
                )));
            }
        }

        if let Some(last) = tiers.last()
            && last.threshold > 100
        {
            return Err(Error::validation(format!(
                "tier threshold {} exceeds 100",
                last.threshold
            )));
        }

        Ok(Self {
            tiers
        })
    }

    /// Selects the tier for the provided devotion percentage.
    ///
    /// The percentage is clamped to `[0, 100]` before the lookup, so the
    /// function always yields a tier for finite inputs.
    pub fn classify(&self, percentage: f64) -> &TierSpec {
        &self.tiers[self.bucket_index(percentage)]
    }

    /// Returns the index of the selected bucket for the percentage.
    ///
    /// Exposed for monotonicity checks: for `a <= b`,
    /// `bucket_index(a) <= bucket_index(b)`.
    pub fn bucket_index(&self, percentage: f64) -> usize {
        let clamped = percentage.clamp(0.0, 100.0);

        self.tiers
            .iter()
            .rposition(|tier| f64::from(tier.threshold) <= clamped)
            .unwrap_or(0)
    }

    /// Provides read access to the ordered entries.
    pub fn entries(&self) -> &[TierSpec] {
        &self.tiers
    }
}

impl Default for TierTable {
    /// The devotion ladder shipped with the original meter.
    fn default() -> Self {
        let tiers = [
            (0, "💧 Deckhand in Denial"),
            (20, "⚒️ Cuddlesmith Apprentice"),
            (40, "⚡ Electro Admirer"),
            (60, "🔥 Passionate First Mate"),
            (80, "🌩️ Stormbound Soulmate"),
            (100, "👑 Devotion Eternal")
        ]
        .into_iter()
        .map(|(threshold, label)| TierSpec {
            threshold,
            label: label.to_owned()
        })
        .collect();

        Self::new(tiers).expect("default tier table is valid")
    }
}
