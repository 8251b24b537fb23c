// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Contribution calendar fetching for a single GitHub login.
//!
//! Issues one GraphQL query against the contributions collection and flattens
//! the returned calendar weeks into a per-day count map.

use chrono::NaiveDate;
use masterror::AppError;
use octocrab::Octocrab;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    devotion::{ContributionMap, ObservationWindow},
    error::Error,
    retry::{RetryConfig, retry_with_backoff},
};

/// GraphQL query returning one `(date, contributionCount)` pair per day.
const CONTRIBUTIONS_QUERY: &str = r"
query($login: String!, $from: DateTime!, $to: DateTime!) {
  user(login: $login) {
    contributionsCollection(from: $from, to: $to) {
      contributionCalendar {
        weeks {
          contributionDays {
            date
            contributionCount
          }
        }
      }
    }
  }
}
";

/// Top-level GraphQL response envelope.
#[derive(Debug, Deserialize,)]
struct ContributionsEnvelope
{
    data:   Option<ContributionsData,>,
    errors: Option<Vec<GraphQlIssue,>,>,
}

/// Error entry carried by a 200 response with an `errors` payload.
#[derive(Debug, Deserialize,)]
struct GraphQlIssue
{
    message: String,
}

#[derive(Debug, Deserialize,)]
struct ContributionsData
{
    user: Option<UserNode,>,
}

#[derive(Debug, Deserialize,)]
#[serde(rename_all = "camelCase")]
struct UserNode
{
    contributions_collection: ContributionsCollection,
}

#[derive(Debug, Deserialize,)]
#[serde(rename_all = "camelCase")]
struct ContributionsCollection
{
    contribution_calendar: ContributionCalendar,
}

#[derive(Debug, Deserialize,)]
#[serde(rename_all = "camelCase")]
struct ContributionCalendar
{
    weeks: Vec<CalendarWeek,>,
}

#[derive(Debug, Deserialize,)]
#[serde(rename_all = "camelCase")]
struct CalendarWeek
{
    contribution_days: Vec<CalendarDay,>,
}

#[derive(Debug, Deserialize,)]
#[serde(rename_all = "camelCase")]
struct CalendarDay
{
    date:               String,
    contribution_count: u32,
}

/// Fetches per-day contribution counts for the login over the window.
///
/// # Arguments
///
/// * `octocrab` - Authenticated Octocrab client
/// * `login` - GitHub login whose calendar is queried
/// * `window` - Inclusive date window, already validated against today
/// * `retry_config` - Retry configuration for the API call
///
/// # Errors
///
/// Returns [`Error::Fetch`] when the transport call fails after retries, the
/// response carries an explicit `errors` payload, or the expected fields are
/// absent. Days with unparsable date strings are skipped with a warning.
///
/// # Example
///
/// ```no_run
/// use chrono::NaiveDate;
/// use devmeter::{ObservationWindow, fetch_contributions, retry::RetryConfig};
/// use octocrab::Octocrab;
///
/// # async fn example() -> Result<(), devmeter::Error> {
/// let octocrab = Octocrab::builder()
///     .personal_token("token",)
///     .build()
///     .map_err(|e| devmeter::Error::fetch(format!("failed to build client: {e}"),),)?;
/// let window = ObservationWindow::new(
///     NaiveDate::from_ymd_opt(2025, 7, 5,).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 7, 14,).unwrap(),
/// )?;
/// let map = fetch_contributions(&octocrab, "octocat", &window, &RetryConfig::default(),).await?;
/// println!("{} days with data", map.len());
/// # Ok(())
/// # }
/// ```
pub async fn fetch_contributions(
    octocrab: &Octocrab,
    login: &str,
    window: &ObservationWindow,
    retry_config: &RetryConfig,
) -> Result<ContributionMap, Error,>
{
    debug!("Fetching contribution calendar for {} over {} -> {}", login, window.start(), window.end());

    let payload = serde_json::json!({
        "query": CONTRIBUTIONS_QUERY,
        "variables": {
            "login": login,
            "from": format!("{}T00:00:00Z", window.start()),
            "to": format!("{}T23:59:59Z", window.end()),
        },
    });

    let octocrab_clone = octocrab.clone();
    let payload_clone = payload.clone();

    let envelope: ContributionsEnvelope = retry_with_backoff(
        retry_config,
        &format!("contribution calendar for {}", login),
        || {
            let octocrab = octocrab_clone.clone();
            let payload = payload_clone.clone();
            async move {
                octocrab.graphql(&payload,).await.map_err(|e| {
                    AppError::service(format!("contribution query failed: {e}"),)
                },)
            }
        },
    )
    .await?;

    let map = decode_calendar(envelope, login,)?;

    info!("Fetched contribution counts for {} days for {}", map.len(), login);

    Ok(map,)
}

/// Flattens a response envelope into the per-day count map.
fn decode_calendar(
    envelope: ContributionsEnvelope,
    login: &str,
) -> Result<ContributionMap, Error,>
{
    if let Some(issues,) = envelope.errors
        && !issues.is_empty()
    {
        let messages: Vec<String,> = issues.into_iter().map(|issue| issue.message,).collect();
        return Err(Error::fetch(format!(
            "contribution query returned errors: {}",
            messages.join("; ")
        ),),);
    }

    let user = envelope
        .data
        .and_then(|data| data.user,)
        .ok_or_else(|| Error::fetch(format!("no contribution data returned for '{login}'"),),)?;

    let mut map = ContributionMap::new();

    for week in user.contributions_collection.contribution_calendar.weeks {
        for day in week.contribution_days {
            let Ok(date,) = NaiveDate::parse_from_str(&day.date, "%Y-%m-%d",) else {
                warn!("Skipping unparsable contribution date {:?}", day.date);
                continue;
            };

            let entry = map.entry(date,).or_insert(0,);
            *entry = entry.saturating_add(day.contribution_count,);
        }
    }

    Ok(map,)
}
