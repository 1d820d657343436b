// SPDX-License-Identifier: MIT

//! Shared helpers for date/time handling.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::error::AppError;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// The server's canonical "today": the current UTC calendar date.
///
/// Clients whose local day boundary differs pass their date explicitly.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parse a YYYY-MM-DD date supplied by a client.
pub fn parse_client_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::BadRequest(format!("Invalid date '{}': expected YYYY-MM-DD", raw)))
}
