// Listing: fetch every alias on the account, keep the rows matching the
// active flag and optional label pattern, and render them as a table.

use chrono::{Local, LocalResult, TimeZone};
use crossterm::style::Stylize;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::api::{ApiError, HideMyEmailApi};
use crate::envelope::{AliasList, AliasRecord};

const HEADERS: [&str; 4] = ["Label", "Hide my email", "Created Date Time", "IsActive"];

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("invalid search pattern")]
    InvalidPattern(#[from] regex::Error),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Which aliases to show.
#[derive(Debug, Clone)]
pub struct ListFilter {
    pub active: bool,
    pub search: Option<Regex>,
}

impl ListFilter {
    /// Build a filter. A blank search term disables the label match; any
    /// other term is compiled as typed.
    pub fn new(active: bool, search: Option<&str>) -> Result<Self, ListingError> {
        let search = match search {
            Some(term) if !term.trim().is_empty() => Some(Regex::new(term)?),
            _ => None,
        };
        Ok(ListFilter { active, search })
    }

    pub fn matches(&self, record: &AliasRecord) -> bool {
        record.is_active == self.active
            && self
                .search
                .as_ref()
                .map_or(true, |pattern| pattern.is_match(&record.label))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOutcome {
    Listed(Vec<AliasRecord>),
    /// The service rejected the call; the reason has already been logged.
    Failed(String),
}

/// Keep matching records, preserving their order.
pub fn filter_aliases(records: Vec<AliasRecord>, filter: &ListFilter) -> Vec<AliasRecord> {
    records.into_iter().filter(|r| filter.matches(r)).collect()
}

/// Fetch and filter the account's aliases.
pub async fn list_aliases<A: HideMyEmailApi>(
    api: &A,
    filter: &ListFilter,
) -> Result<ListOutcome, ListingError> {
    let result = match api.list_email().await?.into_result() {
        Ok(result) => result,
        Err(failure) => {
            debug!(reason = %failure.reason, "listing aliases failed");
            return Ok(ListOutcome::Failed(failure.reason));
        }
    };
    let list: AliasList = serde_json::from_value(result).map_err(ApiError::from)?;
    let total = list.hme_emails.len();
    let rows = filter_aliases(list.hme_emails, filter);
    debug!(total, shown = rows.len(), "aliases listed");
    Ok(ListOutcome::Listed(rows))
}

/// Epoch milliseconds as local wall-clock time.
pub fn format_timestamp(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis) {
        LocalResult::Single(t) | LocalResult::Ambiguous(t, _) => {
            t.format("%Y-%m-%d %H:%M:%S").to_string()
        }
        LocalResult::None => millis.to_string(),
    }
}

/// Render rows as a plain bordered table with a bold header line.
pub fn render_table(rows: &[AliasRecord]) -> String {
    let cells: Vec<[String; 4]> = rows
        .iter()
        .map(|r| {
            [
                r.label.clone(),
                r.hme.clone(),
                format_timestamp(r.create_timestamp),
                r.is_active.to_string(),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let border = {
        let parts: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
        format!("+{}+", parts.join("+"))
    };
    let line = |cols: [&str; 4], bold: bool| {
        let parts: Vec<String> = cols
            .iter()
            .zip(widths)
            .map(|(cell, width)| {
                let padded = format!(" {cell:<width$} ");
                if bold {
                    padded.bold().to_string()
                } else {
                    padded
                }
            })
            .collect();
        format!("|{}|", parts.join("|"))
    };

    let mut out = Vec::with_capacity(cells.len() + 4);
    out.push(border.clone());
    out.push(line(HEADERS, true));
    out.push(border.clone());
    for row in &cells {
        out.push(line(
            [row[0].as_str(), row[1].as_str(), row[2].as_str(), row[3].as_str()],
            false,
        ));
    }
    out.push(border);
    out.join("\n")
}
