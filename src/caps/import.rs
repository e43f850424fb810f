//! CSV usage import
//!
//! Reads `email,credits_used` rows exported from team analytics. Other
//! columns are ignored.

use std::io::Read;

use thiserror::Error;
use tracing::debug;

use crate::caps::calculator::UsageRow;

const EMAIL_COLUMN: &str = "email";
const CREDITS_COLUMN: &str = "credits_used";

/// Largest credit count accepted from a usage export, in either direction
pub const MAX_CREDITS: i64 = 1_000_000_000_000;

/// Errors raised while reading a usage CSV
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV must have 'email' and 'credits_used' columns")]
    MissingColumns,

    #[error("Invalid credits_used {value:?} for {email} on line {line}")]
    InvalidCredits {
        line: u64,
        email: String,
        value: String,
    },

    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Parse usage rows, keeping file order
pub fn parse_usage_csv<R: Read>(reader: R) -> Result<Vec<UsageRow>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim_start_matches('\u{feff}') == name)
    };
    let (email_idx, credits_idx) = match (column(EMAIL_COLUMN), column(CREDITS_COLUMN)) {
        (Some(e), Some(c)) => (e, c),
        _ => return Err(ImportError::MissingColumns),
    };

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let email = record.get(email_idx).unwrap_or_default();
        if email.is_empty() {
            continue;
        }

        let raw = record.get(credits_idx).unwrap_or_default();
        let credits_used = parse_credits(raw).ok_or_else(|| ImportError::InvalidCredits {
            line: record.position().map(|p| p.line()).unwrap_or_default(),
            email: email.to_string(),
            value: raw.to_string(),
        })?;

        rows.push(UsageRow::new(email, credits_used));
    }

    debug!(rows = rows.len(), "Parsed usage CSV");
    Ok(rows)
}

/// Integers as-is; decimals truncate toward zero. Values beyond
/// `MAX_CREDITS` are rejected.
fn parse_credits(raw: &str) -> Option<i64> {
    let value = match raw.parse::<i64>() {
        Ok(value) => value,
        Err(_) => {
            let f = raw.parse::<f64>().ok().filter(|f| f.is_finite())?.trunc();
            if f.abs() > MAX_CREDITS as f64 {
                return None;
            }
            f as i64
        }
    };
    (-MAX_CREDITS..=MAX_CREDITS).contains(&value).then_some(value)
}
