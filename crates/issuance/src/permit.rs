use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use holotrack_core::{DomainError, DomainResult};

/// Accepted permit date format.
pub const PERMIT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Permit attached to an issue. Permit numbers are not globally unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permit {
    pub permit_no: String,
    pub permit_date: NaiveDate,
}

/// Parse raw permit text, one `PERMIT_NO|YYYY-MM-DD` per line.
///
/// Lines without a `|` and lines with more than two fields are skipped. A
/// two-field line whose date does not parse fails the whole batch.
pub fn parse_permits(text: &str) -> DomainResult<Vec<Permit>> {
    let mut permits = Vec::new();

    for line in text.trim().split('\n') {
        if !line.contains('|') {
            continue;
        }

        let fields: Vec<&str> = line.trim().split('|').collect();
        let [permit_no, date] = fields.as_slice() else {
            continue;
        };

        let permit_no = permit_no.trim();
        let date = date.trim();
        let permit_date = NaiveDate::parse_from_str(date, PERMIT_DATE_FORMAT)
            .map_err(|_| DomainError::invalid_permit_date(permit_no, date))?;

        permits.push(Permit {
            permit_no: permit_no.to_string(),
            permit_date,
        });
    }

    Ok(permits)
}
