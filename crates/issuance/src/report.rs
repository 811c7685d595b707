//! Read-side summaries: dashboard, issue listing and the monthly report.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use holotrack_core::{DomainError, DomainResult};

use crate::issue::Issue;

/// Issues shown on the dashboard.
pub const RECENT_ISSUES: usize = 5;

/// Dashboard summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub total_cartons: u64,
    pub total_issues: u64,
    pub total_stock: u64,
    pub recent_issues: Vec<Issue>,
}

/// Order issues newest first: issue date descending, then latest record.
pub fn sort_newest_first(issues: &mut [Issue]) {
    issues.sort_by(|a, b| b.issue_date.cmp(&a.issue_date).then(b.id.cmp(&a.id)));
}

/// Calendar month a report covers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct ReportPeriod {
    month: u32,
    year: i32,
}

impl ReportPeriod {
    pub fn new(month: u32, year: i32) -> DomainResult<Self> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::validation(format!(
                "month must be between 1 and 12 (got {month})"
            )));
        }
        Ok(Self { month, year })
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.month() == self.month && date.year() == self.year
    }

    /// First day of the period and first day of the next one.
    pub fn bounds(&self) -> (NaiveDate, NaiveDate) {
        let first = NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN);
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        (first, next.unwrap_or(NaiveDate::MAX))
    }
}

impl core::fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

/// One line of the monthly issuance table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub date: NaiveDate,
    pub issue_no: String,
    pub permit_nos: String,
    pub series_from: u64,
    pub series_to: u64,
    pub total_issued: u64,
}

/// Monthly issuance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyReport {
    pub period: ReportPeriod,
    pub issues: Vec<Issue>,
    pub total_issued: u64,
    pub remaining_stock: u64,
}

impl MonthlyReport {
    /// Build the report from any set of issues; only those inside `period`
    /// are kept, ordered by issue date.
    pub fn build(period: ReportPeriod, issues: impl IntoIterator<Item = Issue>, remaining_stock: u64) -> Self {
        let mut issues: Vec<Issue> = issues.into_iter().filter(|i| period.contains(i.issue_date)).collect();
        issues.sort_by(|a, b| a.issue_date.cmp(&b.issue_date).then(a.id.cmp(&b.id)));
        let total_issued = issues.iter().map(|i| i.total_required).sum();

        Self {
            period,
            issues,
            total_issued,
            remaining_stock,
        }
    }

    pub fn rows(&self) -> Vec<ReportRow> {
        self.issues
            .iter()
            .map(|i| ReportRow {
                date: i.issue_date,
                issue_no: i.issue_no.to_string(),
                permit_nos: i.permit_numbers(),
                series_from: i.series_from,
                series_to: i.series_to,
                total_issued: i.total_required,
            })
            .collect()
    }
}
