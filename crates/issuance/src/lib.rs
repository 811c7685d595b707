//! Issuance domain module.
//!
//! Binds allocation outcomes to issues with permits, and builds the read-side
//! summaries (dashboard, monthly report). Pure deterministic domain logic
//! (no IO, no HTTP, no storage).

pub mod calculator;
pub mod issue;
pub mod permit;
pub mod report;

pub use calculator::{calculate, holograms_required, parse_count};
pub use issue::{plan_issue, Issue, IssuePlan, IssueRequest};
pub use permit::{parse_permits, Permit, PERMIT_DATE_FORMAT};
pub use report::{sort_newest_first, Dashboard, MonthlyReport, ReportPeriod, ReportRow, RECENT_ISSUES};
