use chrono::NaiveDate;
use serde::Deserialize;

use holotrack_inventory::{CartonStock, SeriesLocation};
use holotrack_issuance::{Dashboard, Issue, MonthlyReport};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateCartonRequest {
    pub carton_no: String,
    pub start_series: u64,
    pub end_series: u64,
}

#[derive(Debug, Deserialize)]
pub struct IssueHologramsRequest {
    pub issue_no: String,
    pub total_required: u64,
    /// One `PERMIT_NO|YYYY-MM-DD` per line.
    #[serde(default)]
    pub permits: String,
    pub issue_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct MonthlyReportQuery {
    pub month: Option<u32>,
    pub year: Option<i32>,
}

// -------------------------
// Response mapping
// -------------------------

pub fn carton_stock_to_json(s: CartonStock) -> serde_json::Value {
    serde_json::json!({
        "id": s.carton.id.get(),
        "carton_no": s.carton.carton_no.as_str(),
        "start_series": s.carton.range.start,
        "end_series": s.carton.range.end,
        "created_at": s.carton.created_at.to_rfc3339(),
        "total_available": s.total_available,
        "boxes": s.boxes.into_iter().map(|b| serde_json::json!({
            "box_no": b.box_no,
            "start_series": b.range.start,
            "end_series": b.range.end,
            "issued_upto": b.issued_upto,
            "available": b.available,
        })).collect::<Vec<_>>()
    })
}

pub fn series_location_to_json(l: SeriesLocation) -> serde_json::Value {
    serde_json::json!({
        "series": l.series,
        "carton_no": l.carton_no.as_str(),
        "box_no": l.box_no,
        "box_start_series": l.box_range.start,
        "box_end_series": l.box_range.end,
        "issued": l.issued,
    })
}

pub fn issue_to_json(i: Issue) -> serde_json::Value {
    serde_json::json!({
        "id": i.id.get(),
        "issue_no": i.issue_no.as_str(),
        "issue_date": i.issue_date.to_string(),
        "total_required": i.total_required,
        "series_from": i.series_from,
        "series_to": i.series_to,
        "permits": i.permits.into_iter().map(|p| serde_json::json!({
            "permit_no": p.permit_no,
            "permit_date": p.permit_date.to_string(),
        })).collect::<Vec<_>>()
    })
}

pub fn dashboard_to_json(d: Dashboard) -> serde_json::Value {
    serde_json::json!({
        "total_cartons": d.total_cartons,
        "total_issues": d.total_issues,
        "total_stock": d.total_stock,
        "recent_issues": d.recent_issues.into_iter().map(issue_to_json).collect::<Vec<_>>(),
    })
}

pub fn monthly_report_to_json(r: MonthlyReport) -> serde_json::Value {
    let rows = r.rows();
    serde_json::json!({
        "month": r.period.month(),
        "year": r.period.year(),
        "period": r.period.to_string(),
        "total_issued": r.total_issued,
        "remaining_stock": r.remaining_stock,
        "rows": rows,
        "issues": r.issues.into_iter().map(issue_to_json).collect::<Vec<_>>(),
    })
}
