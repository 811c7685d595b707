//! Integration tests for the full issuance pipeline.
//!
//! Tests: HologramService → HologramStore → allocation engine → read side
//!
//! Every scenario runs against both the in-memory and the SQLite store.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Datelike, NaiveDate, Utc};

    use holotrack_core::DomainError;

    use crate::service::{HologramService, IssueOrder};
    use crate::store::{HologramStore, InMemoryHologramStore, SqliteHologramStore, StoreError};

    type DynService = HologramService<Arc<dyn HologramStore>>;

    async fn services() -> Vec<(&'static str, DynService)> {
        let sqlite = SqliteHologramStore::connect("sqlite::memory:")
            .await
            .expect("sqlite in-memory store");
        vec![
            ("in_memory", HologramService::new(Arc::new(InMemoryHologramStore::new()) as Arc<dyn HologramStore>)),
            ("sqlite", HologramService::new(Arc::new(sqlite) as Arc<dyn HologramStore>)),
        ]
    }

    fn order(issue_no: &str, qty: u64, permits: &str, date: (i32, u32, u32)) -> IssueOrder {
        IssueOrder {
            issue_no: issue_no.to_string(),
            total_required: qty,
            permit_text: permits.to_string(),
            issue_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2),
        }
    }

    fn domain(err: &StoreError) -> &DomainError {
        err.as_domain().unwrap_or_else(|| panic!("expected domain error, got {err:?}"))
    }

    #[tokio::test]
    async fn carton_is_split_into_five_boxes() {
        for (name, svc) in services().await {
            let stock = svc.add_carton("C-1", 1, 100_000).await.unwrap();

            let ranges: Vec<(u64, u64)> = stock.boxes.iter().map(|b| (b.range.start, b.range.end)).collect();
            assert_eq!(
                ranges,
                vec![(1, 20_000), (20_001, 40_000), (40_001, 60_000), (60_001, 80_000), (80_001, 100_000)],
                "{name}"
            );
            assert_eq!(stock.total_available, 100_000, "{name}");
            assert_eq!(svc.total_stock().await.unwrap(), 100_000, "{name}");
        }
    }

    #[tokio::test]
    async fn wrong_capacity_creates_nothing() {
        for (name, svc) in services().await {
            let err = svc.add_carton("C-1", 1, 99_999).await.unwrap_err();
            assert!(matches!(domain(&err), DomainError::InvalidCapacity { size: 99_999, .. }), "{name}");

            let err = svc.add_carton("C-1", 10, 10).await.unwrap_err();
            assert!(matches!(domain(&err), DomainError::InvalidRange { .. }), "{name}");

            let err = svc.add_carton("  ", 1, 100_000).await.unwrap_err();
            assert!(matches!(domain(&err), DomainError::Validation(_)), "{name}");

            let err = svc.add_carton("C-0", 0, 99_999).await.unwrap_err();
            assert!(matches!(domain(&err), DomainError::Validation(_)), "{name}");

            let top = holotrack_inventory::MAX_SERIES;
            let err = svc.add_carton("C-9", top - 99_998, top + 1).await.unwrap_err();
            assert!(matches!(domain(&err), DomainError::InvalidRange { .. }), "{name}");

            assert_eq!(svc.dashboard().await.unwrap().total_cartons, 0, "{name}");
        }
    }

    #[tokio::test]
    async fn duplicate_carton_keeps_existing_counters() {
        for (name, svc) in services().await {
            svc.add_carton("C-1", 1, 100_000).await.unwrap();
            svc.issue_holograms(order("I-1", 500, "", (2024, 3, 1))).await.unwrap();

            let err = svc.add_carton("C-1", 200_001, 300_000).await.unwrap_err();
            assert!(matches!(domain(&err), DomainError::DuplicateIdentifier { .. }), "{name}");

            let stock = svc.stock().await.unwrap();
            assert_eq!(stock.len(), 1, "{name}");
            assert_eq!(stock[0].boxes[0].issued_upto, 500, "{name}");
            assert_eq!(stock[0].total_available, 99_500, "{name}");
        }
    }

    #[tokio::test]
    async fn issuance_spans_boxes_and_cartons() {
        for (name, svc) in services().await {
            svc.add_carton("C-1", 1, 100_000).await.unwrap();
            svc.add_carton("C-2", 500_001, 600_000).await.unwrap();

            let first = svc
                .issue_holograms(order("I-1", 25_000, "P-100|2024-03-15\nP-101|2024-03-16", (2024, 3, 20)))
                .await
                .unwrap();
            assert_eq!((first.series_from, first.series_to), (1, 25_000), "{name}");
            assert_eq!(first.permit_numbers(), "P-100, P-101", "{name}");

            let second = svc
                .issue_holograms(order("I-2", 80_000, "", (2024, 3, 21)))
                .await
                .unwrap();
            assert_eq!((second.series_from, second.series_to), (25_001, 505_000), "{name}");

            let stock = svc.stock().await.unwrap();
            // Newest carton first.
            assert_eq!(stock[0].carton.carton_no.as_str(), "C-2", "{name}");
            assert_eq!(stock[0].boxes[0].issued_upto, 5_000, "{name}");
            assert!(stock[1].boxes.iter().all(|b| b.available == 0), "{name}");
            assert_eq!(svc.total_stock().await.unwrap(), 95_000, "{name}");
        }
    }

    #[tokio::test]
    async fn exact_stock_then_nothing_left() {
        for (name, svc) in services().await {
            svc.add_carton("C-1", 1, 100_000).await.unwrap();
            svc.issue_holograms(order("I-1", 100_000, "", (2024, 3, 1))).await.unwrap();
            assert_eq!(svc.total_stock().await.unwrap(), 0, "{name}");

            let err = svc.issue_holograms(order("I-2", 1, "", (2024, 3, 2))).await.unwrap_err();
            assert!(
                matches!(domain(&err), DomainError::InsufficientStock { requested: 1, available: 0 }),
                "{name}"
            );
        }
    }

    #[tokio::test]
    async fn rejected_issues_change_nothing() {
        for (name, svc) in services().await {
            svc.add_carton("C-1", 1, 100_000).await.unwrap();
            svc.issue_holograms(order("I-1", 10, "", (2024, 3, 1))).await.unwrap();

            let err = svc.issue_holograms(order("I-1", 10, "", (2024, 3, 2))).await.unwrap_err();
            assert!(matches!(domain(&err), DomainError::DuplicateIdentifier { .. }), "{name}");

            let err = svc.issue_holograms(order("I-2", 100_000, "", (2024, 3, 2))).await.unwrap_err();
            assert!(
                matches!(domain(&err), DomainError::InsufficientStock { available: 99_990, .. }),
                "{name}"
            );

            let err = svc
                .issue_holograms(order("I-3", 30_000, "P-100|2024-03-15\nP-200|15-03-2024", (2024, 3, 2)))
                .await
                .unwrap_err();
            assert!(matches!(domain(&err), DomainError::InvalidPermitDate { .. }), "{name}");

            let err = svc.issue_holograms(order("I-4", 0, "", (2024, 3, 2))).await.unwrap_err();
            assert!(matches!(domain(&err), DomainError::Validation(_)), "{name}");

            assert_eq!(svc.total_stock().await.unwrap(), 99_990, "{name}");
            assert_eq!(svc.issues().await.unwrap().len(), 1, "{name}");

            // The failed issue number is still free.
            svc.issue_holograms(order("I-3", 10, "", (2024, 3, 3))).await.unwrap();
        }
    }

    #[tokio::test]
    async fn dashboard_shows_five_newest_issues() {
        for (name, svc) in services().await {
            svc.add_carton("C-1", 1, 100_000).await.unwrap();
            for day in 1..=7 {
                svc.issue_holograms(order(&format!("I-{day}"), 100, "", (2024, 3, day)))
                    .await
                    .unwrap();
            }

            let dashboard = svc.dashboard().await.unwrap();
            assert_eq!(dashboard.total_cartons, 1, "{name}");
            assert_eq!(dashboard.total_issues, 7, "{name}");
            assert_eq!(dashboard.total_stock, 99_300, "{name}");

            let recent: Vec<&str> = dashboard.recent_issues.iter().map(|i| i.issue_no.as_str()).collect();
            assert_eq!(recent, vec!["I-7", "I-6", "I-5", "I-4", "I-3"], "{name}");
        }
    }

    #[tokio::test]
    async fn monthly_report_covers_one_month() {
        for (name, svc) in services().await {
            svc.add_carton("C-1", 1, 100_000).await.unwrap();
            svc.issue_holograms(order("I-1", 300, "P-1|2024-02-28", (2024, 2, 29))).await.unwrap();
            svc.issue_holograms(order("I-2", 500, "P-2|2024-03-10", (2024, 3, 31))).await.unwrap();
            svc.issue_holograms(order("I-3", 200, "", (2024, 3, 1))).await.unwrap();
            svc.issue_holograms(order("I-4", 100, "", (2024, 4, 1))).await.unwrap();

            let report = svc.monthly_report(Some(3), Some(2024)).await.unwrap();
            let numbers: Vec<&str> = report.issues.iter().map(|i| i.issue_no.as_str()).collect();
            assert_eq!(numbers, vec!["I-3", "I-2"], "{name}");
            assert_eq!(report.total_issued, 700, "{name}");
            assert_eq!(report.remaining_stock, 98_900, "{name}");
            assert_eq!(report.rows()[1].permit_nos, "P-2", "{name}");

            let err = svc.monthly_report(Some(13), Some(2024)).await.unwrap_err();
            assert!(matches!(domain(&err), DomainError::Validation(_)), "{name}");
        }
    }

    #[tokio::test]
    async fn defaults_use_today() {
        for (name, svc) in services().await {
            svc.add_carton("C-1", 1, 100_000).await.unwrap();
            let issue = svc
                .issue_holograms(IssueOrder {
                    issue_no: "I-1".to_string(),
                    total_required: 5,
                    permit_text: String::new(),
                    issue_date: None,
                })
                .await
                .unwrap();

            let today = Utc::now().date_naive();
            assert_eq!(issue.issue_date, today, "{name}");

            let report = svc.monthly_report(None, None).await.unwrap();
            assert_eq!((report.period.month(), report.period.year()), (today.month(), today.year()), "{name}");
            assert_eq!(report.total_issued, 5, "{name}");
        }
    }

    #[tokio::test]
    async fn delete_carton_rules() {
        for (name, svc) in services().await {
            svc.add_carton("C-1", 1, 100_000).await.unwrap();
            svc.add_carton("C-2", 100_001, 200_000).await.unwrap();
            svc.issue_holograms(order("I-1", 1, "", (2024, 3, 1))).await.unwrap();

            let err = svc.delete_carton("C-1").await.unwrap_err();
            assert!(matches!(domain(&err), DomainError::CartonInUse(_)), "{name}");

            let err = svc.delete_carton("C-404").await.unwrap_err();
            assert!(matches!(domain(&err), DomainError::NotFound), "{name}");

            svc.delete_carton("C-2").await.unwrap();
            assert_eq!(svc.stock().await.unwrap().len(), 1, "{name}");
            assert_eq!(svc.total_stock().await.unwrap(), 99_999, "{name}");
        }
    }

    #[tokio::test]
    async fn series_lookup_follows_issuance() {
        for (name, svc) in services().await {
            svc.add_carton("C-1", 1, 100_000).await.unwrap();
            svc.issue_holograms(order("I-1", 20_005, "", (2024, 3, 1))).await.unwrap();

            let hit = svc.locate_series(20_005).await.unwrap();
            assert_eq!((hit.carton_no.as_str(), hit.box_no, hit.issued), ("C-1", 2, true), "{name}");
            assert!(!svc.locate_series(20_006).await.unwrap().issued, "{name}");

            let err = svc.locate_series(100_001).await.unwrap_err();
            assert!(matches!(domain(&err), DomainError::NotFound), "{name}");
        }
    }
}
