//! Application service over a [`HologramStore`].
//!
//! Turns raw caller input into domain requests, runs them through the store
//! and assembles the read-side summaries. Holds no state of its own, so any
//! number of request handlers can share one instance.

use chrono::{Datelike, NaiveDate, Utc};
use tracing::{info, warn};

use holotrack_core::{CartonNo, DomainError};
use holotrack_inventory::{locate_series, stock_listing, validate_carton, CartonStock, SeriesLocation};
use holotrack_issuance::{Dashboard, Issue, IssueRequest, MonthlyReport, ReportPeriod, RECENT_ISSUES};

use crate::store::{HologramStore, StoreError};

/// Issuance input as received from a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueOrder {
    pub issue_no: String,
    pub total_required: u64,
    pub permit_text: String,
    /// Defaults to today (UTC).
    pub issue_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct HologramService<S> {
    store: S,
}

impl<S> HologramService<S>
where
    S: HologramStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Register a carton and split it into its boxes.
    pub async fn add_carton(
        &self,
        carton_no: &str,
        start_series: u64,
        end_series: u64,
    ) -> Result<CartonStock, StoreError> {
        let new = validate_carton(carton_no, start_series, end_series).inspect_err(|e| {
            warn!(carton_no, start_series, end_series, error = %e, "carton rejected");
        })?;

        let (carton, boxes) = self
            .store
            .create_carton(new, Utc::now())
            .await
            .inspect_err(|e| warn!(carton_no, error = %e, "carton not created"))?;

        info!(carton_no = %carton.carton_no, range = %carton.range, "carton added");

        stock_listing(std::slice::from_ref(&carton), &boxes)
            .pop()
            .ok_or_else(|| StoreError::database("add_carton", "created carton missing from listing"))
    }

    pub async fn delete_carton(&self, carton_no: &str) -> Result<(), StoreError> {
        let carton_no = CartonNo::new(carton_no)?;
        self.store
            .delete_carton(&carton_no)
            .await
            .inspect_err(|e| warn!(carton_no = %carton_no, error = %e, "carton not deleted"))?;

        info!(carton_no = %carton_no, "carton deleted");
        Ok(())
    }

    /// Allocate series for an issue and record it with its permits.
    pub async fn issue_holograms(&self, order: IssueOrder) -> Result<Issue, StoreError> {
        let request = IssueRequest {
            issue_date: order.issue_date.unwrap_or_else(|| Utc::now().date_naive()),
            issue_no: order.issue_no,
            total_required: order.total_required,
            permit_text: order.permit_text,
        };

        let issue = self.store.record_issue(request.clone()).await.inspect_err(|e| {
            warn!(
                issue_no = %request.issue_no,
                total_required = request.total_required,
                error = %e,
                "issue rejected"
            );
        })?;

        info!(
            issue_no = %issue.issue_no,
            series_from = issue.series_from,
            series_to = issue.series_to,
            permits = issue.permits.len(),
            "holograms issued"
        );
        Ok(issue)
    }

    pub async fn total_stock(&self) -> Result<u64, StoreError> {
        self.store.total_available().await
    }

    pub async fn dashboard(&self) -> Result<Dashboard, StoreError> {
        Ok(Dashboard {
            total_cartons: self.store.count_cartons().await?,
            total_issues: self.store.count_issues().await?,
            total_stock: self.store.total_available().await?,
            recent_issues: self.store.issues(Some(RECENT_ISSUES)).await?,
        })
    }

    /// Every carton with its boxes, newest carton first.
    pub async fn stock(&self) -> Result<Vec<CartonStock>, StoreError> {
        let cartons = self.store.cartons().await?;
        let boxes = self.store.boxes().await?;
        Ok(stock_listing(&cartons, &boxes))
    }

    /// Carton and box holding `series`. Fails `NotFound` when no carton covers it.
    pub async fn locate_series(&self, series: u64) -> Result<SeriesLocation, StoreError> {
        let cartons = self.store.cartons().await?;
        let boxes = self.store.boxes().await?;
        locate_series(&cartons, &boxes, series).ok_or_else(|| DomainError::NotFound.into())
    }

    pub async fn issues(&self) -> Result<Vec<Issue>, StoreError> {
        self.store.issues(None).await
    }

    /// Monthly report; missing month or year fall back to the current one.
    pub async fn monthly_report(&self, month: Option<u32>, year: Option<i32>) -> Result<MonthlyReport, StoreError> {
        let today = Utc::now().date_naive();
        let period = ReportPeriod::new(month.unwrap_or(today.month()), year.unwrap_or(today.year()))?;

        let (from, until) = period.bounds();
        let issues = self.store.issues_between(from, until).await?;
        let remaining = self.store.total_available().await?;

        Ok(MonthlyReport::build(period, issues, remaining))
    }
}
