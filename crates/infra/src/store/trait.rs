use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use holotrack_core::{CartonNo, DomainError};
use holotrack_inventory::{Carton, CartonBox, NewCarton};
use holotrack_issuance::{Issue, IssueRequest};
use std::sync::Arc;

/// Store operation error.
///
/// `Domain` wraps the caller-recoverable validation failures decided inside
/// a unit of work; the other variants are infrastructure failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A compare-and-commit write found the row changed since it was read.
    #[error("concurrent modification detected: {0}")]
    Concurrency(String),

    #[error("database error during {operation}: {message}")]
    Database {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn database(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Database {
            operation,
            message: message.into(),
        }
    }

    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            StoreError::Domain(e) => Some(e),
            _ => None,
        }
    }
}

/// Persistence for the carton/box hierarchy and the issue records.
///
/// Every mutating method is one unit of work: it either applies completely
/// or leaves the stored state exactly as it was.
#[async_trait::async_trait]
pub trait HologramStore: Send + Sync {
    /// Persist a carton and its boxes. Fails `DuplicateIdentifier` when the
    /// carton number is taken.
    async fn create_carton(
        &self,
        carton: NewCarton,
        created_at: DateTime<Utc>,
    ) -> Result<(Carton, Vec<CartonBox>), StoreError>;

    /// Remove a carton and its boxes. Fails `NotFound` or `CartonInUse`.
    async fn delete_carton(&self, carton_no: &CartonNo) -> Result<(), StoreError>;

    /// Check stock, allocate series, parse permits and persist the issue, all
    /// inside one unit of work.
    async fn record_issue(&self, request: IssueRequest) -> Result<Issue, StoreError>;

    /// All cartons in creation order.
    async fn cartons(&self) -> Result<Vec<Carton>, StoreError>;

    /// All boxes in canonical order.
    async fn boxes(&self) -> Result<Vec<CartonBox>, StoreError>;

    /// Issues newest first, at most `limit` when given.
    async fn issues(&self, limit: Option<usize>) -> Result<Vec<Issue>, StoreError>;

    /// Issues dated in `[from, until)`.
    async fn issues_between(&self, from: NaiveDate, until: NaiveDate) -> Result<Vec<Issue>, StoreError>;

    async fn count_cartons(&self) -> Result<u64, StoreError>;

    async fn count_issues(&self) -> Result<u64, StoreError>;

    /// Total unissued holograms across all boxes.
    async fn total_available(&self) -> Result<u64, StoreError>;
}

#[async_trait::async_trait]
impl<S> HologramStore for Arc<S>
where
    S: HologramStore + ?Sized,
{
    async fn create_carton(
        &self,
        carton: NewCarton,
        created_at: DateTime<Utc>,
    ) -> Result<(Carton, Vec<CartonBox>), StoreError> {
        (**self).create_carton(carton, created_at).await
    }

    async fn delete_carton(&self, carton_no: &CartonNo) -> Result<(), StoreError> {
        (**self).delete_carton(carton_no).await
    }

    async fn record_issue(&self, request: IssueRequest) -> Result<Issue, StoreError> {
        (**self).record_issue(request).await
    }

    async fn cartons(&self) -> Result<Vec<Carton>, StoreError> {
        (**self).cartons().await
    }

    async fn boxes(&self) -> Result<Vec<CartonBox>, StoreError> {
        (**self).boxes().await
    }

    async fn issues(&self, limit: Option<usize>) -> Result<Vec<Issue>, StoreError> {
        (**self).issues(limit).await
    }

    async fn issues_between(&self, from: NaiveDate, until: NaiveDate) -> Result<Vec<Issue>, StoreError> {
        (**self).issues_between(from, until).await
    }

    async fn count_cartons(&self) -> Result<u64, StoreError> {
        (**self).count_cartons().await
    }

    async fn count_issues(&self) -> Result<u64, StoreError> {
        (**self).count_issues().await
    }

    async fn total_available(&self) -> Result<u64, StoreError> {
        (**self).total_available().await
    }
}
