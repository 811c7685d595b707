//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Every variant is a deterministic, caller-recoverable validation failure and
/// carries enough context (identifier, amounts, offending text) for an
/// operator to correct the input and retry. Storage failures live in the
/// infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// An identifier (carton number, issue number) is already in use.
    #[error("{kind} '{id}' already exists")]
    DuplicateIdentifier { kind: &'static str, id: String },

    /// The series range is empty or reversed.
    #[error("invalid series range {start}..={end}: end series must be greater than start series")]
    InvalidRange { start: u64, end: u64 },

    /// The series range does not hold exactly one carton worth of units.
    #[error("invalid carton capacity: range holds {size} holograms, expected exactly {expected}")]
    InvalidCapacity { size: u64, expected: u64 },

    /// Requested quantity exceeds total available stock.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: u64, available: u64 },

    /// The allocation walk ran out of boxes before satisfying the request.
    #[error("series exhausted: requested {requested}, available {available}")]
    Exhausted { requested: u64, available: u64 },

    /// Allocation failed after the stock check passed.
    #[error("error allocating series numbers for {requested} holograms")]
    AllocationRace { requested: u64 },

    /// A permit line had the delimiter but an unparseable date.
    #[error("invalid date format for permit {permit_no}: '{value}' (use YYYY-MM-DD)")]
    InvalidPermitDate { permit_no: String, value: String },

    /// A carton still backs issued series and cannot be removed.
    #[error("carton '{0}' has issued holograms and cannot be deleted")]
    CartonInUse(String),

    /// A value failed validation (e.g. blank identifier, zero quantity).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A requested resource was not found.
    #[error("not found")]
    NotFound,
}

impl DomainError {
    pub fn duplicate(kind: &'static str, id: impl Into<String>) -> Self {
        Self::DuplicateIdentifier {
            kind,
            id: id.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_permit_date(permit_no: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidPermitDate {
            permit_no: permit_no.into(),
            value: value.into(),
        }
    }
}
