//! Strongly-typed identifiers used across the domain.
//!
//! Two families exist: caller-assigned business numbers (`CartonNo`,
//! `IssueNo`) which are unique, trimmed, non-blank strings, and store-assigned
//! record ids (`CartonId`, `IssueId`) which grow with creation order.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Caller-assigned carton number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartonNo(String);

/// Caller-assigned issue number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueNo(String);

macro_rules! impl_business_no {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Parse a business number, trimming surrounding whitespace.
            pub fn new(value: impl AsRef<str>) -> Result<Self, DomainError> {
                let trimmed = value.as_ref().trim();
                if trimmed.is_empty() {
                    return Err(DomainError::validation(concat!($name, " cannot be empty")));
                }
                Ok(Self(trimmed.to_string()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $t {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_business_no!(CartonNo, "carton number");
impl_business_no!(IssueNo, "issue number");

/// Store-assigned carton record id. Ordering follows creation order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartonId(i64);

/// Store-assigned issue record id. Ordering follows creation order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(i64);

macro_rules! impl_record_id {
    ($t:ty) => {
        impl $t {
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            pub fn get(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

impl_record_id!(CartonId);
impl_record_id!(IssueId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_numbers_are_trimmed() {
        let no = CartonNo::new("  C-001 ").unwrap();
        assert_eq!(no.as_str(), "C-001");
        assert_eq!(no.to_string(), "C-001");
    }

    #[test]
    fn blank_business_numbers_are_rejected() {
        assert!(matches!(IssueNo::new("   "), Err(DomainError::Validation(_))));
        assert!("".parse::<CartonNo>().is_err());
    }

    #[test]
    fn record_ids_order_by_creation() {
        assert!(CartonId::new(1) < CartonId::new(2));
        assert_eq!(IssueId::from(7).get(), 7);
    }
}
