//! `holotrack-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod value_object;

pub use entity::{find_by_key, Entity};
pub use error::{DomainError, DomainResult};
pub use id::{CartonId, CartonNo, IssueId, IssueNo};
pub use value_object::ValueObject;
