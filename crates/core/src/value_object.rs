//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are immutable and compared by their attribute values. A
/// `SeriesRange { start: 1, end: 20000 }` is a value object; a carton with a
/// carton number is an entity.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
