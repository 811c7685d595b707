//! Hologram inventory domain: the carton/box hierarchy, stock accounting and
//! the series allocation engine.
//!
//! Pure deterministic domain logic (no IO, no HTTP, no storage).

pub mod allocation;
pub mod carton;
pub mod stock;

pub use allocation::{allocate, AllocatedSegment, Allocation};
pub use carton::{
    validate_carton, Carton, CartonBox, NewCarton, SeriesRange, BOXES_PER_CARTON, BOX_CAPACITY,
    CARTON_CAPACITY, MAX_SERIES,
};
pub use stock::{locate_series, stock_listing, total_available, BoxStock, CartonStock, SeriesLocation};
