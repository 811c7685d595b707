//! Series allocation engine.
//!
//! Boxes are consumed in canonical order (carton creation order, then box
//! number), each from its current `issued_upto` mark forward. A request may
//! span several boxes and cartons; every box strictly between the first and
//! the last one touched ends up exhausted.
//!
//! The walk is planned against an immutable view first and applied only when
//! the whole quantity can be satisfied, so a failed call never leaves a
//! partially consumed box behind.

use serde::{Deserialize, Serialize};

use holotrack_core::{CartonId, DomainError, DomainResult};

use crate::carton::{CartonBox, SeriesRange};
use crate::stock::total_available;

/// Contiguous run of series numbers taken from one box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocatedSegment {
    pub carton_id: CartonId,
    pub box_no: u32,
    pub range: SeriesRange,
    /// `issued_upto` of the box before this allocation (compare-and-commit guard).
    pub issued_before: u64,
}

impl AllocatedSegment {
    pub fn issued_after(&self) -> u64 {
        self.issued_before + self.range.len()
    }
}

/// Outcome of a successful allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub quantity: u64,
    pub series_from: u64,
    pub series_to: u64,
    /// Per-box runs in consumption order.
    pub segments: Vec<AllocatedSegment>,
}

impl Allocation {
    /// Restore the touched boxes to their pre-allocation counters.
    ///
    /// Used when a later step of the same unit of work fails after the
    /// allocation was applied to a working copy.
    pub fn revert(&self, boxes: &mut [CartonBox]) {
        for seg in &self.segments {
            if let Some(b) = boxes
                .iter_mut()
                .find(|b| b.carton_id == seg.carton_id && b.box_no == seg.box_no)
            {
                b.issued_upto = seg.issued_before;
            }
        }
    }
}

/// Allocate `quantity` series numbers from `boxes`.
///
/// Boxes may be passed in any order; the walk always follows canonical order.
/// Fails with `Exhausted` (and mutates nothing) when the boxes cannot cover
/// the whole quantity.
pub fn allocate(boxes: &mut [CartonBox], quantity: u64) -> DomainResult<Allocation> {
    if quantity == 0 {
        return Err(DomainError::validation("quantity must be positive"));
    }

    let mut order: Vec<usize> = (0..boxes.len()).collect();
    order.sort_by_key(|&i| boxes[i].canonical_key());

    let mut remaining = quantity;
    let mut plan: Vec<(usize, AllocatedSegment)> = Vec::new();

    for idx in order {
        if remaining == 0 {
            break;
        }

        let b = &boxes[idx];
        let available = b.available();
        if available == 0 {
            continue;
        }

        let take = remaining.min(available);
        let start = b.range.start + b.issued_upto;
        plan.push((
            idx,
            AllocatedSegment {
                carton_id: b.carton_id,
                box_no: b.box_no,
                range: SeriesRange {
                    start,
                    end: start + take - 1,
                },
                issued_before: b.issued_upto,
            },
        ));
        remaining -= take;
    }

    if remaining > 0 {
        return Err(DomainError::Exhausted {
            requested: quantity,
            available: total_available(boxes.iter()),
        });
    }

    // Non-empty: quantity > 0 and remaining reached 0.
    let series_from = plan[0].1.range.start;
    let series_to = plan[plan.len() - 1].1.range.end;

    let mut segments = Vec::with_capacity(plan.len());
    for (idx, seg) in plan {
        boxes[idx].issued_upto = seg.issued_after();
        segments.push(seg);
    }

    Ok(Allocation {
        quantity,
        series_from,
        series_to,
        segments,
    })
}
