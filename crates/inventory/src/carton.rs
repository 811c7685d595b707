use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use holotrack_core::{CartonId, CartonNo, DomainError, DomainResult, Entity, ValueObject};

/// Holograms per carton. Fixed; not configurable at runtime.
pub const CARTON_CAPACITY: u64 = 100_000;

/// Boxes per carton.
pub const BOXES_PER_CARTON: u32 = 5;

/// Holograms per box.
pub const BOX_CAPACITY: u64 = CARTON_CAPACITY / BOXES_PER_CARTON as u64;

/// Highest series number a carton may cover (storage keeps signed 64-bit integers).
pub const MAX_SERIES: u64 = i64::MAX as u64;

/// Inclusive range of absolute series numbers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesRange {
    pub start: u64,
    pub end: u64,
}

impl ValueObject for SeriesRange {}

impl SeriesRange {
    /// Build a range; `end` must not precede `start`.
    pub fn new(start: u64, end: u64) -> DomainResult<Self> {
        if end < start {
            return Err(DomainError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Number of series numbers in the range.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn contains(&self, series: u64) -> bool {
        (self.start..=self.end).contains(&series)
    }
}

impl core::fmt::Display for SeriesRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A validated carton that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCarton {
    pub carton_no: CartonNo,
    pub range: SeriesRange,
}

/// Validate a carton creation request.
///
/// Checks run in the order an operator fixes them: identifier, positive
/// start, range order and bounds, then capacity. Uniqueness of the carton
/// number is checked by the store.
pub fn validate_carton(carton_no: &str, start_series: u64, end_series: u64) -> DomainResult<NewCarton> {
    let carton_no = CartonNo::new(carton_no)?;

    if start_series == 0 {
        return Err(DomainError::validation("start series must be a positive integer"));
    }

    if end_series <= start_series || end_series > MAX_SERIES {
        return Err(DomainError::InvalidRange {
            start: start_series,
            end: end_series,
        });
    }

    let size = (end_series - start_series).saturating_add(1);
    if size != CARTON_CAPACITY {
        return Err(DomainError::InvalidCapacity {
            size,
            expected: CARTON_CAPACITY,
        });
    }

    Ok(NewCarton {
        carton_no,
        range: SeriesRange {
            start: start_series,
            end: end_series,
        },
    })
}

impl NewCarton {
    /// Partition the carton range into its boxes, in box order, all unissued.
    pub fn boxes(&self, carton_id: CartonId) -> Vec<CartonBox> {
        (0..BOXES_PER_CARTON)
            .map(|i| {
                let start = self.range.start + u64::from(i) * BOX_CAPACITY;
                CartonBox {
                    carton_id,
                    box_no: i + 1,
                    range: SeriesRange {
                        start,
                        end: start + BOX_CAPACITY - 1,
                    },
                    issued_upto: 0,
                }
            })
            .collect()
    }

    pub fn into_carton(self, id: CartonId, created_at: DateTime<Utc>) -> Carton {
        Carton {
            id,
            carton_no: self.carton_no,
            range: self.range,
            created_at,
        }
    }
}

/// A persisted carton. Its boxes are stored alongside, keyed by `carton_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carton {
    pub id: CartonId,
    pub carton_no: CartonNo,
    pub range: SeriesRange,
    pub created_at: DateTime<Utc>,
}

impl Entity for Carton {
    type Id = CartonId;
    type Key = CartonNo;

    fn id(&self) -> CartonId {
        self.id
    }

    fn key(&self) -> &CartonNo {
        &self.carton_no
    }
}

impl Carton {
    /// 1-based box number holding `series`, if the carton covers it.
    pub fn box_for_series(&self, series: u64) -> Option<u32> {
        if !self.range.contains(series) {
            return None;
        }
        Some(((series - self.range.start) / BOX_CAPACITY) as u32 + 1)
    }
}

/// A box of holograms: the unit of sequential consumption.
///
/// `issued_upto` counts units consumed from the start of the range and only
/// ever grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartonBox {
    pub carton_id: CartonId,
    pub box_no: u32,
    pub range: SeriesRange,
    pub issued_upto: u64,
}

impl CartonBox {
    pub fn size(&self) -> u64 {
        self.range.len()
    }

    pub fn available(&self) -> u64 {
        self.size().saturating_sub(self.issued_upto)
    }

    pub fn is_exhausted(&self) -> bool {
        self.available() == 0
    }

    /// True once `series` (inside this box) has been handed out.
    pub fn is_issued(&self, series: u64) -> bool {
        self.range.contains(series) && series - self.range.start < self.issued_upto
    }

    /// Canonical allocation order key.
    pub fn canonical_key(&self) -> (CartonId, u32) {
        (self.carton_id, self.box_no)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn creates_five_contiguous_boxes() {
        let carton = validate_carton("C-1", 1, 100_000).unwrap();
        let boxes = carton.boxes(CartonId::new(1));

        assert_eq!(boxes.len(), 5);
        assert_eq!(boxes[0].range, SeriesRange { start: 1, end: 20_000 });
        assert_eq!(boxes[4].range, SeriesRange { start: 80_001, end: 100_000 });
        assert!(boxes.iter().all(|b| b.issued_upto == 0));
        assert_eq!(
            boxes.iter().map(|b| b.box_no).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5]
        );
    }

    #[test]
    fn rejects_short_range() {
        let err = validate_carton("C-1", 1, 99_999).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidCapacity {
                size: 99_999,
                expected: CARTON_CAPACITY
            }
        );
    }

    #[test]
    fn rejects_reversed_or_empty_range() {
        assert!(matches!(
            validate_carton("C-1", 500, 500),
            Err(DomainError::InvalidRange { start: 500, end: 500 })
        ));
        assert!(matches!(
            validate_carton("C-1", 500, 10),
            Err(DomainError::InvalidRange { .. })
        ));
    }

    #[test]
    fn rejects_blank_carton_no() {
        assert!(matches!(
            validate_carton("  ", 1, 100_000),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn locates_box_for_series() {
        let carton = validate_carton("C-1", 200_001, 300_000)
            .unwrap()
            .into_carton(CartonId::new(1), Utc::now());

        assert_eq!(carton.box_for_series(200_001), Some(1));
        assert_eq!(carton.box_for_series(220_000), Some(1));
        assert_eq!(carton.box_for_series(220_001), Some(2));
        assert_eq!(carton.box_for_series(300_000), Some(5));
        assert_eq!(carton.box_for_series(300_001), None);
    }

    #[test]
    fn box_availability_tracks_issued_upto() {
        let mut b = validate_carton("C-1", 1, 100_000).unwrap().boxes(CartonId::new(1)).remove(0);
        assert_eq!(b.available(), 20_000);
        assert!(!b.is_issued(1));

        b.issued_upto = 19_999;
        assert!(b.is_issued(19_999));
        assert!(!b.is_issued(20_000));

        b.issued_upto = 20_000;
        assert!(b.is_exhausted());
        assert!(b.is_issued(20_000));
        assert!(!b.is_issued(20_001));
    }

    #[test]
    fn rejects_zero_start() {
        assert!(matches!(
            validate_carton("C-0", 0, 99_999),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn extreme_ranges_are_rejected_without_overflow() {
        assert!(matches!(
            validate_carton("C-X", 0, u64::MAX),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            validate_carton("C-X", 1, u64::MAX),
            Err(DomainError::InvalidRange { .. })
        ));
        assert!(matches!(
            validate_carton("C-X", MAX_SERIES - 99_998, MAX_SERIES + 1),
            Err(DomainError::InvalidRange { .. })
        ));
        assert!(validate_carton("C-X", MAX_SERIES - 99_999, MAX_SERIES).is_ok());
    }

    proptest! {
        /// Property: any valid carton is tiled exactly by its boxes.
        #[test]
        fn boxes_tile_the_carton(start in 1u64..1_000_000_000u64) {
            let carton = validate_carton("C-P", start, start + CARTON_CAPACITY - 1).unwrap();
            let boxes = carton.boxes(CartonId::new(1));

            prop_assert_eq!(boxes.len() as u32, BOXES_PER_CARTON);
            prop_assert_eq!(boxes.iter().map(|b| b.size()).sum::<u64>(), CARTON_CAPACITY);
            prop_assert_eq!(boxes[0].range.start, carton.range.start);
            prop_assert_eq!(boxes[boxes.len() - 1].range.end, carton.range.end);
            for pair in boxes.windows(2) {
                prop_assert_eq!(pair[0].range.end + 1, pair[1].range.start);
                prop_assert!(pair[0].box_no < pair[1].box_no);
            }
        }
    }
}
