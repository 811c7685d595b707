//! Stock accounting over the carton/box hierarchy.

use serde::Serialize;

use holotrack_core::CartonNo;

use crate::carton::{Carton, CartonBox, SeriesRange};

/// Total unissued holograms across `boxes`.
pub fn total_available<'a>(boxes: impl IntoIterator<Item = &'a CartonBox>) -> u64 {
    boxes.into_iter().map(CartonBox::available).sum()
}

/// Per-box line of the stock listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoxStock {
    pub box_no: u32,
    pub range: SeriesRange,
    pub issued_upto: u64,
    pub available: u64,
}

impl From<&CartonBox> for BoxStock {
    fn from(b: &CartonBox) -> Self {
        Self {
            box_no: b.box_no,
            range: b.range,
            issued_upto: b.issued_upto,
            available: b.available(),
        }
    }
}

/// Per-carton section of the stock listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartonStock {
    pub carton: Carton,
    pub boxes: Vec<BoxStock>,
    pub total_available: u64,
}

/// Stock listing: newest carton first, boxes in box order.
pub fn stock_listing(cartons: &[Carton], boxes: &[CartonBox]) -> Vec<CartonStock> {
    let mut cartons: Vec<&Carton> = cartons.iter().collect();
    cartons.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    cartons
        .into_iter()
        .map(|carton| {
            let mut own: Vec<&CartonBox> = boxes.iter().filter(|b| b.carton_id == carton.id).collect();
            own.sort_by_key(|b| b.box_no);

            CartonStock {
                carton: carton.clone(),
                total_available: total_available(own.iter().copied()),
                boxes: own.into_iter().map(BoxStock::from).collect(),
            }
        })
        .collect()
}

/// Where a series number sits in the hierarchy and whether it was issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesLocation {
    pub series: u64,
    pub carton_no: CartonNo,
    pub box_no: u32,
    pub box_range: SeriesRange,
    pub issued: bool,
}

/// Find the carton and box covering `series`.
pub fn locate_series(cartons: &[Carton], boxes: &[CartonBox], series: u64) -> Option<SeriesLocation> {
    let carton = cartons.iter().find(|c| c.range.contains(series))?;
    let box_no = carton.box_for_series(series)?;
    let b = boxes
        .iter()
        .find(|b| b.carton_id == carton.id && b.box_no == box_no)?;

    Some(SeriesLocation {
        series,
        carton_no: carton.carton_no.clone(),
        box_no,
        box_range: b.range,
        issued: b.is_issued(series),
    })
}
