//! Thai land-area units
//!
//! 1 rai = 4 ngan = 400 square wah = 1,600 m². All rounding happens at this
//! presentation boundary; upstream area values stay unrounded so repeated
//! conversion of the same input is idempotent.

use serde::{Deserialize, Serialize};

/// Square meters per rai
pub const SQM_PER_RAI: f64 = 1600.0;
/// Square meters per square wah
pub const SQM_PER_WAH: f64 = 4.0;
/// Square wah per rai
pub const WAH_PER_RAI: f64 = 400.0;
/// Square wah per ngan
pub const WAH_PER_NGAN: f64 = 100.0;

/// A metric area broken down into traditional Thai land units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThaiArea {
    pub rai: u32,
    pub ngan: u32,
    /// Remaining square wah, rounded to one decimal
    pub wah: f64,
    pub square_meters: f64,
}

impl ThaiArea {
    pub const ZERO: ThaiArea = ThaiArea {
        rai: 0,
        ngan: 0,
        wah: 0.0,
        square_meters: 0.0,
    };

    /// The conventional `rai-ngan-wah` display string, e.g. `12-1-34.5 ไร่`
    pub fn display(&self) -> String {
        format!("{}-{}-{:.1} ไร่", self.rai, self.ngan, self.wah)
    }
}

/// Break a decimal rai area into whole rai, whole ngan and fractional wah.
///
/// Zero, negative or non-finite input yields the zero record rather than an
/// error so a parcel without area still renders.
pub fn to_thai_units(area_rai: f64) -> ThaiArea {
    if !area_rai.is_finite() || area_rai <= 0.0 {
        return ThaiArea::ZERO;
    }

    let square_meters = area_rai * SQM_PER_RAI;
    let total_wah = square_meters / SQM_PER_WAH;
    let rai = (total_wah / WAH_PER_RAI).floor();
    let remainder_wah = total_wah - rai * WAH_PER_RAI;
    let ngan = (remainder_wah / WAH_PER_NGAN).floor();
    let wah = remainder_wah - ngan * WAH_PER_NGAN;

    ThaiArea {
        rai: rai as u32,
        ngan: ngan as u32,
        wah: (wah * 10.0).round() / 10.0,
        square_meters,
    }
}

/// Convert a raw metric area (as supplied by the drawing tool or shapefile
/// parser) into decimal rai, the source-of-truth unit for parcels.
pub fn area_rai_from_sqm(square_meters: f64) -> f64 {
    if !square_meters.is_finite() || square_meters <= 0.0 {
        return 0.0;
    }
    square_meters / SQM_PER_RAI
}
