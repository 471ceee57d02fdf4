//! The fare model's input record

use crate::models::{ImprovementCharge, RouteSummary, TripDetails};
use serde::Serialize;

/// Column names in the order the model expects them
pub const FEATURE_COLUMNS: [&str; 10] = [
    "vendor_id",
    "mta_tax",
    "distance",
    "num_passengers",
    "toll_amount",
    "payment_method",
    "improvement_charge",
    "extra_charges",
    "trip_duration",
    "day_type",
];

pub const MTA_TAX: f64 = 0.5;
pub const TOLL_AMOUNT: f64 = 0.0;
pub const EXTRA_CHARGES: f64 = 0.5;
pub const DAY_TYPE: u8 = 0;

/// One row of model input. Field order matches [`FEATURE_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FareFeatures {
    pub vendor_id: u8,
    pub mta_tax: f64,
    pub distance: u64,
    pub num_passengers: u8,
    pub toll_amount: f64,
    pub payment_method: u8,
    pub improvement_charge: f64,
    pub extra_charges: f64,
    pub trip_duration: u64,
    pub day_type: u8,
}

impl FareFeatures {
    /// Distance and duration come from the session's route, the rest from the rider.
    /// Tax, toll, extra charges and day type are fixed.
    #[must_use]
    pub fn new(route: &RouteSummary, details: &TripDetails, charge: ImprovementCharge) -> Self {
        Self {
            vendor_id: details.vendor.code(),
            mta_tax: MTA_TAX,
            distance: route.distance_km,
            num_passengers: details.passengers.get(),
            toll_amount: TOLL_AMOUNT,
            payment_method: details.payment.code(),
            improvement_charge: charge.amount(),
            extra_charges: EXTRA_CHARGES,
            trip_duration: route.duration_min,
            day_type: DAY_TYPE,
        }
    }

    /// Numeric vector in column order
    #[must_use]
    pub fn values(&self) -> [f64; 10] {
        [
            f64::from(self.vendor_id),
            self.mta_tax,
            self.distance as f64,
            f64::from(self.num_passengers),
            self.toll_amount,
            f64::from(self.payment_method),
            self.improvement_charge,
            self.extra_charges,
            self.trip_duration as f64,
            f64::from(self.day_type),
        ]
    }

    /// Two-line table of column names and values, for showing the model input
    #[must_use]
    pub fn table(&self) -> String {
        let values = self.values();
        let widths: Vec<usize> = FEATURE_COLUMNS.iter().map(|c| c.len()).collect();
        let header = FEATURE_COLUMNS.join(" | ");
        let row = values
            .iter()
            .zip(widths)
            .map(|(value, width)| format!("{value:>width$}"))
            .collect::<Vec<_>>()
            .join(" | ");
        format!("{header}\n{row}")
    }
}
