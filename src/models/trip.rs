//! Trip attributes chosen by the user before a fare prediction

use crate::FareError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Cab provider, encoded as the model's `vendor_id`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Vendor {
    #[default]
    Ola,
    Uber,
}

impl Vendor {
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Vendor::Ola => 1,
            Vendor::Uber => 2,
        }
    }
}

impl TryFrom<u8> for Vendor {
    type Error = FareError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Vendor::Ola),
            2 => Ok(Vendor::Uber),
            other => Err(FareError::validation(format!(
                "vendor id must be 1 (OLA) or 2 (UBER), got {other}"
            ))),
        }
    }
}

impl From<Vendor> for u8 {
    fn from(vendor: Vendor) -> Self {
        vendor.code()
    }
}

impl FromStr for Vendor {
    type Err = FareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "ola" => Ok(Vendor::Ola),
            "2" | "uber" => Ok(Vendor::Uber),
            other => Err(FareError::validation(format!(
                "unknown cab provider '{other}', use ola or uber"
            ))),
        }
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vendor::Ola => write!(f, "OLA"),
            Vendor::Uber => write!(f, "UBER"),
        }
    }
}

/// How the rider pays, encoded as the model's `payment_method`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Other,
}

impl PaymentMethod {
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            PaymentMethod::Cash => 1,
            PaymentMethod::Card => 2,
            PaymentMethod::Other => 3,
        }
    }
}

impl TryFrom<u8> for PaymentMethod {
    type Error = FareError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(PaymentMethod::Cash),
            2 => Ok(PaymentMethod::Card),
            3 => Ok(PaymentMethod::Other),
            other => Err(FareError::validation(format!(
                "payment method must be 1 (Cash), 2 (Card) or 3 (Other), got {other}"
            ))),
        }
    }
}

impl From<PaymentMethod> for u8 {
    fn from(method: PaymentMethod) -> Self {
        method.code()
    }
}

impl FromStr for PaymentMethod {
    type Err = FareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "cash" => Ok(PaymentMethod::Cash),
            "2" | "card" => Ok(PaymentMethod::Card),
            "3" | "other" => Ok(PaymentMethod::Other),
            other => Err(FareError::validation(format!(
                "unknown payment method '{other}', use cash, card or other"
            ))),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "Cash"),
            PaymentMethod::Card => write!(f, "Card"),
            PaymentMethod::Other => write!(f, "Other"),
        }
    }
}

/// Number of riders, 1 to 6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Passengers(u8);

impl Passengers {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    pub fn new(count: u8) -> Result<Self, FareError> {
        if (Self::MIN..=Self::MAX).contains(&count) {
            Ok(Self(count))
        } else {
            Err(FareError::validation(format!(
                "passenger count must be between {} and {}, got {count}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Passengers {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u8> for Passengers {
    type Error = FareError;

    fn try_from(count: u8) -> Result<Self, Self::Error> {
        Self::new(count)
    }
}

impl From<Passengers> for u8 {
    fn from(passengers: Passengers) -> Self {
        passengers.0
    }
}

impl FromStr for Passengers {
    type Err = FareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let count: u8 = s
            .trim()
            .parse()
            .map_err(|_| FareError::validation(format!("'{}' is not a passenger count", s.trim())))?;
        Self::new(count)
    }
}

/// Improvement surcharge applied to a single prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum ImprovementCharge {
    #[default]
    Zero,
    Half,
    Full,
}

impl ImprovementCharge {
    pub const ALL: [ImprovementCharge; 3] = [
        ImprovementCharge::Zero,
        ImprovementCharge::Half,
        ImprovementCharge::Full,
    ];

    #[must_use]
    pub fn amount(self) -> f64 {
        match self {
            ImprovementCharge::Zero => 0.0,
            ImprovementCharge::Half => 0.5,
            ImprovementCharge::Full => 1.0,
        }
    }
}

impl TryFrom<f64> for ImprovementCharge {
    type Error = FareError;

    fn try_from(amount: f64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|charge| charge.amount() == amount)
            .ok_or_else(|| {
                FareError::validation(format!(
                    "improvement charge must be 0, 0.5 or 1, got {amount}"
                ))
            })
    }
}

impl From<ImprovementCharge> for f64 {
    fn from(charge: ImprovementCharge) -> Self {
        charge.amount()
    }
}

impl FromStr for ImprovementCharge {
    type Err = FareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount: f64 = s.trim().parse().map_err(|_| {
            FareError::validation(format!("'{}' is not an improvement charge", s.trim()))
        })?;
        Self::try_from(amount)
    }
}

impl fmt::Display for ImprovementCharge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.amount())
    }
}

/// Everything the user picks for a fare prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TripDetails {
    #[serde(rename = "vendor_id")]
    pub vendor: Vendor,
    #[serde(rename = "num_passengers")]
    pub passengers: Passengers,
    #[serde(rename = "payment_method")]
    pub payment: PaymentMethod,
}
