use std::fmt;

use rand::RngExt;
use serde::Serialize;
use tracing::{info, instrument};

use super::features::FareFeatures;
use super::store::ModelStore;
use crate::config::ModelConfig;
use crate::models::{ImprovementCharge, TripDetails};
use crate::session::TripSession;
use crate::{FareError, Result};

/// Supplies the improvement charge for each prediction attempt
pub trait ChargeSource {
    fn draw(&mut self) -> ImprovementCharge;
}

/// Uniform pick among 0, 0.5 and 1
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomCharge;

impl ChargeSource for RandomCharge {
    fn draw(&mut self) -> ImprovementCharge {
        let index = rand::rng().random_range(0..ImprovementCharge::ALL.len());
        ImprovementCharge::ALL[index]
    }
}

/// Always the same charge; makes predictions reproducible
#[derive(Debug, Clone, Copy)]
pub struct FixedCharge(pub ImprovementCharge);

impl ChargeSource for FixedCharge {
    fn draw(&mut self) -> ImprovementCharge {
        self.0
    }
}

/// A scored fare together with the exact model input that produced it
#[derive(Debug, Clone, Serialize)]
pub struct FareEstimate {
    pub features: FareFeatures,
    pub fare: f64,
}

impl fmt::Display for FareEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${:.2}", self.fare)
    }
}

pub struct FareEstimator {
    store: ModelStore,
}

impl FareEstimator {
    #[must_use]
    pub fn new(store: ModelStore) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(ModelStore::new(config.path.clone()))
    }

    /// Score one fare for the session's current route.
    ///
    /// Fails with [`FareError::NoRoute`] before any route was found. If the
    /// model cannot be loaded, nothing is scored.
    #[instrument(skip(self, session))]
    pub fn estimate(
        &self,
        session: &TripSession,
        details: &TripDetails,
        charge: ImprovementCharge,
    ) -> Result<FareEstimate> {
        let route = session.current().ok_or(FareError::NoRoute)?;
        let features = FareFeatures::new(route, details, charge);

        let model = self.store.load()?;
        let fare = model.predict(&features)?;

        info!(
            "Estimated fare {:.2} for {} km / {} mins",
            fare, features.distance, features.trip_duration
        );
        Ok(FareEstimate { features, fare })
    }
}
