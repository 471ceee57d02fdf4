//! Fare estimation
//!
//! This module turns a found route plus the rider's choices into a fare:
//! - Features: the fixed ten-column input record of the fare model
//! - Model: the serialized regression artifact and its scoring
//! - Store: process-lifetime cache of the artifact, keyed by path and mtime
//! - Estimator: glue between the trip session, the features and the model

pub mod estimator;
pub mod features;
pub mod model;
pub mod store;

pub use estimator::{ChargeSource, FareEstimate, FareEstimator, FixedCharge, RandomCharge};
pub use features::{FEATURE_COLUMNS, FareFeatures};
pub use model::{Aggregation, FareModel, Regressor, Tree, TreeNode};
pub use store::ModelStore;
