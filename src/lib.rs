// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod backtest;
pub mod calibrate;
pub mod catalog;
pub mod explain;
pub mod features;
pub mod predictor;
pub mod rider;
pub mod teams;
pub mod weights;

// ---- Re-exports for stable public API ----
pub use crate::backtest::{
    run_backtest, score_predictions, AggregateMetrics, BacktestRace, BacktestScore,
};
pub use crate::calibrate::{
    CalibrationError, CalibrationOutcome, Calibrator, GridDimension, Objective, SearchSpace,
};
pub use crate::catalog::{base_ref, ref_year, RaceCatalog, RaceContext, RaceMeta, Terrain};
pub use crate::explain::explain;
pub use crate::features::FeatureScores;
pub use crate::predictor::{PredictionEntry, Predictor};
pub use crate::rider::{
    RankOutcome, ResultRecord, RiderProfile, RiderRecord, RosterEntry, SpecialtyPoints,
};
pub use crate::teams::TeamTiers;
pub use crate::weights::{Weights, FEATURES};
