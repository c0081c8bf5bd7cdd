// src/predictor.rs
//! # Prediction Engine
//! Pure, testable logic that maps `(race context, roster, rider data)` to a
//! ranked prediction. No I/O; data retrieval and presentation live with
//! external collaborators.

use std::collections::HashMap;

use anyhow::anyhow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{base_ref, ref_year, RaceCatalog, RaceContext, DEFAULT_CATALOG};
use crate::features::{self, FeatureScores};
use crate::rider::{RiderRecord, RosterEntry};
use crate::teams::{TeamTiers, DEFAULT_TEAM_TIERS};
use crate::weights::Weights;

/// One row of a ranked prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionEntry {
    pub rider_id: String,
    pub rider_name: String,
    /// 1-based rank by descending score; ties keep roster order.
    pub rank: u32,
    /// Composite score ×100, rounded to 1 decimal.
    pub score: f64,
    /// Raw signals, rounded to 3 decimals.
    pub features: FeatureScores,
}

/// Scores a roster for one classic using a fixed weight vector.
///
/// The weight vector is normalized exactly once here; the catalog and team
/// tiers are injected so tests can substitute alternates without touching
/// process-wide state.
#[derive(Debug, Clone)]
pub struct Predictor {
    weights: Weights,
    catalog: RaceCatalog,
    teams: TeamTiers,
}

impl Default for Predictor {
    fn default() -> Self {
        Self::new(Weights::default())
    }
}

impl Predictor {
    /// Predictor with the given weights and the process-wide default
    /// catalog and team tiers.
    pub fn new(weights: Weights) -> Self {
        Self::with_config(weights, DEFAULT_CATALOG.clone(), DEFAULT_TEAM_TIERS.clone())
    }

    /// Fully injected constructor.
    pub fn with_config(weights: Weights, catalog: RaceCatalog, teams: TeamTiers) -> Self {
        Self {
            weights: weights.normalized(),
            catalog,
            teams,
        }
    }

    /// The normalized weight vector in use.
    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn catalog(&self) -> &RaceCatalog {
        &self.catalog
    }

    /// Rank every roster rider for the resolved race context.
    ///
    /// Riders with no entry in `rider_data` are skipped silently; an
    /// incomplete startlist should never abort the whole prediction.
    pub fn predict(
        &self,
        ctx: &RaceContext,
        roster: &[RosterEntry],
        rider_data: &HashMap<String, RiderRecord>,
    ) -> Vec<PredictionEntry> {
        let mut predictions: Vec<PredictionEntry> = Vec::with_capacity(roster.len());

        for entry in roster {
            let record = match rider_data.get(&entry.id) {
                Some(r) => r,
                None => {
                    debug!(rider = %entry.id, "no data for roster rider, skipping");
                    continue;
                }
            };

            let scores = features::compute(record, ctx, &self.catalog, &self.teams);
            let composite = scores.weighted_total(&self.weights);

            predictions.push(PredictionEntry {
                rider_id: entry.id.clone(),
                rider_name: entry.name.clone(),
                rank: 0, // assigned after sorting
                score: round1(composite * 100.0),
                features: scores.rounded(),
            });
        }

        // Stable sort: equal scores keep roster order.
        predictions.sort_by(|a, b| b.score.total_cmp(&a.score));
        for (i, p) in predictions.iter_mut().enumerate() {
            p.rank = (i + 1) as u32;
        }

        predictions
    }

    /// Convenience wrapper taking a PCS-style race ref such as
    /// `"race/paris-roubaix/2024"`. The year comes from the explicit
    /// argument or the ref itself; distance/date overrides win over the
    /// catalog.
    pub fn predict_race(
        &self,
        race_ref: &str,
        year: Option<i32>,
        distance_km: Option<f64>,
        date: Option<NaiveDate>,
        roster: &[RosterEntry],
        rider_data: &HashMap<String, RiderRecord>,
    ) -> anyhow::Result<Vec<PredictionEntry>> {
        let base = base_ref(race_ref);
        let year = year
            .or_else(|| ref_year(race_ref))
            .ok_or_else(|| anyhow!("no year in race ref {race_ref:?} and none supplied"))?;
        let ctx = self.catalog.resolve(&base, year, distance_km, date);
        Ok(self.predict(&ctx, roster, rider_data))
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
