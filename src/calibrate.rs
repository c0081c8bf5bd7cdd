// src/calibrate.rs
//! Weight calibration: multi-dimensional grid search over the major feature
//! weights, scored by backtesting against a historical race set.
//!
//! The search space is an explicit cross product of per-dimension candidate
//! lists with a named residual-band pruning predicate, and the objective is
//! a pluggable blend of backtest metrics, so search strategy and scoring stay
//! independently testable and replaceable.
//!
//! Step lists, split ratios and the residual band were tuned against a
//! specific historical season; they are configuration, not derivation.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::backtest::{run_backtest, AggregateMetrics, BacktestRace, RANK_ERROR_UNIT};
use crate::catalog::{RaceCatalog, DEFAULT_CATALOG};
use crate::predictor::Predictor;
use crate::rider::RosterEntry;
use crate::teams::{TeamTiers, DEFAULT_TEAM_TIERS};
use crate::weights::Weights;

/// One searched dimension: a feature and its candidate weight values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridDimension {
    pub feature: String,
    pub candidates: Vec<f64>,
}

impl GridDimension {
    pub fn new(feature: impl Into<String>, candidates: Vec<f64>) -> Self {
        Self {
            feature: feature.into(),
            candidates,
        }
    }
}

/// The searched weight space: major dimensions get explicit candidate
/// lists, minor features split the residual budget by fixed ratios.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSpace {
    pub majors: Vec<GridDimension>,
    /// `(feature, share)` pairs distributing the residual budget.
    pub minor_split: Vec<(String, f64)>,
    /// Candidates whose residual budget falls outside this band are pruned
    /// before evaluation, so the untested minor features can neither
    /// dominate nor vanish.
    pub residual_min: f64,
    pub residual_max: f64,
}

impl Default for SearchSpace {
    fn default() -> Self {
        let wide: Vec<f64> = vec![0.05, 0.10, 0.15, 0.20, 0.25, 0.30, 0.35];
        let narrow: Vec<f64> = vec![0.05, 0.10, 0.15, 0.20];
        Self {
            majors: vec![
                GridDimension::new("recent_form", wide.clone()),
                GridDimension::new("classic_pedigree", wide),
                GridDimension::new("specialty_score", narrow.clone()),
                GridDimension::new("age_distance_fit", narrow),
            ],
            minor_split: vec![
                ("previous_year".to_string(), 0.40),
                ("preparation".to_string(), 0.35),
                ("injury_penalty".to_string(), 0.25),
            ],
            residual_min: 0.10,
            residual_max: 0.50,
        }
    }
}

impl SearchSpace {
    /// The pruning predicate: is this residual budget inside the sanity band?
    pub fn residual_feasible(&self, residual: f64) -> bool {
        residual >= self.residual_min && residual <= self.residual_max
    }

    /// Enumerate the surviving candidate weight vectors, in search order.
    fn candidates(&self) -> Vec<Weights> {
        let mut out = Vec::new();
        if self.majors.is_empty() || self.majors.iter().any(|d| d.candidates.is_empty()) {
            return out;
        }

        let mut indices = vec![0usize; self.majors.len()];
        'grid: loop {
            let major_sum: f64 = self
                .majors
                .iter()
                .zip(&indices)
                .map(|(dim, &i)| dim.candidates[i])
                .sum();
            let residual = 1.0 - major_sum;

            if self.residual_feasible(residual) {
                let mut w = Weights::zero();
                for (dim, &i) in self.majors.iter().zip(&indices) {
                    w.set(&dim.feature, dim.candidates[i]);
                }
                for (feature, share) in &self.minor_split {
                    w.set(feature, residual * share);
                }
                out.push(w);
            }

            // Odometer-style advance through the cross product.
            for pos in (0..indices.len()).rev() {
                indices[pos] += 1;
                if indices[pos] < self.majors[pos].candidates.len() {
                    continue 'grid;
                }
                indices[pos] = 0;
            }
            break;
        }
        out
    }
}

/// The composite objective: a fixed weighted blend of backtest metrics,
/// with the rank-error term inverted and capped at zero.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Objective {
    pub top10: f64,
    pub top5: f64,
    pub winner_top5: f64,
    pub winner_top3: f64,
    pub inverse_rank_error: f64,
    pub rank_error_unit: f64,
}

impl Default for Objective {
    fn default() -> Self {
        Self {
            top10: 0.30,
            top5: 0.25,
            winner_top5: 0.20,
            winner_top3: 0.10,
            inverse_rank_error: 0.15,
            rank_error_unit: RANK_ERROR_UNIT,
        }
    }
}

impl Objective {
    pub fn composite(&self, m: &AggregateMetrics) -> f64 {
        self.top10 * m.avg_top10_hit
            + self.top5 * m.avg_top5_hit
            + self.winner_top5 * m.winner_top5_rate
            + self.winner_top3 * m.winner_top3_rate
            + self.inverse_rank_error * (1.0 - m.avg_rank_error / self.rank_error_unit).max(0.0)
    }
}

/// Why a calibration run produced no result.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalibrationError {
    /// The step/band configuration pruned every grid candidate.
    #[error("weight grid infeasible: every candidate fell outside the residual band")]
    NoFeasibleCandidate,
    /// Every race in the historical set was skipped or empty.
    #[error("no race in the historical set produced a backtest score")]
    NoScoredRaces,
}

/// The selected weight vector with its aggregate accuracy.
#[derive(Debug, Clone)]
pub struct CalibrationOutcome {
    pub weights: Weights,
    pub metrics: AggregateMetrics,
    pub composite: f64,
    /// Composite of the (normalized) baseline on the same race set.
    pub baseline_composite: f64,
    /// Grid candidates evaluated after pruning.
    pub candidates_tested: usize,
}

/// Grid-search calibrator. Holds the search configuration plus the catalog
/// and team tiers every candidate predictor is built with.
#[derive(Debug, Clone, Default)]
pub struct Calibrator {
    space: SearchSpace,
    objective: Objective,
    catalog: RaceCatalog,
    teams: TeamTiers,
}

impl Calibrator {
    pub fn new() -> Self {
        Self {
            space: SearchSpace::default(),
            objective: Objective::default(),
            catalog: DEFAULT_CATALOG.clone(),
            teams: DEFAULT_TEAM_TIERS.clone(),
        }
    }

    pub fn with_config(
        space: SearchSpace,
        objective: Objective,
        catalog: RaceCatalog,
        teams: TeamTiers,
    ) -> Self {
        Self {
            space,
            objective,
            catalog,
            teams,
        }
    }

    /// Search the weight space for the vector maximizing the composite
    /// objective across `races`.
    ///
    /// The baseline is evaluated first (exempt from pruning), then every
    /// surviving grid candidate in enumeration order; only a strictly
    /// higher composite replaces the incumbent, so ties keep the first
    /// vector found and the result is never worse than the baseline on
    /// this race set.
    pub fn run(
        &self,
        baseline: &Weights,
        races: &[BacktestRace],
        roster: &[RosterEntry],
    ) -> Result<CalibrationOutcome, CalibrationError> {
        let candidates = self.space.candidates();
        if candidates.is_empty() {
            return Err(CalibrationError::NoFeasibleCandidate);
        }

        let baseline = baseline.normalized();
        let baseline_metrics = self
            .evaluate(&baseline, races, roster)
            .ok_or(CalibrationError::NoScoredRaces)?;
        let baseline_composite = self.objective.composite(&baseline_metrics);

        let mut best_weights = baseline;
        let mut best_metrics = baseline_metrics;
        let mut best_composite = baseline_composite;
        let mut tested = 0usize;

        for candidate in &candidates {
            let metrics = match self.evaluate(candidate, races, roster) {
                Some(m) => m,
                None => continue,
            };
            tested += 1;

            let composite = self.objective.composite(&metrics);
            if composite > best_composite {
                best_composite = composite;
                best_metrics = metrics;
                best_weights = *candidate;
            }
        }

        info!(
            candidates = tested,
            best = best_composite,
            baseline = baseline_composite,
            "calibration finished"
        );

        Ok(CalibrationOutcome {
            weights: best_weights,
            metrics: best_metrics,
            composite: best_composite,
            baseline_composite,
            candidates_tested: tested,
        })
    }

    fn evaluate(
        &self,
        weights: &Weights,
        races: &[BacktestRace],
        roster: &[RosterEntry],
    ) -> Option<AggregateMetrics> {
        let predictor = Predictor::with_config(*weights, self.catalog.clone(), self.teams.clone());
        run_backtest(&predictor, races, roster)
    }
}
