// src/backtest.rs
//! Backtest scoring: how well does a ranked prediction match a known
//! finishing order?
//!
//! Actual top-10 lists may contain `None` entries: finishers whose
//! identity is absent from our prediction universe. All metrics are
//! computed over the known subset only.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::predictor::{PredictionEntry, Predictor};
use crate::rider::{RiderRecord, RosterEntry};

/// Rank-error placeholder when no rider appears in both lists, and the
/// normalization unit of the calibration objective's inverse-error term.
/// An error-unit convention, not a true error bound.
pub const RANK_ERROR_UNIT: f64 = 20.0;

/// Accuracy metrics for one race prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestScore {
    /// Fraction of the actual known top-10 predicted in our top-10.
    pub top10_hit_rate: f64,
    /// Fraction of the actual known top-5 predicted in our top-5.
    pub top5_hit_rate: f64,
    /// 1.0 if the actual winner sits in our predicted top-3.
    pub winner_in_top3: f64,
    /// 1.0 if the actual winner sits in our predicted top-5.
    pub winner_in_top5: f64,
    /// Mean absolute rank difference over riders present in both lists.
    pub avg_rank_error: f64,
}

impl BacktestScore {
    /// The "no signal" case: an entirely unknown actual top-10. Callers
    /// aggregating across races may want to detect and exclude it.
    pub fn degenerate() -> Self {
        Self {
            top10_hit_rate: 0.0,
            top5_hit_rate: 0.0,
            winner_in_top3: 0.0,
            winner_in_top5: 0.0,
            avg_rank_error: RANK_ERROR_UNIT,
        }
    }
}

/// Score a ranked prediction against the actual finishing order.
pub fn score_predictions(
    predictions: &[PredictionEntry],
    actual_top10: &[Option<String>],
) -> BacktestScore {
    let actual_known: Vec<&str> = actual_top10
        .iter()
        .flatten()
        .map(String::as_str)
        .collect();
    if actual_known.is_empty() {
        return BacktestScore::degenerate();
    }

    let pred_ids: Vec<&str> = predictions.iter().map(|p| p.rider_id.as_str()).collect();

    let hit_rate = |depth: usize| {
        let actual: Vec<&str> = actual_known.iter().take(depth).copied().collect();
        if actual.is_empty() {
            return 0.0;
        }
        let predicted = &pred_ids[..pred_ids.len().min(depth)];
        let hits = actual.iter().filter(|id| predicted.contains(id)).count();
        hits as f64 / actual.len() as f64
    };

    let winner = actual_known[0];
    let winner_within = |depth: usize| {
        if pred_ids.iter().take(depth).any(|id| *id == winner) {
            1.0
        } else {
            0.0
        }
    };

    // Average rank error for the actual top-10 riders, matched anywhere in
    // the prediction.
    let mut rank_errors = Vec::new();
    for (actual_rank, id) in actual_known.iter().take(10).enumerate() {
        if let Some(pred_idx) = pred_ids.iter().position(|p| p == id) {
            rank_errors.push((actual_rank as f64 + 1.0 - (pred_idx as f64 + 1.0)).abs());
        }
    }
    let avg_rank_error = if rank_errors.is_empty() {
        RANK_ERROR_UNIT
    } else {
        rank_errors.iter().sum::<f64>() / rank_errors.len() as f64
    };

    BacktestScore {
        top10_hit_rate: hit_rate(10),
        top5_hit_rate: hit_rate(5),
        winner_in_top3: winner_within(3),
        winner_in_top5: winner_within(5),
        avg_rank_error,
    }
}

/// One historical race with its ground truth and the rider-data snapshot
/// as of race morning (retrieval is the caller's concern).
#[derive(Debug, Clone)]
pub struct BacktestRace {
    pub name: String,
    pub base: String,
    pub year: i32,
    pub date: NaiveDate,
    pub distance_km: f64,
    pub actual_top10: Vec<Option<String>>,
    /// Pure sprinters' races are unsuited to the model and are skipped.
    pub sprinters_race: bool,
    pub riders: HashMap<String, RiderRecord>,
}

/// Backtest metrics averaged across a historical race set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub avg_top10_hit: f64,
    pub avg_top5_hit: f64,
    pub winner_top3_rate: f64,
    pub winner_top5_rate: f64,
    pub avg_rank_error: f64,
    pub races_scored: usize,
}

/// Predict every non-skipped race and average the metrics.
/// `None` when nothing was scored (all races skipped or the set is empty).
pub fn run_backtest(
    predictor: &Predictor,
    races: &[BacktestRace],
    roster: &[RosterEntry],
) -> Option<AggregateMetrics> {
    let mut scores = Vec::new();

    for race in races {
        if race.sprinters_race {
            continue;
        }
        let ctx = predictor.catalog().resolve(
            &race.base,
            race.year,
            Some(race.distance_km),
            Some(race.date),
        );
        let predictions = predictor.predict(&ctx, roster, &race.riders);
        scores.push(score_predictions(&predictions, &race.actual_top10));
    }

    if scores.is_empty() {
        return None;
    }

    let n = scores.len() as f64;
    Some(AggregateMetrics {
        avg_top10_hit: scores.iter().map(|s| s.top10_hit_rate).sum::<f64>() / n,
        avg_top5_hit: scores.iter().map(|s| s.top5_hit_rate).sum::<f64>() / n,
        winner_top3_rate: scores.iter().map(|s| s.winner_in_top3).sum::<f64>() / n,
        winner_top5_rate: scores.iter().map(|s| s.winner_in_top5).sum::<f64>() / n,
        avg_rank_error: scores.iter().map(|s| s.avg_rank_error).sum::<f64>() / n,
        races_scored: scores.len(),
    })
}
