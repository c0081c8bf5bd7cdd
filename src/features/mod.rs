// src/features/mod.rs
//! Feature pipeline entry: the 13 scorers and their orchestration.
//!
//! Every scorer is a pure function over borrowed rider/race data, returns a
//! normalized signal (clamped to [0,1] except where a blend can briefly
//! exceed it before weighting), and degrades to a documented neutral value
//! instead of failing on bad records.

pub mod ability;
pub mod age;
pub mod form;
pub mod pedigree;
pub mod season;

use serde::{Deserialize, Serialize};

use crate::catalog::{RaceCatalog, RaceContext};
use crate::rider::RiderRecord;
use crate::teams::TeamTiers;
use crate::weights::{Weights, FEATURES};

/// Raw signal values, one field per feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureScores {
    pub recent_form: f64,
    pub classic_pedigree: f64,
    pub specialty_score: f64,
    pub age_distance_fit: f64,
    pub previous_year: f64,
    pub preparation: f64,
    pub injury_penalty: f64,
    pub terrain_match: f64,
    pub sprint_capability: f64,
    pub uphill_sprint: f64,
    pub cobble_capability: f64,
    pub momentum: f64,
    pub team_strength: f64,
}

impl FeatureScores {
    /// Signal for a feature name (0.0 for unknown names).
    pub fn value(&self, name: &str) -> f64 {
        match name {
            "recent_form" => self.recent_form,
            "classic_pedigree" => self.classic_pedigree,
            "specialty_score" => self.specialty_score,
            "age_distance_fit" => self.age_distance_fit,
            "previous_year" => self.previous_year,
            "preparation" => self.preparation,
            "injury_penalty" => self.injury_penalty,
            "terrain_match" => self.terrain_match,
            "sprint_capability" => self.sprint_capability,
            "uphill_sprint" => self.uphill_sprint,
            "cobble_capability" => self.cobble_capability,
            "momentum" => self.momentum,
            "team_strength" => self.team_strength,
            _ => 0.0,
        }
    }

    /// `(name, signal)` pairs in the fixed report order.
    pub fn as_pairs(&self) -> [(&'static str, f64); 13] {
        let mut out = [("", 0.0); 13];
        for (slot, name) in out.iter_mut().zip(FEATURES) {
            *slot = (name, self.value(name));
        }
        out
    }

    /// Composite score: signals · weights. Computed over the raw signals;
    /// any display rounding happens downstream.
    pub fn weighted_total(&self, weights: &Weights) -> f64 {
        self.as_pairs()
            .iter()
            .map(|(name, signal)| signal * weights.value(name))
            .sum()
    }

    /// Copy with every signal rounded to 3 decimals (report form).
    pub fn rounded(&self) -> Self {
        let mut out = *self;
        out.recent_form = round3(out.recent_form);
        out.classic_pedigree = round3(out.classic_pedigree);
        out.specialty_score = round3(out.specialty_score);
        out.age_distance_fit = round3(out.age_distance_fit);
        out.previous_year = round3(out.previous_year);
        out.preparation = round3(out.preparation);
        out.injury_penalty = round3(out.injury_penalty);
        out.terrain_match = round3(out.terrain_match);
        out.sprint_capability = round3(out.sprint_capability);
        out.uphill_sprint = round3(out.uphill_sprint);
        out.cobble_capability = round3(out.cobble_capability);
        out.momentum = round3(out.momentum);
        out.team_strength = round3(out.team_strength);
        out
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

/// Compute all 13 signals for one rider in one race.
pub fn compute(
    record: &RiderRecord,
    ctx: &RaceContext,
    catalog: &RaceCatalog,
    teams: &TeamTiers,
) -> FeatureScores {
    let age = record.profile.age_on(ctx.date);
    let points = &record.profile.points;
    let results = &record.results;

    // Other catalog races on this race's terrain, for cross-race transfer.
    let similar = catalog.similar_terrain(ctx.terrain);

    FeatureScores {
        age_distance_fit: age::age_distance_fit(age, ctx.distance_km),
        recent_form: form::recent_form(results, ctx.date, form::FORM_WINDOW_DAYS),
        classic_pedigree: pedigree::classic_pedigree(
            results,
            &ctx.base,
            ctx.year,
            pedigree::PEDIGREE_YEARS_BACK,
        ),
        specialty_score: ability::specialty_score(points),
        previous_year: pedigree::previous_year(results, &ctx.base, &similar, ctx.year),
        preparation: season::preparation(results, ctx.date),
        injury_penalty: season::injury_indicator(results, ctx.date),
        terrain_match: ability::terrain_match(points, ctx.terrain, ctx.climbing_difficulty),
        sprint_capability: ability::sprint_capability(points, ctx.sprint_finish_prob),
        uphill_sprint: ability::uphill_sprint(points, ctx.uphill_finish_prob),
        cobble_capability: ability::cobble_capability(points, ctx.cobble_difficulty),
        momentum: form::momentum(results, ctx.date),
        team_strength: teams.strength_score(record.team.as_deref()),
    }
}
