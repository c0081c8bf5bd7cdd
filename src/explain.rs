// src/explain.rs
//! Human-readable breakdown of one prediction entry. Pure formatting; the
//! console/table layer around it is out of scope.

use crate::predictor::PredictionEntry;
use crate::weights::{Weights, FEATURES};

const BAR_WIDTH: usize = 20;

/// Report label for each feature name.
fn label(feature: &str) -> &'static str {
    match feature {
        "recent_form" => "Recent form (90 days)",
        "classic_pedigree" => "Classic pedigree (5 years)",
        "specialty_score" => "One-day race specialty",
        "age_distance_fit" => "Age-distance suitability",
        "previous_year" => "Previous year results",
        "preparation" => "Season preparation",
        "injury_penalty" => "Injury/fitness indicator",
        "terrain_match" => "Terrain-rider match",
        "sprint_capability" => "Sprint capability (flat)",
        "uphill_sprint" => "Uphill sprint (puncheur)",
        "cobble_capability" => "Cobble capability",
        "momentum" => "Form momentum",
        "team_strength" => "Team strength",
        other => {
            debug_assert!(false, "unlabeled feature {other}");
            "Unknown feature"
        }
    }
}

/// Render a rank/name/score header plus one bar line per feature, in the
/// fixed declared order: proportional bar, raw signal, weight, and the
/// feature's contribution to the composite score.
pub fn explain(entry: &PredictionEntry, weights: &Weights) -> String {
    let mut lines = Vec::with_capacity(FEATURES.len() + 2);
    lines.push(format!(
        "#{} {} (score: {})",
        entry.rank, entry.rider_name, entry.score
    ));
    lines.push("-".repeat(40));

    for feature in FEATURES {
        let value = entry.features.value(feature);
        let weight = weights.value(feature);
        let filled = ((value * BAR_WIDTH as f64) as usize).min(BAR_WIDTH);
        let bar = format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled));
        let contribution = value * weight * 100.0;
        lines.push(format!(
            "  {:<30} [{}] {:.2} (w={:.2}, +{:.1})",
            label(feature),
            bar,
            value,
            weight,
            contribution
        ));
    }

    lines.join("\n")
}
