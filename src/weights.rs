//! Feature weight vector for the prediction model.
//!
//! The default values were calibrated against the 2025 spring classics
//! season (Strade Bianche through Liège-Bastogne-Liège). Raw vectors may
//! have any non-negative magnitudes; `normalized()` rescales so the entries
//! sum to 1.0, and the predictor normalizes exactly once at construction.
//!
//! JSON shape for file overrides (unknown names are ignored, missing names
//! weigh 0):
//! {
//!   "recent_form": 0.25,
//!   "classic_pedigree": 0.20,
//!   ...
//! }

use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, io, path::Path};
use tracing::debug;

/// The 13 feature names, in the fixed order used for reports.
pub const FEATURES: [&str; 13] = [
    "recent_form",
    "classic_pedigree",
    "specialty_score",
    "age_distance_fit",
    "previous_year",
    "preparation",
    "injury_penalty",
    "terrain_match",
    "sprint_capability",
    "uphill_sprint",
    "cobble_capability",
    "momentum",
    "team_strength",
];

/// One non-negative weight per feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    #[serde(default)]
    pub recent_form: f64,
    #[serde(default)]
    pub classic_pedigree: f64,
    #[serde(default)]
    pub specialty_score: f64,
    #[serde(default)]
    pub age_distance_fit: f64,
    #[serde(default)]
    pub previous_year: f64,
    #[serde(default)]
    pub preparation: f64,
    #[serde(default)]
    pub injury_penalty: f64,
    #[serde(default)]
    pub terrain_match: f64,
    #[serde(default)]
    pub sprint_capability: f64,
    #[serde(default)]
    pub uphill_sprint: f64,
    #[serde(default)]
    pub cobble_capability: f64,
    #[serde(default)]
    pub momentum: f64,
    #[serde(default)]
    pub team_strength: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            classic_pedigree: 0.15,
            terrain_match: 0.15,
            uphill_sprint: 0.12,
            cobble_capability: 0.12,
            sprint_capability: 0.08,
            team_strength: 0.059,
            preparation: 0.053,
            previous_year: 0.05,
            specialty_score: 0.046,
            injury_penalty: 0.046,
            recent_form: 0.046,
            momentum: 0.046,
            age_distance_fit: 0.033,
        }
    }
}

impl Weights {
    /// All-zero vector; useful as a base when building candidates by name.
    pub fn zero() -> Self {
        Self {
            recent_form: 0.0,
            classic_pedigree: 0.0,
            specialty_score: 0.0,
            age_distance_fit: 0.0,
            previous_year: 0.0,
            preparation: 0.0,
            injury_penalty: 0.0,
            terrain_match: 0.0,
            sprint_capability: 0.0,
            uphill_sprint: 0.0,
            cobble_capability: 0.0,
            momentum: 0.0,
            team_strength: 0.0,
        }
    }

    /// Build from a name → weight map. Names outside the 13 known features
    /// are ignored (debug-logged); missing names weigh 0.
    pub fn from_map(raw: &HashMap<String, f64>) -> Self {
        let mut w = Self::zero();
        for (name, &value) in raw {
            if !w.set(name, value) {
                debug!(feature = %name, "ignoring unknown feature weight");
            }
        }
        w
    }

    /// Set one weight by feature name; returns false for unknown names.
    pub fn set(&mut self, name: &str, value: f64) -> bool {
        match name {
            "recent_form" => self.recent_form = value,
            "classic_pedigree" => self.classic_pedigree = value,
            "specialty_score" => self.specialty_score = value,
            "age_distance_fit" => self.age_distance_fit = value,
            "previous_year" => self.previous_year = value,
            "preparation" => self.preparation = value,
            "injury_penalty" => self.injury_penalty = value,
            "terrain_match" => self.terrain_match = value,
            "sprint_capability" => self.sprint_capability = value,
            "uphill_sprint" => self.uphill_sprint = value,
            "cobble_capability" => self.cobble_capability = value,
            "momentum" => self.momentum = value,
            "team_strength" => self.team_strength = value,
            _ => return false,
        }
        true
    }

    /// Weight for a feature name (0.0 for unknown names).
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

    /// `(name, weight)` pairs in the fixed report order.
    pub fn as_pairs(&self) -> [(&'static str, f64); 13] {
        let mut out = [("", 0.0); 13];
        for (slot, name) in out.iter_mut().zip(FEATURES) {
            *slot = (name, self.value(name));
        }
        out
    }

    pub fn sum(&self) -> f64 {
        self.as_pairs().iter().map(|(_, v)| v).sum()
    }

    /// Rescale so the weights sum to 1.0. A degenerate all-zero vector
    /// normalizes to an even split rather than dividing by zero.
    pub fn normalized(&self) -> Self {
        let total = self.sum();
        let mut out = Self::zero();
        if total > 0.0 {
            for (name, value) in self.as_pairs() {
                out.set(name, value / total);
            }
        } else {
            debug!("normalizing a zero weight vector to an even split");
            let even = 1.0 / FEATURES.len() as f64;
            for name in FEATURES {
                out.set(name, even);
            }
        }
        out
    }
}

/// Load a weight vector from a JSON file (tolerant map form).
/// Public for tests/tools.
pub fn load_weights_file(path: &Path) -> io::Result<Weights> {
    let bytes = fs::read(path)?;
    let raw: HashMap<String, f64> = serde_json::from_slice(&bytes)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Weights::from_map(&raw))
}
