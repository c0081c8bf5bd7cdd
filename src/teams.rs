//! # Team Tiers
//!
//! Configurable mapping from team slugs (e.g. `"lidl-trek"`) to a strength
//! tier used by the team-strength feature.
//!
//! - Tier 1 = dominant classics squads, tier 2 = strong contenders,
//!   tier 3 = everyone else.
//! - Loads from a JSON config (`{"tiers": {"slug": 1, ...}}`).
//! - Falls back to a built-in `default_seed()` with the squads the default
//!   weights were calibrated against.

use serde::Deserialize;
use std::{collections::HashMap, fs, path::Path};

use once_cell::sync::Lazy;

/// Score for a rider with no recorded team.
pub const UNKNOWN_TEAM_SCORE: f64 = 0.5;

/// Team tier lookup, loaded from JSON or seeded defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct TeamTiers {
    #[serde(default)]
    tiers: HashMap<String, u8>,
}

impl Default for TeamTiers {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl TeamTiers {
    pub fn new(tiers: HashMap<String, u8>) -> Self {
        Self { tiers }
    }

    /// Load from a JSON file.
    /// Falls back to `default_seed()` on error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|_| Self::default_seed()),
            Err(_) => Self::default_seed(),
        }
    }

    /// Tier for a team slug; unknown teams are tier 3.
    pub fn tier_for(&self, team: &str) -> u8 {
        self.tiers.get(team.trim()).copied().unwrap_or(3)
    }

    /// Normalized strength score for an optional team slug.
    ///
    /// Tier 1 → 1.0, tier 2 → 0.7, everything else → 0.4;
    /// no team recorded → 0.5 (neutral).
    pub fn strength_score(&self, team: Option<&str>) -> f64 {
        let team = match team {
            Some(t) if !t.trim().is_empty() => t,
            _ => return UNKNOWN_TEAM_SCORE,
        };
        match self.tier_for(team) {
            1 => 1.0,
            2 => 0.7,
            _ => 0.4,
        }
    }

    /// Built-in seed covering the classics peloton.
    pub(crate) fn default_seed() -> Self {
        let mut tiers = HashMap::new();

        // Tier 1: dominant classics squads
        for slug in [
            "uae-team-emirates",
            "team-visma-lease-a-bike",
            "alpecin-deceuninck",
            "lidl-trek",
            "soudal-quick-step",
        ] {
            tiers.insert(slug.to_string(), 1);
        }

        // Tier 2: strong contenders
        for slug in [
            "ineos-grenadiers",
            "groupama-fdj",
            "bahrain-victorious",
            "team-jayco-alula",
            "ef-education-easypost",
            "intermarche-wanty",
            "lotto-dstny",
            "movistar-team",
            "decathlon-ag2r-la-mondiale-team",
            "cofidis",
            "team-dsm-firmenich-postnl",
            "uno-x-mobility",
        ] {
            tiers.insert(slug.to_string(), 2);
        }

        Self { tiers }
    }
}

/// Process-wide default tiers.
pub static DEFAULT_TEAM_TIERS: Lazy<TeamTiers> = Lazy::new(TeamTiers::default_seed);
