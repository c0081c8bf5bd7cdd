// src/catalog.rs
//! Race catalog: static metadata for the known classics plus `RaceContext`
//! resolution.
//!
//! - Built-in `default_seed()` covering the monuments, major classics and
//!   semi-classics the model was calibrated on.
//! - Optional TOML override via `load_from_file`, falling back to the seed.
//! - Caller-supplied distance/date overrides always win over catalog values.
//!
//! The catalog is immutable after construction and injected into the
//! predictor, so tests can substitute alternate catalogs freely.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Fallbacks for races the catalog does not know.
pub const FALLBACK_DISTANCE_KM: f64 = 220.0;
pub const FALLBACK_SPRINT_PROB: f64 = 0.2;
pub const FALLBACK_CLIMBING_DIFFICULTY: f64 = 0.4;
pub const FALLBACK_UPHILL_PROB: f64 = 0.2;
pub const FALLBACK_COBBLE_DIFFICULTY: f64 = 0.0;

/// Classification of classic races by prestige.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassicClass {
    Monument,
    MajorClassic,
    SemiClassic,
}

/// Terrain profile of classic races.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    FlatPunch,
    Cobbles,
    CobblesHills,
    Hilly,
    Mountainous,
}

/// Catalog entry for one race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceMeta {
    pub class: ClassicClass,
    pub terrain: Terrain,
    pub typical_distance_km: f64,
    /// Month the race is usually held in (1-12).
    pub month: u32,
    pub name: String,
    pub sprint_finish_prob: f64,
    pub climbing_difficulty: f64,
    pub uphill_finish_prob: f64,
    pub cobble_difficulty: f64,
}

/// Everything race-side the feature functions need, fully resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceContext {
    /// Race base ref without the year, e.g. `"race/paris-roubaix"`.
    pub base: String,
    pub year: i32,
    pub terrain: Terrain,
    pub date: NaiveDate,
    pub distance_km: f64,
    pub sprint_finish_prob: f64,
    pub climbing_difficulty: f64,
    pub uphill_finish_prob: f64,
    pub cobble_difficulty: f64,
}

/// Immutable lookup of race metadata keyed by base ref.
#[derive(Debug, Clone, Deserialize)]
pub struct RaceCatalog {
    races: HashMap<String, RaceMeta>,
}

impl Default for RaceCatalog {
    fn default() -> Self {
        Self::default_seed()
    }
}

impl RaceCatalog {
    pub fn new(races: HashMap<String, RaceMeta>) -> Self {
        Self { races }
    }

    /// Load from a TOML file. Falls back to `default_seed()` on any error.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|s| Self::from_toml_str(&s))
        {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(error = %e, path = %path.display(), "race catalog load failed, using seed");
                Self::default_seed()
            }
        }
    }

    /// Parse from a TOML string (`[races."race/..."]` tables).
    pub fn from_toml_str(toml_str: &str) -> anyhow::Result<Self> {
        let catalog: RaceCatalog = toml::from_str(toml_str)?;
        Ok(catalog)
    }

    pub fn get(&self, base: &str) -> Option<&RaceMeta> {
        self.races.get(base)
    }

    pub fn len(&self) -> usize {
        self.races.len()
    }

    pub fn is_empty(&self) -> bool {
        self.races.is_empty()
    }

    /// Base refs of all catalog races sharing `terrain`.
    pub fn similar_terrain(&self, terrain: Terrain) -> Vec<&str> {
        let mut bases: Vec<&str> = self
            .races
            .iter()
            .filter(|(_, meta)| meta.terrain == terrain)
            .map(|(base, _)| base.as_str())
            .collect();
        bases.sort_unstable();
        bases
    }

    /// Resolve a full `RaceContext` for `base` in `year`.
    ///
    /// Caller overrides win over catalog values. Unknown races resolve with
    /// the documented fallback constants and a mid-April date (the model has
    /// no live data source to ask).
    pub fn resolve(
        &self,
        base: &str,
        year: i32,
        distance_km: Option<f64>,
        date: Option<NaiveDate>,
    ) -> RaceContext {
        let meta = self.get(base);

        let distance_km = distance_km
            .or_else(|| meta.map(|m| m.typical_distance_km))
            .unwrap_or(FALLBACK_DISTANCE_KM);

        let date = date
            .or_else(|| meta.and_then(|m| NaiveDate::from_ymd_opt(year, m.month, 15)))
            .unwrap_or_else(|| mid_april(year));

        RaceContext {
            base: base.to_string(),
            year,
            terrain: meta.map(|m| m.terrain).unwrap_or(Terrain::Hilly),
            date,
            distance_km,
            sprint_finish_prob: meta
                .map(|m| m.sprint_finish_prob)
                .unwrap_or(FALLBACK_SPRINT_PROB),
            climbing_difficulty: meta
                .map(|m| m.climbing_difficulty)
                .unwrap_or(FALLBACK_CLIMBING_DIFFICULTY),
            uphill_finish_prob: meta
                .map(|m| m.uphill_finish_prob)
                .unwrap_or(FALLBACK_UPHILL_PROB),
            cobble_difficulty: meta
                .map(|m| m.cobble_difficulty)
                .unwrap_or(FALLBACK_COBBLE_DIFFICULTY),
        }
    }

    /// Built-in seed: the spring and autumn classics the default weights
    /// were calibrated against.
    pub fn default_seed() -> Self {
        let mut races = HashMap::new();

        let mut put = |base: &str,
                       class: ClassicClass,
                       terrain: Terrain,
                       distance: f64,
                       month: u32,
                       name: &str,
                       sprint: f64,
                       climb: f64,
                       uphill: f64,
                       cobble: f64| {
            races.insert(
                base.to_string(),
                RaceMeta {
                    class,
                    terrain,
                    typical_distance_km: distance,
                    month,
                    name: name.to_string(),
                    sprint_finish_prob: sprint,
                    climbing_difficulty: climb,
                    uphill_finish_prob: uphill,
                    cobble_difficulty: cobble,
                },
            );
        };

        use ClassicClass::*;
        use Terrain::*;

        put("race/milano-sanremo", Monument, FlatPunch, 300.0, 3, "Milano-Sanremo", 0.65, 0.2, 0.15, 0.0);
        put("race/ronde-van-vlaanderen", Monument, CobblesHills, 260.0, 4, "Ronde van Vlaanderen", 0.1, 0.5, 0.3, 0.8);
        put("race/paris-roubaix", Monument, Cobbles, 260.0, 4, "Paris-Roubaix", 0.15, 0.05, 0.0, 1.0);
        put("race/liege-bastogne-liege", Monument, Hilly, 260.0, 4, "Liège-Bastogne-Liège", 0.05, 0.85, 0.5, 0.0);
        put("race/il-lombardia", Monument, Hilly, 240.0, 10, "Il Lombardia", 0.05, 0.8, 0.5, 0.0);
        put("race/strade-bianche", MajorClassic, Hilly, 185.0, 3, "Strade Bianche", 0.1, 0.6, 0.7, 0.1);
        put("race/e3-harelbeke", MajorClassic, CobblesHills, 205.0, 3, "E3 Saxo Classic", 0.15, 0.35, 0.2, 0.6);
        put("race/gent-wevelgem", MajorClassic, CobblesHills, 250.0, 3, "Gent-Wevelgem", 0.6, 0.2, 0.1, 0.4);
        put("race/amstel-gold-race", MajorClassic, Hilly, 260.0, 4, "Amstel Gold Race", 0.2, 0.55, 0.6, 0.0);
        put("race/la-fleche-wallone", MajorClassic, Hilly, 195.0, 4, "La Flèche Wallonne", 0.0, 0.75, 0.95, 0.0);
        put("race/san-sebastian", MajorClassic, Hilly, 225.0, 7, "Clásica San Sebastián", 0.1, 0.7, 0.4, 0.0);
        put("race/dwars-door-vlaanderen", SemiClassic, CobblesHills, 185.0, 3, "Dwars door Vlaanderen", 0.2, 0.3, 0.2, 0.5);
        put("race/brabantse-pijl", SemiClassic, Hilly, 200.0, 4, "Brabantse Pijl", 0.15, 0.5, 0.4, 0.0);
        put("race/kuurne-brussel-kuurne", SemiClassic, FlatPunch, 197.0, 3, "Kuurne-Brussel-Kuurne", 0.8, 0.1, 0.0, 0.1);
        put("race/omloop-het-nieuwsblad", MajorClassic, CobblesHills, 200.0, 3, "Omloop Het Nieuwsblad", 0.15, 0.35, 0.15, 0.5);
        put("race/gp-samyn", SemiClassic, Cobbles, 200.0, 3, "GP Samyn", 0.1, 0.1, 0.0, 0.5);
        put("race/nokere-koerse", SemiClassic, FlatPunch, 195.0, 3, "Nokere Koerse", 0.7, 0.1, 0.0, 0.3);
        put("race/bredene-koksijde-classic", SemiClassic, FlatPunch, 200.0, 3, "Bredene-Koksijde Classic", 0.6, 0.05, 0.0, 0.0);
        put("race/brugge-de-panne", MajorClassic, FlatPunch, 205.0, 3, "Brugge-De Panne", 0.75, 0.05, 0.0, 0.1);
        put("race/scheldeprijs", SemiClassic, FlatPunch, 200.0, 4, "Scheldeprijs", 0.95, 0.0, 0.0, 0.0);

        Self { races }
    }
}

/// Process-wide default catalog.
pub static DEFAULT_CATALOG: Lazy<RaceCatalog> = Lazy::new(RaceCatalog::default_seed);

fn mid_april(year: i32) -> NaiveDate {
    // Mid spring-classics season; unknown races cannot be dated better
    // without a data source.
    NaiveDate::from_ymd_opt(year, 4, 15).expect("April 15 exists in every year")
}

/// Strip a full race or stage ref down to its base, e.g.
/// `"race/paris-roubaix/2024/result"` → `"race/paris-roubaix"`.
pub fn base_ref(race_ref: &str) -> String {
    let trimmed = race_ref.trim_start_matches("https://www.procyclingstats.com/");
    let mut parts = trimmed.split('/');
    match (parts.next(), parts.next()) {
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => format!("{a}/{b}"),
        _ => trimmed.to_string(),
    }
}

/// Extract the year from a ref like `"race/paris-roubaix/2024"`: the first
/// path segment that is exactly four digits.
pub fn ref_year(race_ref: &str) -> Option<i32> {
    race_ref
        .trim_start_matches("https://www.procyclingstats.com/")
        .split('/')
        .find(|part| part.len() == 4 && part.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|part| part.parse().ok())
}
