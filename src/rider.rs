// src/rider.rs
//! Rider-side data model: profile, specialty points, result records.
//!
//! Everything here is constructed by an external data-retrieval collaborator
//! and consumed read-only by the scoring pipeline. Bad input degrades, it
//! never aborts: a result with an unparseable date keeps `date: None` and is
//! skipped by any scorer that needs one.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Finishing outcome of one race result.
///
/// PCS-style exports mix integer ranks, numeric strings and sentinel codes
/// in a single column; deserialization accepts all three shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOutcome {
    Finished(u32),
    DidNotFinish,
    DidNotStart,
    Disqualified,
    OutsideTimeLimit,
}

impl RankOutcome {
    /// Numeric rank for finishers, `None` for any non-finish.
    pub fn rank(self) -> Option<u32> {
        match self {
            RankOutcome::Finished(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_finish(self) -> bool {
        matches!(self, RankOutcome::Finished(_))
    }

    fn code(self) -> &'static str {
        match self {
            RankOutcome::Finished(_) => "",
            RankOutcome::DidNotFinish => "DNF",
            RankOutcome::DidNotStart => "DNS",
            RankOutcome::Disqualified => "DSQ",
            RankOutcome::OutsideTimeLimit => "OTL",
        }
    }
}

impl std::str::FromStr for RankOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DNF" => Ok(RankOutcome::DidNotFinish),
            "DNS" => Ok(RankOutcome::DidNotStart),
            "DSQ" => Ok(RankOutcome::Disqualified),
            "OTL" => Ok(RankOutcome::OutsideTimeLimit),
            other => match other.parse::<u32>() {
                Ok(r) if r >= 1 => Ok(RankOutcome::Finished(r)),
                _ => Err(format!("unrecognized rank value: {s:?}")),
            },
        }
    }
}

impl Serialize for RankOutcome {
    fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
        match self {
            RankOutcome::Finished(r) => ser.serialize_u32(*r),
            other => ser.serialize_str(other.code()),
        }
    }
}

impl<'de> Deserialize<'de> for RankOutcome {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(i64),
            Text(String),
        }
        match Raw::deserialize(de)? {
            Raw::Num(n) if n >= 1 => Ok(RankOutcome::Finished(n as u32)),
            Raw::Num(n) => Err(serde::de::Error::custom(format!(
                "rank must be a positive integer, got {n}"
            ))),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Career specialty points, one field per PCS category.
///
/// A fixed record instead of a grab-bag map: missing categories default to
/// zero and unknown categories are rejected at the boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecialtyPoints {
    #[serde(default)]
    pub one_day: f64,
    #[serde(default)]
    pub gc: f64,
    #[serde(default)]
    pub time_trial: f64,
    #[serde(default)]
    pub sprint: f64,
    #[serde(default)]
    pub climber: f64,
}

impl SpecialtyPoints {
    pub fn one_day(one_day: f64) -> Self {
        Self {
            one_day,
            ..Self::default()
        }
    }
}

/// Static rider profile: birthdate plus career specialty points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiderProfile {
    #[serde(default, with = "loose_date")]
    pub birthdate: Option<NaiveDate>,
    #[serde(default)]
    pub points: SpecialtyPoints,
}

impl RiderProfile {
    /// Age in whole years at `reference`, `None` when the birthdate is unknown.
    pub fn age_on(&self, reference: NaiveDate) -> Option<i32> {
        let bd = self.birthdate?;
        let mut age = reference.year() - bd.year();
        if (reference.month(), reference.day()) < (bd.month(), bd.day()) {
            age -= 1;
        }
        Some(age)
    }
}

/// One line of a rider's results history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// `None` when the exported date string did not parse; scorers skip it.
    #[serde(default, with = "loose_date")]
    pub date: Option<NaiveDate>,
    pub outcome: RankOutcome,
    /// Race or stage reference, e.g. `"race/paris-roubaix/2024"`.
    pub race_ref: String,
    /// Race class label as exported, e.g. `"1.UWT"`, `"1.Pro"`, `"WC"`.
    #[serde(default)]
    pub class: String,
}

impl ResultRecord {
    /// Build from a raw date string (`YYYY-M-D`, zero padding optional).
    pub fn new(
        date: &str,
        outcome: RankOutcome,
        race_ref: impl Into<String>,
        class: impl Into<String>,
    ) -> Self {
        Self {
            date: parse_loose_date(date),
            outcome,
            race_ref: race_ref.into(),
            class: class.into(),
        }
    }
}

/// Everything the scorers need for one rider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiderRecord {
    #[serde(default)]
    pub profile: RiderProfile,
    #[serde(default)]
    pub results: Vec<ResultRecord>,
    /// Team slug, e.g. `"lidl-trek"`. `None` scores neutral.
    #[serde(default)]
    pub team: Option<String>,
}

/// Startlist entry: stable identity plus a display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: String,
    pub name: String,
}

impl RosterEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Parse `YYYY-M-D` (padding optional, as in PCS exports). `None` on any
/// malformed input; callers treat that as a record to skip.
pub fn parse_loose_date(s: &str) -> Option<NaiveDate> {
    let mut parts = s.trim().splitn(3, '-');
    let y: i32 = parts.next()?.parse().ok()?;
    let m: u32 = parts.next()?.parse().ok()?;
    let d: u32 = parts.next()?.parse().ok()?;
    NaiveDate::from_ymd_opt(y, m, d)
}

/// Serde adapter for optional loose dates (serialized back as ISO).
mod loose_date {
    use super::*;

    pub fn serialize<S: Serializer>(v: &Option<NaiveDate>, ser: S) -> Result<S::Ok, S::Error> {
        match v {
            Some(d) => ser.serialize_str(&d.format("%Y-%m-%d").to_string()),
            None => ser.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(de)?;
        Ok(raw.as_deref().and_then(parse_loose_date))
    }
}
