//! Season-scoped condition signals: preparation volume and injury/illness
//! indicators.
//!
//! The tuning constants below were fitted against a specific historical
//! season; they are exposed as named constants rather than inferred.

use chrono::{Datelike, NaiveDate};

use crate::rider::ResultRecord;

/// Month/day a healthy classics rider is expected to have opened the season by.
pub const EXPECTED_SEASON_OPENER: (u32, u32) = (1, 25);
/// Calendar gap (days) beyond which a hole in the program looks like a setback.
pub const GAP_THRESHOLD_DAYS: i64 = 28;
/// Window (days) in which non-finishes count as a recent red flag.
pub const RECENT_NONFINISH_WINDOW_DAYS: i64 = 30;
/// Hard floor of the injury indicator.
pub const INJURY_FLOOR: f64 = 0.3;

fn season_start(race_date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(race_date.year(), 1, 1).expect("Jan 1 exists in every year")
}

/// Dated results from the current season strictly before the race, sorted.
fn season_results(results: &[ResultRecord], race_date: NaiveDate) -> Vec<(NaiveDate, &ResultRecord)> {
    let start = season_start(race_date);
    let mut out: Vec<(NaiveDate, &ResultRecord)> = results
        .iter()
        .filter_map(|r| r.date.map(|d| (d, r)))
        .filter(|(d, _)| *d >= start && *d < race_date)
        .collect();
    out.sort_by_key(|(d, _)| *d);
    out
}

/// Season preparation level: race days before the classic against a target
/// band that widens as the season progresses.
///
/// A race ~90 days into the year wants 20-35 race days; an autumn classic
/// ~270 days in wants 50-70. Under the band is underprepared (linear ramp,
/// floor 0.1), over it is creeping fatigue (floor 0.3).
pub fn preparation(results: &[ResultRecord], race_date: NaiveDate) -> f64 {
    let race_days = season_results(results, race_date).len() as i64;

    let days_into_season = (race_date - season_start(race_date)).num_days();
    let optimal_low = ((days_into_season as f64 * 0.20) as i64).max(10);
    let optimal_high = ((days_into_season as f64 * 0.35) as i64).max(20);

    if (optimal_low..=optimal_high).contains(&race_days) {
        1.0
    } else if race_days < optimal_low {
        (race_days as f64 / optimal_low as f64).max(0.1)
    } else {
        let excess = (race_days - optimal_high) as f64;
        (1.0 - excess * 0.02).max(0.3)
    }
}

/// Injury/illness indicator: 1.0 (no signs) down to 0.3 (severe).
///
/// Penalizes a late season start, calendar gaps beyond
/// `GAP_THRESHOLD_DAYS`, and non-finishes in the last
/// `RECENT_NONFINISH_WINDOW_DAYS`. No season racing at all returns the
/// floor outright.
pub fn injury_indicator(results: &[ResultRecord], race_date: NaiveDate) -> f64 {
    let season = season_results(results, race_date);
    if season.is_empty() {
        return INJURY_FLOOR; // no races this season = major red flag
    }

    let mut penalty = 1.0f64;

    // Late season start: each week of delay costs ~5%.
    let (open_month, open_day) = EXPECTED_SEASON_OPENER;
    let expected_start = NaiveDate::from_ymd_opt(race_date.year(), open_month, open_day)
        .expect("season opener date is valid");
    let first_race = season[0].0;
    if first_race > expected_start {
        let delay = (first_race - expected_start).num_days() as f64;
        penalty *= (1.0 - delay * 0.007).max(0.5);
    }

    // Calendar gaps; longer gaps are more concerning.
    for pair in season.windows(2) {
        let gap = (pair[1].0 - pair[0].0).num_days();
        if gap > GAP_THRESHOLD_DAYS {
            penalty *= (1.0 - (gap - GAP_THRESHOLD_DAYS) as f64 * 0.003).max(0.85);
        }
    }

    // Recent non-finishes.
    let recent_cutoff = race_date - chrono::Days::new(RECENT_NONFINISH_WINDOW_DAYS as u64);
    let dnf_count = season
        .iter()
        .filter(|(d, r)| *d >= recent_cutoff && !r.outcome.is_finish())
        .count();
    if dnf_count > 0 {
        penalty *= (1.0 - dnf_count as f64 * 0.12).max(0.6);
    }

    penalty.max(INJURY_FLOOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rider::RankOutcome;

    fn race_date() -> NaiveDate {
        // ~100 days into the season → band is [20, 35].
        NaiveDate::from_ymd_opt(2025, 4, 11).unwrap()
    }

    fn finish_on(date: &str, rank: u32) -> ResultRecord {
        ResultRecord::new(date, RankOutcome::Finished(rank), "race/x/2025", "1.UWT")
    }

    fn n_race_days(n: usize) -> Vec<ResultRecord> {
        // One race day per day starting Jan 25.
        let start = NaiveDate::from_ymd_opt(2025, 1, 25).unwrap();
        (0..n)
            .map(|i| {
                let d = start + chrono::Days::new(i as u64);
                finish_on(&d.format("%Y-%m-%d").to_string(), 10)
            })
            .collect()
    }

    #[test]
    fn in_band_preparation_is_full() {
        assert_eq!(preparation(&n_race_days(25), race_date()), 1.0);
    }

    #[test]
    fn underprepared_ramps_up_with_floor() {
        let few = preparation(&n_race_days(5), race_date());
        let more = preparation(&n_race_days(12), race_date());
        assert!(few < more && more < 1.0);
        assert!(preparation(&[], race_date()) >= 0.1);
    }

    #[test]
    fn overraced_decays_with_floor() {
        let over = preparation(&n_race_days(45), race_date());
        assert!(over < 1.0);
        assert!(preparation(&n_race_days(75), race_date()) >= 0.3);
    }

    #[test]
    fn no_season_results_hits_the_floor() {
        assert_eq!(injury_indicator(&[], race_date()), INJURY_FLOOR);
        // Last season's races don't count.
        let old = vec![finish_on("2024-4-7", 1)];
        assert_eq!(injury_indicator(&old, race_date()), INJURY_FLOOR);
    }

    #[test]
    fn clean_season_scores_full() {
        let results = vec![
            finish_on("2025-1-24", 8),
            finish_on("2025-2-10", 5),
            finish_on("2025-3-5", 3),
            finish_on("2025-3-28", 2),
        ];
        assert_eq!(injury_indicator(&results, race_date()), 1.0);
    }

    #[test]
    fn late_start_is_penalized() {
        let late = vec![finish_on("2025-3-10", 5), finish_on("2025-3-28", 5)];
        let on_time = vec![finish_on("2025-1-20", 5), finish_on("2025-2-10", 5), finish_on("2025-3-5", 5), finish_on("2025-3-28", 5)];
        assert!(injury_indicator(&late, race_date()) < injury_indicator(&on_time, race_date()));
    }

    #[test]
    fn recent_dnfs_are_penalized() {
        let mut results = vec![
            finish_on("2025-1-24", 8),
            finish_on("2025-2-10", 5),
            finish_on("2025-3-5", 3),
        ];
        let clean = injury_indicator(&results, race_date());
        results.push(ResultRecord::new(
            "2025-4-2",
            RankOutcome::DidNotFinish,
            "race/y/2025",
            "1.UWT",
        ));
        let flagged = injury_indicator(&results, race_date());
        assert!(flagged < clean);
    }

    #[test]
    fn indicator_never_drops_below_floor() {
        // Late start + gaps + a pile of recent DNFs.
        let mut results = vec![finish_on("2025-3-20", 60)];
        for day in ["2025-3-25", "2025-3-30", "2025-4-2", "2025-4-5", "2025-4-8"] {
            results.push(ResultRecord::new(
                day,
                RankOutcome::DidNotFinish,
                "race/y/2025",
                "1.UWT",
            ));
        }
        assert!(injury_indicator(&results, race_date()) >= INJURY_FLOOR);
    }
}
