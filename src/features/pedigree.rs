//! Course history signals: pedigree in this exact race and last year's
//! results on similar terrain.

use chrono::{Datelike, NaiveDate};

use crate::rider::ResultRecord;

/// Editions of the target race considered for pedigree.
pub const PEDIGREE_YEARS_BACK: i32 = 5;

fn result_year(r: &ResultRecord) -> Option<i32> {
    r.date.map(|d| d.year())
}

/// Historical performance in this specific classic over the last
/// `years_back` editions.
///
/// Recent editions weigh more (`1/(1+years_ago·0.4)`); the rank decay is
/// gentler than recent form (0.018 per place) so a deep finish three years
/// ago still contributes. Returns 0.0 when the rider has never ridden the
/// race.
pub fn classic_pedigree(
    results: &[ResultRecord],
    race_base: &str,
    current_year: i32,
    years_back: i32,
) -> f64 {
    let mut total_score = 0.0;
    let mut total_weight = 0.0;

    for r in results {
        if !r.race_ref.contains(race_base) {
            continue;
        }
        let year = match result_year(r) {
            Some(y) => y,
            None => continue,
        };
        if year < current_year - years_back || year >= current_year {
            continue;
        }

        let years_ago = (current_year - year) as f64;
        let recency_w = 1.0 / (1.0 + years_ago * 0.4);
        let quality = match r.outcome.rank() {
            Some(rank) => (1.0 - (rank as f64 - 1.0) * 0.018).max(0.0),
            None => 0.0,
        };

        total_score += quality * recency_w;
        total_weight += recency_w;
    }

    if total_weight > 0.0 {
        total_score / total_weight
    } else {
        0.0
    }
}

/// Last year's result in this classic (60%) blended with the average
/// result across other classics on the same terrain that year (40%).
///
/// Only numeric ranks count here; `similar_bases` is the catalog's
/// same-terrain group and the target race itself is never double-counted.
pub fn previous_year(
    results: &[ResultRecord],
    race_base: &str,
    similar_bases: &[&str],
    current_year: i32,
) -> f64 {
    let prev_year = current_year - 1;
    let mut same_race_score = 0.0f64;
    let mut similar_scores = Vec::new();

    for r in results {
        if result_year(r) != Some(prev_year) {
            continue;
        }
        let rank = match r.outcome.rank() {
            Some(rank) => rank,
            None => continue,
        };
        let rank_score = (1.0 - (rank as f64 - 1.0) * 0.025).max(0.0);

        if r.race_ref.contains(race_base) {
            same_race_score = same_race_score.max(rank_score);
        } else if similar_bases
            .iter()
            .any(|base| *base != race_base && r.race_ref.contains(base))
        {
            similar_scores.push(rank_score);
        }
    }

    let similar_avg = if similar_scores.is_empty() {
        0.0
    } else {
        similar_scores.iter().sum::<f64>() / similar_scores.len() as f64
    };

    same_race_score * 0.6 + similar_avg * 0.4
}
