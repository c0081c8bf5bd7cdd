//! Recent race form and form trajectory (momentum).

use chrono::NaiveDate;

use crate::rider::ResultRecord;

/// Trailing window for the recent-form score, in days.
pub const FORM_WINDOW_DAYS: i64 = 90;

/// Momentum buckets: last 30 days vs 30-60 days ago.
pub const MOMENTUM_RECENT_DAYS: i64 = 30;
pub const MOMENTUM_EARLIER_DAYS: i64 = 60;

/// Result quality from a finishing rank: 1st = 1.0, decaying by `decay`
/// per place, floored at 0.
pub(crate) fn rank_quality(rank: u32, decay: f64) -> f64 {
    (1.0 - (rank as f64 - 1.0) * decay).max(0.0)
}

/// Race class weight from the exported label. WorldTour and Worlds results
/// count extra, pro-level races count full, everything else is discounted.
pub(crate) fn class_weight(label: &str) -> f64 {
    if label.contains("UWT") || label.contains("WC") {
        1.3
    } else if label.contains("Pro") || label.contains("1.") {
        1.0
    } else {
        0.7
    }
}

/// Weighted average of result quality over the trailing window before
/// `race_date`.
///
/// Per result: recency weight decays linearly from 1.0 (race day) to 0.5
/// (window edge); class weight per `class_weight`; quality 0.05-per-place
/// decay, with non-finishes contributing zero quality at full weight.
/// Returns 0.0 when nothing falls inside the window.
pub fn recent_form(results: &[ResultRecord], race_date: NaiveDate, window_days: i64) -> f64 {
    let mut total_score = 0.0;
    let mut total_weight = 0.0;

    for r in results {
        let rdate = match r.date {
            Some(d) => d,
            None => continue,
        };
        let days_ago = (race_date - rdate).num_days();
        if days_ago <= 0 || days_ago > window_days {
            continue;
        }

        let recency_w = 1.0 - (days_ago as f64 / window_days as f64) * 0.5;
        let class_w = class_weight(&r.class);
        let quality = match r.outcome.rank() {
            Some(rank) => rank_quality(rank, 0.05),
            None => 0.0, // DNF, DNS, DSQ, OTL
        };

        let weight = recency_w * class_w;
        total_score += quality * weight;
        total_weight += weight;
    }

    if total_weight > 0.0 {
        total_score / total_weight
    } else {
        0.0
    }
}

/// Form trajectory: improving vs declining.
///
/// Compares mean quality in the last 30 days against 30-60 days ago
/// (numeric ranks only). An upward trajectory scores higher, and recent
/// podiums add a capped confidence bonus. Returns 0.3 when the rider has no
/// numeric result in the last 30 days.
pub fn momentum(results: &[ResultRecord], race_date: NaiveDate) -> f64 {
    let mut recent = Vec::new();
    let mut earlier = Vec::new();

    for r in results {
        let rdate = match r.date {
            Some(d) => d,
            None => continue,
        };
        let days_ago = (race_date - rdate).num_days();
        if days_ago <= 0 {
            continue;
        }
        let rank = match r.outcome.rank() {
            Some(rank) => rank,
            None => continue,
        };
        let quality = rank_quality(rank, 0.05);
        if days_ago <= MOMENTUM_RECENT_DAYS {
            recent.push(quality);
        } else if days_ago <= MOMENTUM_EARLIER_DAYS {
            earlier.push(quality);
        }
    }

    if recent.is_empty() {
        return 0.3; // no recent activity = low momentum
    }

    let recent_avg = recent.iter().sum::<f64>() / recent.len() as f64;

    let trajectory_score = if earlier.is_empty() {
        0.5 // no comparison data
    } else {
        let earlier_avg = earlier.iter().sum::<f64>() / earlier.len() as f64;
        (0.5 + (recent_avg - earlier_avg) * 0.5).clamp(0.0, 1.0)
    };

    // Top-3-grade results in the recent bucket.
    let podium_count = recent.iter().filter(|&&q| q >= 0.85).count();
    let podium_bonus = (podium_count as f64 * 0.1).min(0.3);

    let score = recent_avg * 0.5 + trajectory_score * 0.3 + podium_bonus / 0.3 * 0.2;
    score.clamp(0.0, 1.0)
}
