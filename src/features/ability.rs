//! Specialty-point signals: career ability profiles matched against the
//! race's terrain and finale characteristics.
//!
//! All point sums are log-normalized against a reference ceiling so the
//! difference between 0 and 1000 points matters more than 3000 vs 4000,
//! and clamped to 1.0 for riders above the ceiling.

use crate::catalog::Terrain;
use crate::rider::SpecialtyPoints;

/// Reference ceiling for one-day-race points (top classics riders sit ~4000+).
pub const REF_ONE_DAY: f64 = 4000.0;
/// Reference ceiling for pure sprint points.
pub const REF_SPRINT: f64 = 2000.0;
/// Reference ceiling for blended terrain profiles.
pub const REF_BLEND: f64 = 3500.0;

/// `ln(1+raw) / ln(1+reference)`, clamped to 1.0; 0 when raw is not positive.
fn log_norm(raw: f64, reference: f64) -> f64 {
    if raw <= 0.0 {
        return 0.0;
    }
    (raw.ln_1p() / reference.ln_1p()).min(1.0)
}

/// One-day-race specialty points against the reference ceiling.
pub fn specialty_score(points: &SpecialtyPoints) -> f64 {
    log_norm(points.one_day, REF_ONE_DAY)
}

/// How well the rider's specialty profile matches the race terrain.
///
/// Cobbles reward raw power and endurance; hilly courses scale climbing
/// ability by the course's climbing difficulty; flat-punch courses lean on
/// sprint points; mixed cobble-hill courses want all-rounders.
pub fn terrain_match(points: &SpecialtyPoints, terrain: Terrain, climbing_difficulty: f64) -> f64 {
    let SpecialtyPoints {
        one_day,
        gc,
        time_trial: tt,
        sprint,
        climber,
    } = *points;
    let cd = climbing_difficulty;

    let (raw, reference) = match terrain {
        Terrain::Cobbles => (one_day * 0.5 + tt * 0.35 + gc * 0.15, REF_ONE_DAY),
        Terrain::Hilly | Terrain::Mountainous => (
            one_day * (0.4 - cd * 0.15) + climber * cd * 0.5 + gc * cd * 0.3 + tt * (1.0 - cd) * 0.1,
            REF_BLEND,
        ),
        Terrain::FlatPunch => (one_day * 0.35 + sprint * 0.4 + tt * 0.15 + gc * 0.1, REF_BLEND),
        Terrain::CobblesHills => (
            one_day * 0.4 + tt * 0.2 + climber * 0.2 + gc * 0.1 + sprint * 0.1,
            REF_BLEND,
        ),
    };

    log_norm(raw, reference)
}

/// Sprint ability blended with one-day punch by the race's sprint-finish
/// probability: sprinters shine where bunch finishes are likely, solo
/// ability carries everywhere else.
pub fn sprint_capability(points: &SpecialtyPoints, sprint_finish_prob: f64) -> f64 {
    let sprint_score = log_norm(points.sprint, REF_SPRINT);
    let punch_score = log_norm(points.one_day, REF_ONE_DAY);
    sprint_score * sprint_finish_prob + punch_score * (1.0 - sprint_finish_prob)
}

/// Uphill-sprint (puncheur) ability, scaled by the uphill-finish
/// probability. Explosive climbing weighs highest, with one-day punch and
/// GC stamina behind it; flat finales fall back to generic one-day ability.
pub fn uphill_sprint(points: &SpecialtyPoints, uphill_finish_prob: f64) -> f64 {
    let raw = points.climber * 0.45 + points.one_day * 0.35 + points.gc * 0.20;
    let puncheur_score = log_norm(raw, REF_ONE_DAY);
    let generic_score = log_norm(points.one_day, REF_ONE_DAY);
    puncheur_score * uphill_finish_prob + generic_score * (1.0 - uphill_finish_prob)
}

/// Cobblestone ability, scaled by the race's cobble difficulty. Sustained
/// power (TT) and one-day endurance dominate, with a small sprint term for
/// the group-finish scenarios.
pub fn cobble_capability(points: &SpecialtyPoints, cobble_difficulty: f64) -> f64 {
    let raw = points.one_day * 0.45 + points.time_trial * 0.40 + points.sprint * 0.15;
    let cobble_score = log_norm(raw, REF_ONE_DAY);
    let generic_score = log_norm(points.one_day, REF_ONE_DAY);
    cobble_score * cobble_difficulty + generic_score * (1.0 - cobble_difficulty)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(one_day: f64, gc: f64, tt: f64, sprint: f64, climber: f64) -> SpecialtyPoints {
        SpecialtyPoints {
            one_day,
            gc,
            time_trial: tt,
            sprint,
            climber,
        }
    }

    #[test]
    fn specialty_is_zero_without_points() {
        assert_eq!(specialty_score(&SpecialtyPoints::default()), 0.0);
    }

    #[test]
    fn specialty_clamps_at_the_ceiling() {
        let over = specialty_score(&SpecialtyPoints::one_day(12_000.0));
        assert_eq!(over, 1.0);
        let at_ref = specialty_score(&SpecialtyPoints::one_day(REF_ONE_DAY));
        assert_eq!(at_ref, 1.0);
    }

    #[test]
    fn specialty_is_log_shaped() {
        let low = specialty_score(&SpecialtyPoints::one_day(200.0));
        let mid = specialty_score(&SpecialtyPoints::one_day(1000.0));
        // 0 → 1000 gains far more than 1000 → 4000 would linearly suggest.
        assert!(mid - low < low);
        assert!(low > 0.6 && mid > 0.8);
    }

    #[test]
    fn cobbles_reward_time_trial_power() {
        let tt_machine = pts(1000.0, 0.0, 2000.0, 0.0, 0.0);
        let climber = pts(1000.0, 0.0, 0.0, 0.0, 2000.0);
        assert!(
            terrain_match(&tt_machine, Terrain::Cobbles, 0.05)
                > terrain_match(&climber, Terrain::Cobbles, 0.05)
        );
    }

    #[test]
    fn hills_scale_with_climbing_difficulty() {
        let climber = pts(500.0, 500.0, 0.0, 0.0, 3000.0);
        let easy = terrain_match(&climber, Terrain::Hilly, 0.2);
        let hard = terrain_match(&climber, Terrain::Hilly, 0.85);
        assert!(hard > easy);
    }

    #[test]
    fn flat_punch_rewards_sprinters() {
        let sprinter = pts(800.0, 0.0, 0.0, 1800.0, 0.0);
        let rouleur = pts(800.0, 0.0, 400.0, 0.0, 0.0);
        assert!(
            terrain_match(&sprinter, Terrain::FlatPunch, 0.1)
                > terrain_match(&rouleur, Terrain::FlatPunch, 0.1)
        );
    }

    #[test]
    fn sprint_blend_follows_finish_probability() {
        let sprinter = pts(0.0, 0.0, 0.0, 1500.0, 0.0);
        // Pure sprinter: full value in a guaranteed sprint, nothing in a
        // race that never ends in one.
        let certain = sprint_capability(&sprinter, 1.0);
        let never = sprint_capability(&sprinter, 0.0);
        assert!(certain > 0.9);
        assert_eq!(never, 0.0);
    }

    #[test]
    fn uphill_finish_favors_puncheurs() {
        let puncheur = pts(1500.0, 800.0, 0.0, 0.0, 2500.0);
        let rouleur = pts(1500.0, 0.0, 1500.0, 300.0, 0.0);
        let up = uphill_sprint(&puncheur, 0.95);
        let flat = uphill_sprint(&rouleur, 0.95);
        assert!(up > flat);
        // With no uphill finish both collapse to generic one-day ability.
        assert_eq!(uphill_sprint(&puncheur, 0.0), uphill_sprint(&rouleur, 0.0));
    }

    #[test]
    fn cobble_blend_collapses_on_smooth_roads() {
        let specialist = pts(1000.0, 0.0, 2500.0, 200.0, 0.0);
        assert_eq!(
            cobble_capability(&specialist, 0.0),
            specialty_score(&specialist)
        );
        assert!(cobble_capability(&specialist, 1.0) > cobble_capability(&specialist, 0.3));
    }
}
