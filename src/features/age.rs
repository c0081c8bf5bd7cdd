//! Age-distance suitability.
//!
//! Young riders tend to fade in the finale of long monuments (250+ km)
//! while seasoned pros peak there; shorter classics are open to a wider age
//! range. The optimum age therefore shifts upward with distance and the
//! tolerance narrows.

/// Gaussian age score around a distance-dependent optimum.
///
/// - 180 km classic: optimum ~26, broad tolerance
/// - 260 km monument: optimum ~29, narrower tolerance
/// - 300 km Milano-Sanremo: optimum ~31, narrow tolerance
///
/// Returns 0.5 (neutral) when the age is unknown.
pub fn age_distance_fit(age: Option<i32>, distance_km: f64) -> f64 {
    let age = match age {
        Some(a) => a as f64,
        None => return 0.5,
    };

    let optimal_age = 26.0 + (distance_km - 180.0) * 0.042;
    let sigma = (5.5 - (distance_km - 180.0) * 0.012).max(3.5);

    let mut score = (-0.5 * ((age - optimal_age) / sigma).powi(2)).exp();

    // Extra penalty for very young riders in long races: 20y → 0.7, 23y → 0.925.
    if age < 24.0 && distance_km >= 250.0 {
        let youth_penalty = (0.7 + (age - 20.0) * 0.075).clamp(0.5, 1.0);
        score *= youth_penalty;
    }

    score
}
