//! Deterministic "AI" annotation for a mood/stress pair.
//!
//! The annotation is chosen once when a record is created and stored with
//! it; it is never recomputed from revealed values.

/// Canned responses indexed by bucket.
pub const ANNOTATIONS: [&str; 5] = [
    "I notice you're feeling a bit low today. Remember, it's okay to not be okay.",
    "Your stress levels seem elevated. Have you tried deep breathing exercises?",
    "You appear to be in a balanced state. Keep up your self-care routine!",
    "I detect some emotional turbulence. Would you like to talk about what's bothering you?",
    "Your mood seems positive today! Celebrate these good moments.",
];

/// Lower bounds (inclusive) of buckets 1 through 4.
const BUCKET_THRESHOLDS: [f64; 4] = [3.0, 5.0, 7.0, 9.0];

/// `0.7 * mood + 0.3 * (10 - stress)`.
pub fn weighted_score(mood: f64, stress: f64) -> f64 {
    (mood * 0.7) + ((10.0 - stress) * 0.3)
}

/// Maps a weighted score to a bucket in `0..=4`.
pub fn bucket_for_score(weighted: f64) -> usize {
    BUCKET_THRESHOLDS
        .iter()
        .take_while(|threshold| weighted >= **threshold)
        .count()
}

/// Returns the annotation for one mood/stress pair.
pub fn score(mood: f64, stress: f64) -> &'static str {
    ANNOTATIONS[bucket_for_score(weighted_score(mood, stress))]
}

#[cfg(test)]
mod tests {
    use super::{bucket_for_score, score, weighted_score, ANNOTATIONS};

    #[test]
    fn extremes_land_in_outer_buckets() {
        assert_eq!(score(10.0, 0.0), ANNOTATIONS[4]);
        assert_eq!(score(0.0, 10.0), ANNOTATIONS[0]);
    }

    #[test]
    fn thresholds_are_inclusive_lower_bounds() {
        assert_eq!(bucket_for_score(2.999), 0);
        assert_eq!(bucket_for_score(3.0), 1);
        assert_eq!(bucket_for_score(4.999), 1);
        assert_eq!(bucket_for_score(5.0), 2);
        assert_eq!(bucket_for_score(7.0), 3);
        assert_eq!(bucket_for_score(8.999), 3);
        assert_eq!(bucket_for_score(9.0), 4);
        assert_eq!(bucket_for_score(f64::MAX), 4);
        assert_eq!(bucket_for_score(-1.0), 0);
    }

    #[test]
    fn neutral_entry_is_balanced() {
        // 3.5 + 1.5
        assert_eq!(weighted_score(5.0, 5.0), 5.0);
        assert_eq!(score(5.0, 5.0), ANNOTATIONS[2]);
    }

    #[test]
    fn nan_score_falls_to_lowest_bucket() {
        assert_eq!(bucket_for_score(f64::NAN), 0);
    }
}
