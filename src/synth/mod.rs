//! Helpers shared by the tools' mock result synthesizers.
//!
//! Every value produced here is random placeholder data. What is fixed is the
//! structure: scores are bucketed through static threshold tables and reason
//! strings are chosen by which thresholds a score crossed.

use rand::seq::SliceRandom;
use rand::Rng;

/// Score thresholds, highest first: the first entry whose minimum the score
/// reaches wins.
pub type Thresholds<L> = &'static [(u8, L)];

/// Reason strings attached when a score reaches the given minimum.
pub type ReasonTable = &'static [(u8, &'static str)];

pub fn bucket<L: Copy>(score: u8, thresholds: Thresholds<L>, fallback: L) -> L {
    thresholds
        .iter()
        .find(|(min, _)| score >= *min)
        .map(|(_, label)| *label)
        .unwrap_or(fallback)
}

/// All reasons whose threshold the score crossed, in table order.
pub fn reasons_for(score: u8, table: ReasonTable) -> Vec<String> {
    table
        .iter()
        .filter(|(min, _)| score >= *min)
        .map(|(_, reason)| reason.to_string())
        .collect()
}

pub fn score<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    rng.gen_range(0..=100)
}

/// Score skewed upward when `suspicious` is set, used to make obviously
/// shady inputs come out riskier on average.
pub fn biased_score<R: Rng + ?Sized>(rng: &mut R, suspicious: bool) -> u8 {
    if suspicious {
        rng.gen_range(45..=100)
    } else {
        score(rng)
    }
}

/// One item of a non-empty static table.
pub fn pick<R: Rng + ?Sized, T: Copy>(rng: &mut R, items: &[T]) -> T {
    items[rng.gen_range(0..items.len())]
}

/// Up to `max` distinct items, in random order.
pub fn pick_many<R: Rng + ?Sized>(rng: &mut R, items: &[&'static str], max: usize) -> Vec<String> {
    let n = rng.gen_range(0..=max.min(items.len()));
    items.choose_multiple(rng, n).map(|s| s.to_string()).collect()
}

/// Probability in percent, rounded to one decimal.
pub fn percent<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    (rng.gen_range(low..high) * 10.0).round() / 10.0
}

/// Short opaque id for a record within a session.
pub fn record_id(prefix: &str, index: usize) -> String {
    format!("{}-{:03}", prefix, index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const LEVELS: Thresholds<&str> = &[(70, "dangerous"), (40, "suspicious")];
    const REASONS: ReasonTable = &[(40, "odd sender"), (70, "known bad link"), (90, "credential form")];

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(bucket(100, LEVELS, "safe"), "dangerous");
        assert_eq!(bucket(70, LEVELS, "safe"), "dangerous");
        assert_eq!(bucket(69, LEVELS, "safe"), "suspicious");
        assert_eq!(bucket(40, LEVELS, "safe"), "suspicious");
        assert_eq!(bucket(39, LEVELS, "safe"), "safe");
        assert_eq!(bucket(0, LEVELS, "safe"), "safe");
    }

    #[test]
    fn test_reasons_follow_crossed_thresholds() {
        assert!(reasons_for(10, REASONS).is_empty());
        assert_eq!(reasons_for(75, REASONS), vec!["odd sender", "known bad link"]);
        assert_eq!(reasons_for(95, REASONS).len(), 3);
    }

    #[test]
    fn test_biased_score_floor() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert!(biased_score(&mut rng, true) >= 45);
            assert!(score(&mut rng) <= 100);
        }
    }

    #[test]
    fn test_pick_many_distinct_and_bounded() {
        let mut rng = StdRng::seed_from_u64(3);
        let items = &["a", "b", "c", "d"];
        for _ in 0..50 {
            let picked = pick_many(&mut rng, items, 3);
            assert!(picked.len() <= 3);
            let mut dedup = picked.clone();
            dedup.sort();
            dedup.dedup();
            assert_eq!(dedup.len(), picked.len());
        }
    }

    #[test]
    fn test_percent_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let p = percent(&mut rng, 60.0, 99.0);
            assert!((60.0..=99.0).contains(&p));
        }
    }

    #[test]
    fn test_record_id_format() {
        assert_eq!(record_id("PH", 0), "PH-001");
        assert_eq!(record_id("URL", 41), "URL-042");
    }
}
