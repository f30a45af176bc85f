//! Denial classification against the configured deny threshold.

use serde::Serialize;

use crate::errors::AppError;
use crate::models::{RatingBucket, RatingLabel};

/// Minimum number of deny votes that disqualifies a clip. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DenyThreshold(u32);

impl DenyThreshold {
    pub fn new(value: i64) -> Result<Self, AppError> {
        u32::try_from(value)
            .ok()
            .filter(|v| *v > 0)
            .map(DenyThreshold)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "denyThreshold must be a positive integer, got {}",
                    value
                ))
            })
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// A clip is denied when its deny bucket has reached the threshold.
pub fn is_denied(buckets: &[RatingBucket], threshold: DenyThreshold) -> bool {
    buckets
        .iter()
        .any(|b| b.rating == RatingLabel::Deny && b.count >= threshold.get())
}

/// A clip may be exported when no bucket is a deny bucket at or above the threshold.
pub fn is_eligible_for_export(buckets: &[RatingBucket], threshold: DenyThreshold) -> bool {
    buckets
        .iter()
        .all(|b| b.rating != RatingLabel::Deny || b.count < threshold.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deny(count: u32) -> RatingBucket {
        RatingBucket {
            rating: RatingLabel::Deny,
            count,
            users: Vec::new(),
        }
    }

    fn score(rating: RatingLabel, count: u32) -> RatingBucket {
        RatingBucket {
            rating,
            count,
            users: Vec::new(),
        }
    }

    #[test]
    fn test_threshold_rejects_non_positive() {
        assert!(DenyThreshold::new(0).is_err());
        assert!(DenyThreshold::new(-3).is_err());
        assert_eq!(DenyThreshold::new(5).unwrap().get(), 5);
    }

    #[test]
    fn test_threshold_boundary() {
        let t = DenyThreshold::new(5).unwrap();
        assert!(is_denied(&[deny(5)], t));
        assert!(!is_denied(&[deny(4)], t));
        assert!(!is_eligible_for_export(&[deny(5)], t));
        assert!(is_eligible_for_export(&[deny(4)], t));
    }

    #[test]
    fn test_high_scores_never_deny() {
        let t = DenyThreshold::new(1).unwrap();
        let buckets = [score(RatingLabel::Four, 30), score(RatingLabel::One, 12)];
        assert!(!is_denied(&buckets, t));
        assert!(is_eligible_for_export(&buckets, t));
        assert!(!is_denied(&[], t));
    }

    #[test]
    fn test_denied_and_eligible_always_disagree() {
        let labels = RatingLabel::ALL;
        for threshold in 1..=6 {
            let t = DenyThreshold::new(threshold).unwrap();
            for deny_count in 0..=7 {
                for other in labels.iter().copied() {
                    for layout in 0..3 {
                        let buckets = match layout {
                            0 => vec![deny(deny_count)],
                            1 => vec![score(other, 3), deny(deny_count)],
                            _ => vec![score(other, deny_count), deny(1), deny(deny_count)],
                        };
                        assert_eq!(
                            is_denied(&buckets, t),
                            !is_eligible_for_export(&buckets, t),
                            "threshold={} buckets={:?}",
                            threshold,
                            buckets
                        );
                    }
                }
            }
        }
    }
}
