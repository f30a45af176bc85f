//! Per-curator rating performance.

use std::collections::HashMap;

use serde::Serialize;

use super::aggregate::ClipRatings;
use crate::models::{RatingLabel, User};

/// How many clips a curator rated, per rating label.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RatingCounter {
    #[serde(rename = "1")]
    pub one: u32,
    #[serde(rename = "2")]
    pub two: u32,
    #[serde(rename = "3")]
    pub three: u32,
    #[serde(rename = "4")]
    pub four: u32,
    pub deny: u32,
    pub total: u32,
}

impl RatingCounter {
    fn record(&mut self, label: RatingLabel) {
        match label {
            RatingLabel::One => self.one += 1,
            RatingLabel::Two => self.two += 1,
            RatingLabel::Three => self.three += 1,
            RatingLabel::Four => self.four += 1,
            RatingLabel::Deny => self.deny += 1,
        }
        self.total += 1;
    }
}

/// Rating activity of one curator over the current clip set.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserPerformance {
    pub user_id: String,
    pub username: String,
    pub counts: RatingCounter,
    /// Share of clips rated, 0 to 100 with two decimals.
    pub percentage_rated: f64,
}

/// Percentage of `clip_count` covered by `total`, rounded to two decimals.
/// No clips means nothing to rate, reported as 0.
pub fn percentage_rated(total: u32, clip_count: usize) -> f64 {
    if clip_count == 0 {
        return 0.0;
    }
    let raw = 100.0 * f64::from(total) / clip_count as f64;
    (raw * 100.0).round() / 100.0
}

/// Fold every clip's rating buckets into per-curator counters.
///
/// Only rating-eligible roster members are reported. Output is ordered by
/// `total` descending, ties in roster order.
pub fn aggregate_user_performance<'a>(
    records: impl IntoIterator<Item = &'a ClipRatings>,
    roster: &[User],
    clip_count: usize,
) -> Vec<UserPerformance> {
    let eligible: Vec<&User> = roster.iter().filter(|u| u.is_rating_eligible()).collect();
    let index: HashMap<&str, usize> = eligible
        .iter()
        .enumerate()
        .map(|(i, u)| (u.username.as_str(), i))
        .collect();

    let mut counters = vec![RatingCounter::default(); eligible.len()];

    for record in records {
        for bucket in &record.buckets {
            for voter in &bucket.users {
                if let Some(&i) = index.get(voter.username.as_str()) {
                    counters[i].record(bucket.rating);
                }
            }
        }
    }

    let mut performance: Vec<UserPerformance> = eligible
        .into_iter()
        .zip(counters)
        .map(|(user, counts)| {
            if counts.total as usize > clip_count {
                tracing::warn!(
                    "{} has {} ratings across {} clips; duplicate votes upstream?",
                    user.username,
                    counts.total,
                    clip_count
                );
            }
            UserPerformance {
                user_id: user.id.clone(),
                username: user.username.clone(),
                percentage_rated: percentage_rated(counts.total, clip_count),
                counts,
            }
        })
        .collect();

    performance.sort_by(|a, b| b.counts.total.cmp(&a.counts.total));
    performance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RatingBucket, RatingUser};

    fn user(username: &str, roles: serde_json::Value) -> User {
        serde_json::from_value(serde_json::json!({
            "id": format!("id-{}", username), "username": username, "roles": roles
        }))
        .unwrap()
    }

    fn voter(username: &str) -> RatingUser {
        RatingUser {
            user_id: format!("id-{}", username),
            username: username.to_string(),
        }
    }

    fn record(clip_id: &str, buckets: Vec<(RatingLabel, Vec<&str>)>) -> ClipRatings {
        ClipRatings::new(
            clip_id,
            buckets
                .into_iter()
                .map(|(rating, users)| RatingBucket {
                    rating,
                    count: users.len() as u32,
                    users: users.into_iter().map(voter).collect(),
                })
                .collect(),
        )
    }

    #[test]
    fn test_single_curator_scenario() {
        let records = vec![
            record("c1", vec![(RatingLabel::Two, vec!["A"])]),
            record("c2", vec![(RatingLabel::Two, vec!["A"])]),
            record("c3", vec![(RatingLabel::Two, vec!["A"])]),
            record("c4", vec![(RatingLabel::Deny, vec!["A"])]),
        ];
        let roster = vec![user("A", serde_json::json!(["clipteam"]))];

        let result = aggregate_user_performance(&records, &roster, 10);
        assert_eq!(result.len(), 1);
        let a = &result[0];
        assert_eq!(a.counts.total, 4);
        assert_eq!(a.counts.two, 3);
        assert_eq!(a.counts.deny, 1);
        assert_eq!(a.percentage_rated, 40.0);
    }

    #[test]
    fn test_roster_filtering_and_ordering() {
        let records = vec![
            record(
                "c1",
                vec![
                    (RatingLabel::One, vec!["low", "UploadBot"]),
                    (RatingLabel::Four, vec!["high", "ed", "stranger"]),
                ],
            ),
            record("c2", vec![(RatingLabel::Three, vec!["high"])]),
        ];
        let roster = vec![
            user("low", serde_json::json!(["admin"])),
            user("high", serde_json::json!(["clipteam"])),
            user("ed", serde_json::json!(["clipteam", "editor"])),
            user("UploadBot", serde_json::json!(["admin"])),
            user("plain", serde_json::json!(["user"])),
        ];

        let result = aggregate_user_performance(&records, &roster, 2);
        let names: Vec<&str> = result.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(names, ["high", "low"]);
        assert_eq!(result[0].counts.total, 2);
        assert_eq!(result[0].percentage_rated, 100.0);
        assert_eq!(result[1].percentage_rated, 50.0);
    }

    #[test]
    fn test_ties_keep_roster_order() {
        let roster = vec![
            user("b", serde_json::json!(["clipteam"])),
            user("a", serde_json::json!(["clipteam"])),
        ];
        let result = aggregate_user_performance(&[], &roster, 3);
        let names: Vec<&str> = result.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn test_percentage_without_clips_is_zero() {
        assert_eq!(percentage_rated(0, 0), 0.0);
        assert_eq!(percentage_rated(3, 0), 0.0);
        assert!(!percentage_rated(0, 0).is_nan());
    }

    #[test]
    fn test_percentage_stays_in_bounds() {
        for clip_count in 1..=12usize {
            for total in 0..=clip_count as u32 {
                let p = percentage_rated(total, clip_count);
                assert!((0.0..=100.0).contains(&p), "{} / {}", total, clip_count);
            }
        }
        assert_eq!(percentage_rated(1, 3), 33.33);
    }
}
