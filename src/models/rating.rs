//! Rating models matching the remote `/ratings/:clipId` payload.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the rating literals a curator can cast on a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRatingLabel", into = "String")]
pub enum RatingLabel {
    One,
    Two,
    Three,
    Four,
    Deny,
}

impl RatingLabel {
    #[cfg(test)]
    pub const ALL: [RatingLabel; 5] = [
        RatingLabel::One,
        RatingLabel::Two,
        RatingLabel::Three,
        RatingLabel::Four,
        RatingLabel::Deny,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RatingLabel::One => "1",
            RatingLabel::Two => "2",
            RatingLabel::Three => "3",
            RatingLabel::Four => "4",
            RatingLabel::Deny => "deny",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "1" => Some(RatingLabel::One),
            "2" => Some(RatingLabel::Two),
            "3" => Some(RatingLabel::Three),
            "4" => Some(RatingLabel::Four),
            "deny" => Some(RatingLabel::Deny),
            _ => None,
        }
    }

    /// Numeric score, `None` for a deny vote.
    pub fn score(&self) -> Option<u8> {
        match self {
            RatingLabel::One => Some(1),
            RatingLabel::Two => Some(2),
            RatingLabel::Three => Some(3),
            RatingLabel::Four => Some(4),
            RatingLabel::Deny => None,
        }
    }
}

impl fmt::Display for RatingLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RatingLabel> for String {
    fn from(label: RatingLabel) -> Self {
        label.as_str().to_string()
    }
}

/// Wire form of a rating label: the remote API sends both `"2"` and `2`.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawRatingLabel {
    Number(i64),
    Text(String),
}

impl TryFrom<RawRatingLabel> for RatingLabel {
    type Error = String;

    fn try_from(raw: RawRatingLabel) -> Result<Self, Self::Error> {
        let text = match raw {
            RawRatingLabel::Number(n) => n.to_string(),
            RawRatingLabel::Text(s) => s,
        };
        RatingLabel::parse(&text).ok_or_else(|| format!("unknown rating label '{}'", text))
    }
}

/// A user who cast a rating.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RatingUser {
    pub user_id: String,
    pub username: String,
}

/// One rating bucket: a label, its count and the users who cast it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RatingBucket {
    pub rating: RatingLabel,
    /// Count as reported by the remote API; trusted over `users.len()`.
    pub count: u32,
    #[serde(default)]
    pub users: Vec<RatingUser>,
}

/// Request body for rating a clip.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateClipRequest {
    pub rating: RatingLabel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_accepts_number_and_string() {
        let bucket: RatingBucket = serde_json::from_value(serde_json::json!({
            "rating": 3, "count": 2, "users": []
        }))
        .unwrap();
        assert_eq!(bucket.rating, RatingLabel::Three);

        let bucket: RatingBucket = serde_json::from_value(serde_json::json!({
            "rating": "deny", "count": 1
        }))
        .unwrap();
        assert_eq!(bucket.rating, RatingLabel::Deny);
        assert!(bucket.users.is_empty());
    }

    #[test]
    fn test_label_rejects_unknown_value() {
        let result: Result<RatingLabel, _> = serde_json::from_value(serde_json::json!("5"));
        assert!(result.is_err());
    }

    #[test]
    fn test_label_serializes_as_string() {
        assert_eq!(serde_json::to_value(RatingLabel::Two).unwrap(), "2");
        assert_eq!(serde_json::to_value(RatingLabel::Deny).unwrap(), "deny");
    }
}
