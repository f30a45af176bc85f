//! Season labelling for the current rating round.

use chrono::{Datelike, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
}

impl Season {
    /// Meteorological season of a calendar month (1-12).
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Fall,
            _ => Season::Winter,
        }
    }
}

/// The season being curated and how many clips are in the current snapshot.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeasonInfo {
    pub season: Season,
    pub year: i32,
    pub label: String,
    pub clip_count: usize,
}

impl SeasonInfo {
    pub fn for_date(date: NaiveDate, clip_count: usize) -> Self {
        let season = Season::from_month(date.month());
        Self {
            season,
            year: date.year(),
            label: format!("{:?} {}", season, date.year()),
            clip_count,
        }
    }

    pub fn current(clip_count: usize) -> Self {
        Self::for_date(Utc::now().date_naive(), clip_count)
    }
}
