//! Client preferences persisted per owner.

use serde::{Deserialize, Serialize};

/// Maximum number of recent search strings kept per owner.
pub const MAX_RECENT_SEARCHES: usize = 5;

/// Colour theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Which half of the viewer partition the clip viewer shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RatedFilter {
    Rated,
    #[default]
    Unrated,
}

/// Preferences for one owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub theme: Theme,
    pub snow_effect: bool,
    /// Most recent first.
    pub recent_searches: Vec<String>,
    pub rated_filter: RatedFilter,
}

/// Partial update of preferences.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesRequest {
    #[serde(default)]
    pub theme: Option<Theme>,
    #[serde(default)]
    pub snow_effect: Option<bool>,
    #[serde(default)]
    pub recent_searches: Option<Vec<String>>,
    #[serde(default)]
    pub rated_filter: Option<RatedFilter>,
}
