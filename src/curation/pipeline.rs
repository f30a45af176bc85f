//! Clip list pipeline: viewer partition, denial filtering, sorting and pagination.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::aggregate::ClipRatings;
use super::denial::{is_eligible_for_export, DenyThreshold};
use crate::models::{Clip, User};

/// Page size of the clip viewer grid.
pub const CLIP_VIEWER_PAGE_SIZE: usize = 6;
/// Page size of the admin user list.
pub const USER_LIST_PAGE_SIZE: usize = 15;
/// Page size of the denied clip lists.
pub const DENIAL_LIST_PAGE_SIZE: usize = 9;

/// Orderings available to clip lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum SortOption {
    #[default]
    Newest,
    Oldest,
    HighestUpvotes,
    LowestUpvotes,
    HighestDownvotes,
    LowestDownvotes,
    HighestRatio,
    LowestRatio,
}

#[cfg(test)]
impl SortOption {
    pub const ALL: [SortOption; 8] = [
        SortOption::Newest,
        SortOption::Oldest,
        SortOption::HighestUpvotes,
        SortOption::LowestUpvotes,
        SortOption::HighestDownvotes,
        SortOption::LowestDownvotes,
        SortOption::HighestRatio,
        SortOption::LowestRatio,
    ];
}

/// Sort clips in place. Stable, so ties keep their input order.
pub fn sort_clips(clips: &mut [Clip], option: SortOption) {
    match option {
        SortOption::Newest => clips.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOption::Oldest => clips.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortOption::HighestUpvotes => clips.sort_by(|a, b| b.upvotes.cmp(&a.upvotes)),
        SortOption::LowestUpvotes => clips.sort_by(|a, b| a.upvotes.cmp(&b.upvotes)),
        SortOption::HighestDownvotes => clips.sort_by(|a, b| b.downvotes.cmp(&a.downvotes)),
        SortOption::LowestDownvotes => clips.sort_by(|a, b| a.downvotes.cmp(&b.downvotes)),
        SortOption::HighestRatio => clips.sort_by(|a, b| b.ratio().total_cmp(&a.ratio())),
        SortOption::LowestRatio => clips.sort_by(|a, b| a.ratio().total_cmp(&b.ratio())),
    }
}

/// One page of a list.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page index that was requested.
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Slice out a 1-based page. Pages outside `1..=total_pages` are empty.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let total_items = items.len();
    let total_pages = if page_size == 0 {
        0
    } else {
        total_items.div_ceil(page_size)
    };

    let slice = if page == 0 || page > total_pages {
        &[][..]
    } else {
        let start = (page - 1) * page_size;
        let end = (start + page_size).min(total_items);
        &items[start..end]
    };

    Page {
        items: slice.to_vec(),
        page,
        page_size,
        total_items,
        total_pages,
    }
}

/// Clips split by whether the viewer has rated them.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub rated: Vec<Clip>,
    pub unrated: Vec<Clip>,
}

/// Split clips into rated and unrated for the viewer.
///
/// Only viewers allowed to rate see a rated list; everyone else gets every
/// clip as unrated.
pub fn partition_by_viewer(
    clips: Vec<Clip>,
    ratings: &HashMap<String, ClipRatings>,
    viewer: Option<&User>,
) -> Partition {
    let Some(viewer) = viewer.filter(|v| v.can_rate()) else {
        return Partition {
            rated: Vec::new(),
            unrated: clips,
        };
    };

    let (rated, unrated) = clips.into_iter().partition(|clip| {
        ratings
            .get(&clip.id)
            .is_some_and(|r| r.has_user_rated(&viewer.id))
    });

    Partition { rated, unrated }
}

/// Clips whose deny votes have reached the threshold.
pub fn denied_clips(
    clips: &[Clip],
    ratings: &HashMap<String, ClipRatings>,
    threshold: DenyThreshold,
) -> Vec<Clip> {
    clips
        .iter()
        .filter(|clip| {
            ratings
                .get(&clip.id)
                .is_some_and(|r| r.is_denied(threshold))
        })
        .cloned()
        .collect()
}

/// Clips that may go into the highlight export.
pub fn eligible_clips(
    clips: &[Clip],
    ratings: &HashMap<String, ClipRatings>,
    threshold: DenyThreshold,
) -> Vec<Clip> {
    clips
        .iter()
        .filter(|clip| {
            ratings
                .get(&clip.id)
                .map_or(true, |r| is_eligible_for_export(&r.buckets, threshold))
        })
        .cloned()
        .collect()
}
