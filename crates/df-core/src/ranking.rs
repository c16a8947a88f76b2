//! # Ranking Engine
//!
//! Orders an already-filtered post collection under one of three policies.
//! Ranking is pure: it borrows the posts and takes `now` explicitly.
//!
//! All policies use a stable sort, so posts with equal keys keep the order
//! they were passed in (newest-submitted first when fed from the registry).

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::Post;
use crate::vote::Votable;

/// Gravity exponent of the hot formula.
pub const HOT_GRAVITY: f64 = 1.8;
/// Hours added to a post's age so brand-new posts keep a finite score.
pub const HOT_AGE_OFFSET_HOURS: f64 = 2.0;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortPolicy {
    /// Net score decayed by age
    #[default]
    Hot,
    /// Newest first
    New,
    /// Highest net score first
    Top,
}

impl fmt::Display for SortPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortPolicy::Hot => f.write_str("hot"),
            SortPolicy::New => f.write_str("new"),
            SortPolicy::Top => f.write_str("top"),
        }
    }
}

impl FromStr for SortPolicy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hot" => Ok(SortPolicy::Hot),
            "new" => Ok(SortPolicy::New),
            "top" => Ok(SortPolicy::Top),
            other => Err(AppError::ValidationError(format!("unknown sort policy '{other}'"))),
        }
    }
}

/// Fractional hours between `created_at` and `now`.
///
/// Clamped at zero so a post stamped slightly in the future (clock skew)
/// ranks as brand new instead of producing a NaN score.
pub fn age_hours(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = (now - created_at).num_milliseconds() as f64;
    (millis / MILLIS_PER_HOUR).max(0.0)
}

/// `net_score / (age_hours + 2)^1.8`
pub fn hot_score(net_score: i64, age_hours: f64) -> f64 {
    net_score as f64 / (age_hours + HOT_AGE_OFFSET_HOURS).powf(HOT_GRAVITY)
}

/// Hot score of a post as of `now`.
pub fn post_hot_score(post: &Post, now: DateTime<Utc>) -> f64 {
    hot_score(post.score(), age_hours(post.created_at, now))
}

/// Returns `posts` ordered best-first under `policy`.
pub fn rank<'a, I>(posts: I, policy: SortPolicy, now: DateTime<Utc>) -> Vec<&'a Post>
where
    I: IntoIterator<Item = &'a Post>,
{
    let mut ranked: Vec<&Post> = posts.into_iter().collect();
    match policy {
        SortPolicy::New => ranked.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortPolicy::Top => ranked.sort_by(|a, b| b.score().cmp(&a.score())),
        SortPolicy::Hot => {
            let mut keyed: Vec<(f64, &Post)> = ranked
                .into_iter()
                .map(|post| (post_hot_score(post, now), post))
                .collect();
            keyed.sort_by(|(a, _), (b, _)| descending(*a, *b));
            ranked = keyed.into_iter().map(|(_, post)| post).collect();
        }
    }
    ranked
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// Caller-side selection applied before ranking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFilter {
    /// `None` or `"all"` selects every community
    pub community: Option<String>,
    /// Case-insensitive substring matched against title and body
    pub search: Option<String>,
}

impl PostFilter {
    pub fn community(mut self, name: impl Into<String>) -> Self {
        self.community = Some(name.into());
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn matches(&self, post: &Post) -> bool {
        let community_ok = match self.community.as_deref() {
            None | Some("all") => true,
            Some(name) => post.community == name,
        };
        let search_ok = match self.search.as_deref() {
            None | Some("") => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                post.title.to_lowercase().contains(&needle)
                    || post.content.to_lowercase().contains(&needle)
            }
        };
        community_ok && search_ok
    }
}
