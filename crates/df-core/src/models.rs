//! # Domain Models
//!
//! These structs represent the core entities of DevForum.
//! Identifiers are UUID v7 (time-ordered, globally unique); the `Comment`
//! type doubles as the owned, nested snapshot handed to callers.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::vote::{Votable, VoteDirection, VoteTally};

/// A forum member. Referenced by posts and comments, never owned by them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub id: Uuid,
    pub username: String,
    /// Single glyph shown next to the username
    pub avatar: String,
    /// Cumulative reputation score
    pub karma: i64,
    /// Account creation date
    pub cake_day: NaiveDate,
}

/// A named community (e.g. "programming"). Static reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Community {
    pub name: String,
    pub members: u64,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    #[default]
    Text,
    Link,
    Image,
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostKind::Text => f.write_str("text"),
            PostKind::Link => f.write_str("link"),
            PostKind::Image => f.write_str("image"),
        }
    }
}

impl FromStr for PostKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(PostKind::Text),
            "link" => Ok(PostKind::Link),
            "image" => Ok(PostKind::Image),
            other => Err(AppError::ValidationError(format!("unknown post kind '{other}'"))),
        }
    }
}

/// A submission to a community.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub kind: PostKind,
    /// External target; always present on link posts
    pub url: Option<String>,
    pub author: Arc<Author>,
    /// Name of the owning `Community`
    pub community: String,
    pub upvotes: u32,
    pub downvotes: u32,
    /// The acting voter's choice, if any
    pub user_vote: Option<VoteDirection>,
    /// Total number of comments in the post's forest, replies included
    pub comment_count: u32,
    pub created_at: DateTime<Utc>,
    pub awards: u32,
    pub saved: bool,
}

impl Votable for Post {
    fn tally(&self) -> VoteTally {
        VoteTally {
            upvotes: self.upvotes,
            downvotes: self.downvotes,
            choice: self.user_vote,
        }
    }

    fn set_tally(&mut self, tally: VoteTally) {
        self.upvotes = tally.upvotes;
        self.downvotes = tally.downvotes;
        self.user_vote = tally.choice;
    }
}

/// A comment together with its replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub author: Arc<Author>,
    pub upvotes: u32,
    pub downvotes: u32,
    pub user_vote: Option<VoteDirection>,
    pub created_at: DateTime<Utc>,
    /// Replies in insertion order
    pub replies: Vec<Comment>,
    /// Indentation level as assigned under the forest's `ReplyLevels` policy
    pub level: u32,
    /// Number of ancestors; 0 for a top-level comment
    pub depth: u32,
    pub parent_id: Option<Uuid>,
}

impl Comment {
    /// A fresh top-level comment with no votes and no replies.
    pub fn new(id: Uuid, author: Arc<Author>, content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            content: content.into(),
            author,
            upvotes: 0,
            downvotes: 0,
            user_vote: None,
            created_at,
            replies: Vec::new(),
            level: 0,
            depth: 0,
            parent_id: None,
        }
    }

    /// Depth-first pre-order search through this comment and its replies.
    pub fn find(&self, id: Uuid) -> Option<&Comment> {
        if self.id == id {
            return Some(self);
        }
        self.replies.iter().find_map(|reply| reply.find(id))
    }

    /// Ids of this comment and every descendant, in depth-first pre-order.
    pub fn subtree_ids(&self) -> Vec<Uuid> {
        let mut ids = vec![self.id];
        for reply in &self.replies {
            ids.extend(reply.subtree_ids());
        }
        ids
    }

    /// Number of comments in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.replies.iter().map(Comment::subtree_len).sum::<usize>()
    }
}

impl Votable for Comment {
    fn tally(&self) -> VoteTally {
        VoteTally {
            upvotes: self.upvotes,
            downvotes: self.downvotes,
            choice: self.user_vote,
        }
    }

    fn set_tally(&mut self, tally: VoteTally) {
        self.upvotes = tally.upvotes;
        self.downvotes = tally.downvotes;
        self.user_vote = tally.choice;
    }
}

/// Input for `Registry::create_post`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub kind: PostKind,
    pub url: Option<String>,
    pub community: String,
}

/// What a vote request is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum VoteTarget {
    Post(Uuid),
    Comment(Uuid),
}

impl fmt::Display for VoteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteTarget::Post(id) => write!(f, "post {id}"),
            VoteTarget::Comment(id) => write!(f, "comment {id}"),
        }
    }
}
