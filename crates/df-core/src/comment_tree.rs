//! # Comment Tree
//!
//! An arena of comment nodes keyed by comment id. Each node records its
//! parent and the ordered ids of its replies, so a vote or an insertion is
//! an in-place update instead of a rebuild of the path from the root.
//!
//! Callers never see the arena: [`CommentForest::snapshot`] hands out an
//! owned, nested `Vec<Comment>` that later mutations cannot touch.

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Comment;
use crate::vote::{Votable, VoteDirection, VoteTally};

/// How reply levels are assigned on insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyLevels {
    /// Every reply is level 1, however deep it sits.
    #[default]
    Flat,
    /// A reply is one level below its parent.
    Nested,
}

impl FromStr for ReplyLevels {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" => Ok(ReplyLevels::Flat),
            "nested" => Ok(ReplyLevels::Nested),
            other => Err(AppError::ValidationError(format!(
                "unknown reply level policy '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
struct Node {
    /// `replies` is always empty here; structure lives in `children`
    comment: Comment,
    parent: Option<Uuid>,
    children: Vec<Uuid>,
}

/// The comment forest of a single post.
#[derive(Debug, Clone, Default)]
pub struct CommentForest {
    nodes: HashMap<Uuid, Node>,
    /// Top-level comments, most recent first
    roots: Vec<Uuid>,
    levels: ReplyLevels,
}

impl CommentForest {
    pub fn new(levels: ReplyLevels) -> Self {
        Self {
            levels,
            ..Self::default()
        }
    }

    pub fn reply_levels(&self) -> ReplyLevels {
        self.levels
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Owned snapshot of one comment and its replies.
    pub fn get(&self, id: Uuid) -> Option<Comment> {
        let depth = self.depth_of(id)?;
        Some(self.build(id, depth))
    }

    /// Number of ancestors of `id`.
    pub fn depth_of(&self, id: Uuid) -> Option<u32> {
        let mut node = self.nodes.get(&id)?;
        let mut depth = 0;
        while let Some(parent) = node.parent.and_then(|pid| self.nodes.get(&pid)) {
            depth += 1;
            node = parent;
        }
        Some(depth)
    }

    /// Applies a vote to the comment `id`. `None` if no such comment.
    pub fn apply_vote(&mut self, id: Uuid, direction: VoteDirection) -> Option<VoteTally> {
        let node = self.nodes.get_mut(&id)?;
        Some(node.comment.cast_vote(direction))
    }

    /// Places `comment` in the forest.
    ///
    /// With no parent the comment is prepended to the top level; otherwise
    /// it is appended to the parent's replies. Any replies already carried
    /// by `comment` are inserted beneath it in order. Levels and parent ids
    /// are assigned here according to the forest's `ReplyLevels`.
    ///
    /// Nothing is stored unless every comment in the incoming subtree has a
    /// consistent vote slot and a fresh id.
    pub fn insert(&mut self, parent_id: Option<Uuid>, mut comment: Comment) -> Result<()> {
        let level = match parent_id {
            None => 0,
            Some(pid) => {
                let parent = self
                    .nodes
                    .get(&pid)
                    .ok_or_else(|| AppError::not_found("comment", pid))?;
                match self.levels {
                    ReplyLevels::Flat => 1,
                    ReplyLevels::Nested => parent.comment.level + 1,
                }
            }
        };

        check_votes(&comment)?;
        let incoming = comment.subtree_ids();
        let mut fresh = HashSet::with_capacity(incoming.len());
        if let Some(dup) = incoming
            .iter()
            .find(|id| self.contains(**id) || !fresh.insert(**id))
        {
            return Err(AppError::Conflict(format!("comment {dup} already exists")));
        }

        let replies = std::mem::take(&mut comment.replies);
        let id = comment.id;
        comment.level = level;
        comment.parent_id = parent_id;

        match parent_id {
            None => self.roots.insert(0, id),
            Some(pid) => {
                if let Some(parent) = self.nodes.get_mut(&pid) {
                    parent.children.push(id);
                }
            }
        }
        self.nodes.insert(
            id,
            Node {
                comment,
                parent: parent_id,
                children: Vec::new(),
            },
        );

        for reply in replies {
            self.insert(Some(id), reply)?;
        }
        Ok(())
    }

    /// Detaches `id` and all of its descendants, returning them as an owned
    /// subtree.
    pub fn remove(&mut self, id: Uuid) -> Option<Comment> {
        let snapshot = self.get(id)?;
        let parent = self.nodes.get(&id).and_then(|n| n.parent);
        match parent {
            None => self.roots.retain(|r| *r != id),
            Some(pid) => {
                if let Some(p) = self.nodes.get_mut(&pid) {
                    p.children.retain(|c| *c != id);
                }
            }
        }
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                stack.extend(node.children);
            }
        }
        Some(snapshot)
    }

    /// Comment ids in depth-first pre-order, top level first.
    pub fn ids_preorder(&self) -> Vec<Uuid> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<Uuid> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(node) = self.nodes.get(&id) {
                stack.extend(node.children.iter().rev());
            }
        }
        order
    }

    /// The whole forest as owned nested comments.
    pub fn snapshot(&self) -> Vec<Comment> {
        self.roots.iter().map(|id| self.build(*id, 0)).collect()
    }

    fn build(&self, id: Uuid, depth: u32) -> Comment {
        let node = &self.nodes[&id];
        let mut comment = node.comment.clone();
        comment.depth = depth;
        comment.replies = node
            .children
            .iter()
            .map(|child| self.build(*child, depth + 1))
            .collect();
        comment
    }

    /// Structural self-check: every node reachable exactly once from the
    /// top level, parent links agree with reply lists, levels follow the
    /// policy, and every vote slot is consistent.
    pub fn check_invariants(&self) -> Result<()> {
        let order = self.ids_preorder();
        if order.len() != self.nodes.len() {
            return Err(AppError::InvariantViolation(format!(
                "{} comments stored but {} reachable",
                self.nodes.len(),
                order.len()
            )));
        }
        let mut seen = HashSet::with_capacity(order.len());
        for id in &order {
            if !seen.insert(*id) {
                return Err(AppError::InvariantViolation(format!(
                    "comment {id} reachable from two parents"
                )));
            }
            let node = &self.nodes[id];
            node.comment.tally().check()?;
            let expected = match node.parent {
                None => 0,
                Some(pid) => {
                    let parent = self.nodes.get(&pid).ok_or_else(|| {
                        AppError::InvariantViolation(format!("comment {id} has a dangling parent"))
                    })?;
                    if !parent.children.contains(id) {
                        return Err(AppError::InvariantViolation(format!(
                            "comment {id} missing from its parent's replies"
                        )));
                    }
                    match self.levels {
                        ReplyLevels::Flat => 1,
                        ReplyLevels::Nested => parent.comment.level + 1,
                    }
                }
            };
            if node.comment.level != expected {
                return Err(AppError::InvariantViolation(format!(
                    "comment {id} at level {} but expected {expected}",
                    node.comment.level
                )));
            }
        }
        Ok(())
    }
}

/// Vote slot check over a whole incoming subtree.
fn check_votes(root: &Comment) -> Result<()> {
    let mut stack = vec![root];
    while let Some(comment) = stack.pop() {
        comment.tally().check()?;
        stack.extend(&comment.replies);
    }
    Ok(())
}
