//! # Registry
//!
//! Owns the canonical post collection, the community directory and one
//! comment forest per post. Every mutation goes through here and runs to
//! completion before the next; reads return owned copies.
//!
//! Mutations come in two flavours. The `try_*` methods report a missing
//! target as `AppError::NotFound`; `vote` and `toggle_save` treat it as a
//! silent no-op and return `None`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::comment_tree::{CommentForest, ReplyLevels};
use crate::error::{AppError, Result};
use crate::models::{Author, Comment, Community, NewPost, Post, PostKind, VoteTarget};
use crate::ranking::{self, PostFilter, SortPolicy};
use crate::traits::{Clock, IdGenerator, SystemClock, UuidV7Generator};
use crate::vote::{Votable, VoteDirection, VoteTally};

pub const DEFAULT_MAX_TITLE_CHARS: usize = 300;

/// Tunables for a registry instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySettings {
    pub reply_levels: ReplyLevels,
    /// Upper bound on title length, in code points
    pub max_title_chars: usize,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            reply_levels: ReplyLevels::default(),
            max_title_chars: DEFAULT_MAX_TITLE_CHARS,
        }
    }
}

pub struct Registry {
    /// Submission order, newest first
    posts: Vec<Post>,
    communities: Vec<Community>,
    comments: HashMap<Uuid, CommentForest>,
    clock: Box<dyn Clock>,
    ids: Box<dyn IdGenerator>,
    settings: RegistrySettings,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(
            Box::new(SystemClock),
            Box::new(UuidV7Generator),
            RegistrySettings::default(),
        )
    }
}

impl Registry {
    pub fn new(clock: Box<dyn Clock>, ids: Box<dyn IdGenerator>, settings: RegistrySettings) -> Self {
        Self {
            posts: Vec::new(),
            communities: Vec::new(),
            comments: HashMap::new(),
            clock,
            ids,
            settings,
        }
    }

    pub fn settings(&self) -> RegistrySettings {
        self.settings
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Draws an identifier from the registry's generator.
    pub fn fresh_id(&self) -> Uuid {
        self.ids.next_id()
    }

    // ── Communities ─────────────────────────────────────────────────────────

    /// Registers a community. Names are unique.
    pub fn add_community(&mut self, community: Community) -> Result<()> {
        if self.community(&community.name).is_some() {
            return Err(AppError::Conflict(format!(
                "community '{}' already exists",
                community.name
            )));
        }
        self.communities.push(community);
        Ok(())
    }

    pub fn communities(&self) -> &[Community] {
        &self.communities
    }

    pub fn community(&self, name: &str) -> Option<&Community> {
        self.communities.iter().find(|c| c.name == name)
    }

    // ── Posts ───────────────────────────────────────────────────────────────

    /// Filters, then ranks, the post collection.
    pub fn list_posts(&self, filter: &PostFilter, policy: SortPolicy) -> Vec<Post> {
        let now = self.clock.now();
        ranking::rank(self.posts.iter().filter(|p| filter.matches(p)), policy, now)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn get_post(&self, id: Uuid) -> Option<Post> {
        self.find_post(id).cloned()
    }

    pub fn try_get_post(&self, id: Uuid) -> Result<Post> {
        self.get_post(id).ok_or_else(|| AppError::not_found("post", id))
    }

    /// Number of posts held.
    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    /// Submits a new post on behalf of `author`.
    ///
    /// The post starts with the author's own upvote and lands at the front
    /// of the submission order. Rejected input leaves the registry untouched.
    pub fn create_post(&mut self, author: &Arc<Author>, draft: NewPost) -> Result<Post> {
        let title = draft.title.trim();
        if title.is_empty() {
            warn!(author = %author.username, "rejected post with blank title");
            return Err(AppError::ValidationError("title must not be blank".into()));
        }
        let title_chars = title.chars().count();
        if title_chars > self.settings.max_title_chars {
            warn!(author = %author.username, title_chars, "rejected post with long title");
            return Err(AppError::ValidationError(format!(
                "title is {title_chars} characters; the limit is {}",
                self.settings.max_title_chars
            )));
        }
        let url = draft
            .url
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty());
        let url = match draft.kind {
            PostKind::Link if url.is_none() => {
                warn!(author = %author.username, "rejected link post without url");
                return Err(AppError::ValidationError("link posts require a url".into()));
            }
            PostKind::Text => None,
            PostKind::Link | PostKind::Image => url,
        };
        if self.community(&draft.community).is_none() {
            return Err(AppError::not_found("community", &draft.community));
        }

        let post = Post {
            id: self.ids.next_id(),
            title: draft.title,
            content: draft.content,
            kind: draft.kind,
            url,
            author: Arc::clone(author),
            community: draft.community,
            upvotes: 1,
            downvotes: 0,
            user_vote: Some(VoteDirection::Up),
            comment_count: 0,
            created_at: self.clock.now(),
            awards: 0,
            saved: false,
        };
        debug!(post_id = %post.id, community = %post.community, "post created");
        self.posts.insert(0, post.clone());
        Ok(post)
    }

    /// Appends an existing post (e.g. fixture data) as-is, behind every post
    /// already held.
    pub fn import_post(&mut self, post: Post) -> Result<()> {
        if self.find_post(post.id).is_some() {
            return Err(AppError::Conflict(format!("post {} already exists", post.id)));
        }
        post.tally().check()?;
        self.posts.push(post);
        Ok(())
    }

    pub fn try_toggle_save(&mut self, id: Uuid) -> Result<bool> {
        let post = self
            .find_post_mut(id)
            .ok_or_else(|| AppError::not_found("post", id))?;
        post.saved = !post.saved;
        debug!(post_id = %id, saved = post.saved, "save toggled");
        Ok(post.saved)
    }

    /// Flips the saved flag. `None` when the post does not exist.
    pub fn toggle_save(&mut self, id: Uuid) -> Option<bool> {
        lenient(self.try_toggle_save(id))
    }

    // ── Votes ───────────────────────────────────────────────────────────────

    pub fn try_vote(&mut self, target: VoteTarget, direction: VoteDirection) -> Result<VoteTally> {
        let tally = match target {
            VoteTarget::Post(id) => self
                .find_post_mut(id)
                .map(|post| post.cast_vote(direction))
                .ok_or_else(|| AppError::not_found("post", id))?,
            VoteTarget::Comment(id) => self
                .comments
                .values_mut()
                .find_map(|forest| forest.apply_vote(id, direction))
                .ok_or_else(|| AppError::not_found("comment", id))?,
        };
        debug!(%target, %direction, upvotes = tally.upvotes, downvotes = tally.downvotes, "vote applied");
        Ok(tally)
    }

    /// Applies a vote. `None` when the target does not exist.
    pub fn vote(&mut self, target: VoteTarget, direction: VoteDirection) -> Option<VoteTally> {
        lenient(self.try_vote(target, direction))
    }

    // ── Comments ────────────────────────────────────────────────────────────

    /// Adds a comment by `author` to `post_id`, as a reply to `parent_id`
    /// when given. Top-level comments are listed most recent first; replies
    /// in the order they were added.
    pub fn add_comment(
        &mut self,
        author: &Arc<Author>,
        post_id: Uuid,
        body: &str,
        parent_id: Option<Uuid>,
    ) -> Result<Comment> {
        if body.trim().is_empty() {
            warn!(author = %author.username, %post_id, "rejected blank comment");
            return Err(AppError::ValidationError("comment must not be blank".into()));
        }
        if self.find_post(post_id).is_none() {
            return Err(AppError::not_found("post", post_id));
        }

        let mut comment = Comment::new(self.ids.next_id(), Arc::clone(author), body, self.clock.now());
        comment.upvotes = 1;
        comment.user_vote = Some(VoteDirection::Up);
        let id = comment.id;
        self.ensure_fresh(&[id])?;

        let levels = self.settings.reply_levels;
        let forest = self
            .comments
            .entry(post_id)
            .or_insert_with(|| CommentForest::new(levels));
        forest.insert(parent_id, comment)?;
        let stored = forest
            .get(id)
            .ok_or_else(|| AppError::InvariantViolation(format!("comment {id} lost on insert")))?;

        if let Some(post) = self.find_post_mut(post_id) {
            post.comment_count += 1;
        }
        debug!(comment_id = %id, %post_id, parent_id = ?parent_id, level = stored.level, "comment added");
        Ok(stored)
    }

    /// Places an existing comment subtree (e.g. fixture data) without
    /// touching the post's comment count.
    pub fn import_comment(&mut self, post_id: Uuid, parent_id: Option<Uuid>, comment: Comment) -> Result<()> {
        if self.find_post(post_id).is_none() {
            return Err(AppError::not_found("post", post_id));
        }
        self.ensure_fresh(&comment.subtree_ids())?;
        let levels = self.settings.reply_levels;
        self.comments
            .entry(post_id)
            .or_insert_with(|| CommentForest::new(levels))
            .insert(parent_id, comment)
    }

    /// The post's comment forest as owned nested comments.
    pub fn list_comments(&self, post_id: Uuid) -> Vec<Comment> {
        self.comments
            .get(&post_id)
            .map(CommentForest::snapshot)
            .unwrap_or_default()
    }

    pub fn get_comment(&self, id: Uuid) -> Option<Comment> {
        self.comments.values().find_map(|forest| forest.get(id))
    }

    /// Runs every structural self-check; any failure is a logic bug.
    pub fn check_invariants(&self) -> Result<()> {
        for post in &self.posts {
            post.tally().check()?;
        }
        for forest in self.comments.values() {
            forest.check_invariants()?;
        }
        Ok(())
    }

    /// Comment ids are unique across every post, not just within one forest.
    fn ensure_fresh(&self, ids: &[Uuid]) -> Result<()> {
        match ids
            .iter()
            .find(|id| self.comments.values().any(|forest| forest.contains(**id)))
        {
            Some(clash) => Err(AppError::Conflict(format!("comment {clash} already exists"))),
            None => Ok(()),
        }
    }

    fn find_post(&self, id: Uuid) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    fn find_post_mut(&mut self, id: Uuid) -> Option<&mut Post> {
        self.posts.iter_mut().find(|p| p.id == id)
    }
}

/// Collapses a strict result into an `Option`, logging why it is empty.
fn lenient<T>(result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) if err.is_not_found() => {
            debug!(%err, "ignoring request for missing target");
            None
        }
        Err(err) => {
            warn!(%err, "request rejected");
            None
        }
    }
}
