//! # Sample Forum
//!
//! Fixture data for demos and tests: four members, five communities, three
//! posts one, two and three hours old, and a two-comment thread under the
//! newest post. Timestamps are relative to the registry's clock.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::error::{AppError, Result};
use crate::models::{Author, Comment, Community, Post, PostKind};
use crate::registry::Registry;

pub struct SampleForum {
    pub registry: Registry,
    pub authors: Vec<Arc<Author>>,
}

impl SampleForum {
    /// The member new posts and comments are attributed to in the demo.
    pub fn current_user(&self) -> Arc<Author> {
        Arc::clone(&self.authors[0])
    }
}

fn author(registry: &Registry, username: &str, avatar: &str, karma: i64, cake_day: (i32, u32, u32)) -> Result<Arc<Author>> {
    let (y, m, d) = cake_day;
    let cake_day = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| AppError::ValidationError(format!("bad cake day {y}-{m}-{d}")))?;
    Ok(Arc::new(Author {
        id: registry.fresh_id(),
        username: username.into(),
        avatar: avatar.into(),
        karma,
        cake_day,
    }))
}

struct PostSeed<'a> {
    title: &'a str,
    content: &'a str,
    kind: PostKind,
    url: Option<&'a str>,
    author: &'a Arc<Author>,
    community: &'a str,
    votes: (u32, u32),
    comment_count: u32,
    hours_old: i64,
    awards: u32,
}

impl PostSeed<'_> {
    fn build(self, registry: &Registry, now: DateTime<Utc>) -> Post {
        Post {
            id: registry.fresh_id(),
            title: self.title.into(),
            content: self.content.into(),
            kind: self.kind,
            url: self.url.map(str::to_string),
            author: Arc::clone(self.author),
            community: self.community.into(),
            upvotes: self.votes.0,
            downvotes: self.votes.1,
            user_vote: None,
            comment_count: self.comment_count,
            created_at: now - Duration::hours(self.hours_old),
            awards: self.awards,
            saved: false,
        }
    }
}

fn community(name: &str, members: u64, description: &str, icon: &str) -> Community {
    Community {
        name: name.into(),
        members,
        description: description.into(),
        icon: icon.into(),
    }
}

/// Loads the sample data set into `registry`.
pub fn sample_forum(mut registry: Registry) -> Result<SampleForum> {
    let authors = vec![
        author(&registry, "tech_guru", "🧑‍💻", 1250, (2023, 1, 15))?,
        author(&registry, "coding_ninja", "🥷", 890, (2023, 3, 22))?,
        author(&registry, "dev_enthusiast", "👩‍💻", 2100, (2022, 11, 8))?,
        author(&registry, "pixel_artist", "🎨", 567, (2023, 6, 12))?,
    ];

    for c in [
        community("programming", 125_000, "All about programming and development", "💻"),
        community("webdev", 89_000, "Web development discussions", "🌐"),
        community("javascript", 156_000, "JavaScript community", "⚡"),
        community("react", 78_000, "React.js discussions", "⚛️"),
        community("design", 45_000, "UI/UX Design community", "🎨"),
    ] {
        registry.add_community(c)?;
    }

    let now = registry.now();
    let posts = [
        PostSeed {
            title: "Just built my first full-stack app with React and Node.js!",
            content: "After months of learning, I finally completed my first full-stack project. \
                      It's a task management app with authentication, real-time updates, and a clean UI. \
                      The journey was challenging but incredibly rewarding!",
            kind: PostKind::Text,
            url: None,
            author: &authors[0],
            community: "webdev",
            votes: (1247, 23),
            comment_count: 89,
            hours_old: 1,
            awards: 3,
        },
        PostSeed {
            title: "Best practices for React component optimization",
            content: "Here are some key strategies I've learned for optimizing React components: \
                      Use React.memo for expensive renders, implement proper key props, avoid inline \
                      functions in JSX, and leverage useMemo and useCallback hooks strategically.",
            kind: PostKind::Text,
            url: None,
            author: &authors[1],
            community: "react",
            votes: (892, 12),
            comment_count: 156,
            hours_old: 2,
            awards: 2,
        },
        PostSeed {
            title: "Amazing CSS animation library I discovered",
            content: "Check out this incredible animation library that makes creating smooth, \
                      performant CSS animations a breeze!",
            kind: PostKind::Link,
            url: Some("https://animate.style/"),
            author: &authors[2],
            community: "design",
            votes: (634, 8),
            comment_count: 67,
            hours_old: 3,
            awards: 1,
        },
    ]
    .map(|seed| seed.build(&registry, now));
    let thread_post = posts[0].id;

    let mut question = Comment::new(
        registry.fresh_id(),
        Arc::clone(&authors[1]),
        "This is really impressive! What tech stack did you use for the backend?",
        now - Duration::minutes(50),
    );
    question.upvotes = 45;
    question.downvotes = 2;

    let mut answer = Comment::new(
        registry.fresh_id(),
        Arc::clone(&authors[0]),
        "I used Node.js with Express, MongoDB for the database, and Socket.io for real-time features.",
        now - Duration::minutes(45),
    );
    answer.upvotes = 32;
    question.replies.push(answer);

    for p in posts {
        registry.import_post(p)?;
    }
    registry.import_comment(thread_post, None, question)?;

    Ok(SampleForum { registry, authors })
}
