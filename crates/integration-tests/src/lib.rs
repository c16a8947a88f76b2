//! Shared fixtures for the DevForum integration suite.
//!
//! Registries built here run on a frozen clock and a counting id generator,
//! so timestamps and identifiers are predictable across a test.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use df_core::{
    Author, Community, MockClock, MockIdGenerator, NewPost, Post, PostKind, Registry,
    RegistrySettings,
};
use uuid::Uuid;

/// 2024-05-01T12:00:00Z, the instant every fixture clock is frozen at.
pub fn frozen_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn frozen_clock(now: DateTime<Utc>) -> MockClock {
    let mut clock = MockClock::new();
    clock.expect_now().return_const(now);
    clock
}

/// Yields `Uuid::from_u128(start)`, `start + 1`, ...
pub fn counting_ids(start: u128) -> MockIdGenerator {
    let next = std::sync::atomic::AtomicU64::new(0);
    let mut ids = MockIdGenerator::new();
    ids.expect_next_id().returning(move || {
        let n = next.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Uuid::from_u128(start + u128::from(n))
    });
    ids
}

pub fn registry_with(settings: RegistrySettings) -> Registry {
    let mut registry = Registry::new(
        Box::new(frozen_clock(frozen_now())),
        Box::new(counting_ids(1_000)),
        settings,
    );
    for name in ["programming", "webdev", "design"] {
        registry
            .add_community(Community {
                name: name.into(),
                members: 1_000,
                description: format!("{name} discussions"),
                icon: "#".into(),
            })
            .unwrap();
    }
    registry
}

pub fn registry() -> Registry {
    registry_with(RegistrySettings::default())
}

pub fn member(name: &str) -> Arc<Author> {
    Arc::new(Author {
        id: Uuid::new_v4(),
        username: name.into(),
        avatar: "@".into(),
        karma: 0,
        cake_day: NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
    })
}

pub fn draft(title: &str, community: &str) -> NewPost {
    NewPost {
        title: title.into(),
        content: String::new(),
        kind: PostKind::Text,
        url: None,
        community: community.into(),
    }
}

/// A post with explicit counters, `hours_old` before the frozen clock.
pub fn aged_post(id: u128, up: u32, down: u32, hours_old: f64) -> Post {
    let minutes = (hours_old * 60.0).round() as i64;
    Post {
        id: Uuid::from_u128(id),
        title: format!("post {id}"),
        content: String::new(),
        kind: PostKind::Text,
        url: None,
        author: member("fixture"),
        community: "programming".into(),
        upvotes: up,
        downvotes: down,
        user_vote: None,
        comment_count: 0,
        created_at: frozen_now() - Duration::minutes(minutes),
        awards: 0,
        saved: false,
    }
}
