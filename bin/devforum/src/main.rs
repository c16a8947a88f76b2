//! # DevForum Binary
//!
//! Assembles a registry from configuration and prints the configured feed,
//! plus the comment thread of its leading post, as JSON on stdout.

mod display;

use anyhow::Context;
use configs::ForumConfig;
use df_core::seed::sample_forum;
use df_core::{Comment, Post, Registry, SystemClock, UuidV7Generator, Votable};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Serialize)]
struct FeedEntry<'a> {
    #[serde(flatten)]
    post: &'a Post,
    score: i64,
    score_label: String,
    age_label: String,
}

#[derive(Serialize)]
struct Page<'a> {
    sort: String,
    feed: Vec<FeedEntry<'a>>,
    thread: Vec<Comment>,
}

fn init_tracing(cfg: &ForumConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cfg.log.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if cfg.log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    // 1. Configuration (.env, devforum.toml, DEVFORUM__* variables)
    let cfg = ForumConfig::load().context("loading configuration")?;
    init_tracing(&cfg);

    // 2. Registry, optionally pre-populated with the sample forum
    let registry = Registry::new(
        Box::new(SystemClock),
        Box::new(UuidV7Generator),
        cfg.engine.registry_settings(),
    );
    let registry = if cfg.engine.seed_sample_data {
        sample_forum(registry).context("seeding sample data")?.registry
    } else {
        registry
    };
    info!(
        posts = registry.post_count(),
        communities = registry.communities().len(),
        "DevForum registry ready"
    );

    // 3. Feed and leading thread
    let now = registry.now();
    let posts = registry.list_posts(&cfg.feed.filter(), cfg.feed.sort);
    let thread = posts
        .first()
        .map(|p| registry.list_comments(p.id))
        .unwrap_or_default();
    let feed = posts
        .iter()
        .map(|post| {
            let score = post.score();
            FeedEntry {
                post,
                score,
                score_label: display::format_count(score),
                age_label: display::format_age(post.created_at, now),
            }
        })
        .collect();

    let page = Page {
        sort: cfg.feed.sort.to_string(),
        feed,
        thread,
    };
    println!("{}", serde_json::to_string_pretty(&page).context("rendering feed")?);
    Ok(())
}
