//! Feed ordering under the three sort policies.

use df_core::{hot_score, post_hot_score, rank, PostFilter, SortPolicy};
use integration_tests::{aged_post, frozen_now, registry};
use proptest::prelude::*;
use uuid::Uuid;

#[test]
fn hot_worked_example() {
    let now = frozen_now();
    let a = aged_post(1, 100, 0, 10.0);
    let b = aged_post(2, 20, 0, 0.1);

    let score_a = post_hot_score(&a, now);
    let score_b = post_hot_score(&b, now);
    assert!((score_a - 100.0 / 12f64.powf(1.8)).abs() < 1e-9);
    assert!((score_b - 20.0 / 2.1f64.powf(1.8)).abs() < 1e-9);
    assert!(score_b > score_a);

    let ranked = rank([&a, &b], SortPolicy::Hot, now);
    assert_eq!(ranked[0].id, b.id);
}

#[test]
fn old_heavyweight_beats_fresh_lightweight() {
    // 5000 / 26^1.8 ≈ 14.1 against 2 / 2^1.8 ≈ 0.57
    let now = frozen_now();
    let old = aged_post(1, 5_000, 0, 24.0);
    let fresh = aged_post(2, 2, 0, 0.0);
    let ranked = rank([&fresh, &old], SortPolicy::Hot, now);
    assert_eq!(ranked[0].id, old.id);
}

#[test]
fn negative_scores_sink_under_hot() {
    let now = frozen_now();
    let buried = aged_post(1, 0, 40, 0.5);
    let quiet = aged_post(2, 1, 1, 30.0);
    assert!(post_hot_score(&buried, now) < 0.0);
    let ranked = rank([&buried, &quiet], SortPolicy::Hot, now);
    assert_eq!(ranked[0].id, quiet.id);
}

#[test]
fn registry_filters_before_ranking() {
    let mut registry = registry();
    let mut web = aged_post(1, 50, 0, 1.0);
    web.community = "webdev".into();
    web.title = "Async Rust on the server".into();
    let mut design = aged_post(2, 500, 0, 1.0);
    design.community = "design".into();
    design.content = "Rust-coloured palettes".into();
    let plain = aged_post(3, 5, 0, 1.0);
    for p in [web, design, plain] {
        registry.import_post(p).unwrap();
    }

    let ids = |filter: PostFilter, policy| {
        registry
            .list_posts(&filter, policy)
            .into_iter()
            .map(|p| p.id.as_u128())
            .collect::<Vec<_>>()
    };

    assert_eq!(ids(PostFilter::default(), SortPolicy::Top), [2, 1, 3]);
    assert_eq!(ids(PostFilter::default().community("all"), SortPolicy::Top), [2, 1, 3]);
    assert_eq!(ids(PostFilter::default().community("webdev"), SortPolicy::Hot), [1]);
    assert_eq!(ids(PostFilter::default().search("rust"), SortPolicy::Top), [2, 1]);
    assert_eq!(
        ids(PostFilter::default().community("design").search("RUST"), SortPolicy::New),
        [2]
    );
    assert!(ids(PostFilter::default().search("python"), SortPolicy::Hot).is_empty());
}

#[test]
fn new_policy_orders_by_timestamp() {
    let now = frozen_now();
    let posts = [
        aged_post(1, 1, 0, 3.0),
        aged_post(2, 1, 0, 0.25),
        aged_post(3, 1, 0, 1.0),
    ];
    let ranked: Vec<Uuid> = rank(&posts, SortPolicy::New, now).iter().map(|p| p.id).collect();
    assert_eq!(ranked, [Uuid::from_u128(2), Uuid::from_u128(3), Uuid::from_u128(1)]);
}

proptest! {
    #[test]
    fn hot_rank_is_monotone_in_age(
        up in 0u32..10_000,
        down in 0u32..10_000,
        younger in 0.0f64..500.0,
        extra in 0.0f64..500.0,
    ) {
        let net = i64::from(up) - i64::from(down);
        let older = younger + extra;
        let (young_score, old_score) = (hot_score(net, younger), hot_score(net, older));
        if net >= 0 {
            prop_assert!(young_score >= old_score);
        } else {
            // with a negative score decay pulls towards zero, so age helps
            prop_assert!(young_score <= old_score);
        }
    }

    #[test]
    fn ranking_is_a_permutation(
        specs in proptest::collection::vec((0u32..1_000, 0u32..1_000, 0.0f64..100.0), 0..20),
        policy in prop_oneof![Just(SortPolicy::Hot), Just(SortPolicy::New), Just(SortPolicy::Top)],
    ) {
        let posts: Vec<_> = specs
            .iter()
            .enumerate()
            .map(|(i, (up, down, age))| aged_post(i as u128, *up, *down, *age))
            .collect();
        let mut ranked: Vec<u128> = rank(&posts, policy, frozen_now())
            .iter()
            .map(|p| p.id.as_u128())
            .collect();
        ranked.sort_unstable();
        prop_assert_eq!(ranked, (0..posts.len() as u128).collect::<Vec<_>>());
    }
}
