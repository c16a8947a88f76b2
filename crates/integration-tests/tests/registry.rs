//! The registry's external contract: listing, lookup, submission, votes,
//! comments and saves.

use df_core::{
    AppError, NewPost, PostFilter, PostKind, SortPolicy, VoteDirection, VoteTarget,
};
use integration_tests::{draft, frozen_now, member, registry};
use uuid::Uuid;

#[test]
fn create_post_fills_defaults_from_clock_and_ids() {
    let mut registry = registry();
    let me = member("tech_guru");
    let post = registry
        .create_post(
            &me,
            NewPost {
                title: "Amazing CSS animation library I discovered".into(),
                content: "Check it out".into(),
                kind: PostKind::Link,
                url: Some("https://animate.style/".into()),
                community: "design".into(),
            },
        )
        .unwrap();

    assert_eq!(post.id, Uuid::from_u128(1_000));
    assert_eq!(post.created_at, frozen_now());
    assert_eq!(post.author.username, "tech_guru");
    assert_eq!((post.upvotes, post.downvotes), (1, 0));
    assert_eq!(post.user_vote, Some(VoteDirection::Up));
    assert_eq!((post.comment_count, post.awards), (0, 0));
    assert!(!post.saved);
    assert_eq!(registry.get_post(post.id), Some(post));
}

#[test]
fn whitespace_title_leaves_collection_unchanged() {
    let mut registry = registry();
    registry.create_post(&member("a"), draft("kept", "programming")).unwrap();
    let before = registry.list_posts(&PostFilter::default(), SortPolicy::New);

    let err = registry.create_post(&member("a"), draft("  ", "programming")).unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
    assert_eq!(registry.list_posts(&PostFilter::default(), SortPolicy::New), before);
}

#[test]
fn new_posts_are_prepended() {
    let mut registry = registry();
    let me = member("a");
    let ids: Vec<Uuid> = ["one", "two", "three"]
        .into_iter()
        .map(|t| registry.create_post(&me, draft(t, "programming")).unwrap().id)
        .collect();

    // identical timestamps and scores, so every policy falls back to submission order
    for policy in [SortPolicy::Hot, SortPolicy::New, SortPolicy::Top] {
        let listed: Vec<Uuid> = registry
            .list_posts(&PostFilter::default(), policy)
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(listed, [ids[2], ids[1], ids[0]], "policy {policy}");
    }
}

#[test]
fn toggle_save_flips_and_reports() {
    let mut registry = registry();
    let post = registry.create_post(&member("a"), draft("save me", "webdev")).unwrap();

    assert_eq!(registry.toggle_save(post.id), Some(true));
    assert!(registry.get_post(post.id).unwrap().saved);
    assert_eq!(registry.try_toggle_save(post.id), Ok(false));
    assert!(!registry.get_post(post.id).unwrap().saved);
}

#[test]
fn missing_targets_are_no_ops_or_not_found() {
    let mut registry = registry();
    let post = registry.create_post(&member("a"), draft("only", "webdev")).unwrap();
    let ghost = Uuid::from_u128(7);

    assert_eq!(registry.vote(VoteTarget::Post(ghost), VoteDirection::Up), None);
    assert_eq!(registry.vote(VoteTarget::Comment(ghost), VoteDirection::Up), None);
    assert_eq!(registry.toggle_save(ghost), None);
    assert_eq!(registry.get_post(ghost), None);
    assert_eq!(registry.get_post(post.id).unwrap(), post);

    assert_eq!(
        registry.try_vote(VoteTarget::Post(ghost), VoteDirection::Down),
        Err(AppError::NotFound("post".into(), ghost.to_string()))
    );
    assert!(registry.try_get_post(ghost).unwrap_err().is_not_found());
    assert!(registry
        .add_comment(&member("a"), ghost, "hello?", None)
        .unwrap_err()
        .is_not_found());
}

#[test]
fn comments_count_towards_post_total() {
    let mut registry = registry();
    let me = member("a");
    let post = registry.create_post(&me, draft("busy", "programming")).unwrap();
    let root = registry.add_comment(&me, post.id, "root", None).unwrap();
    registry.add_comment(&me, post.id, "reply", Some(root.id)).unwrap();
    registry.add_comment(&me, post.id, "another", None).unwrap();

    assert_eq!(registry.get_post(post.id).unwrap().comment_count, 3);
    let blank = registry.add_comment(&me, post.id, " \n\t", None).unwrap_err();
    assert!(matches!(blank, AppError::ValidationError(_)));
    assert_eq!(registry.get_post(post.id).unwrap().comment_count, 3);
}

#[test]
fn returned_values_are_snapshots() {
    let mut registry = registry();
    let me = member("a");
    let post = registry.create_post(&me, draft("original", "programming")).unwrap();
    registry.add_comment(&me, post.id, "root", None).unwrap();

    let mut copy = registry.get_post(post.id).unwrap();
    copy.title = "tampered".into();
    copy.upvotes = 9_999;
    let mut thread = registry.list_comments(post.id);
    thread.clear();

    let stored = registry.get_post(post.id).unwrap();
    assert_eq!(stored.title, "original");
    assert_eq!(stored.upvotes, 1);
    assert_eq!(registry.list_comments(post.id).len(), 1);
}

#[test]
fn community_directory() {
    let registry = registry();
    let names: Vec<&str> = registry.communities().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["programming", "webdev", "design"]);
    assert!(registry.community("webdev").is_some());
    assert!(registry.community("rust").is_none());
}

#[test]
fn invariants_hold_after_mixed_traffic() {
    let mut registry = registry();
    let a = member("a");
    let b = member("b");
    let p1 = registry.create_post(&a, draft("p1", "programming")).unwrap();
    let p2 = registry.create_post(&b, draft("p2", "webdev")).unwrap();
    let c1 = registry.add_comment(&b, p1.id, "c1", None).unwrap();
    let c2 = registry.add_comment(&a, p1.id, "c2", Some(c1.id)).unwrap();

    for (target, dir) in [
        (VoteTarget::Post(p1.id), VoteDirection::Down),
        (VoteTarget::Post(p2.id), VoteDirection::Up),
        (VoteTarget::Comment(c2.id), VoteDirection::Down),
        (VoteTarget::Comment(c1.id), VoteDirection::Up),
        (VoteTarget::Post(p1.id), VoteDirection::Down),
    ] {
        registry.vote(target, dir).unwrap();
        registry.check_invariants().unwrap();
    }
    registry.toggle_save(p2.id).unwrap();
    registry.check_invariants().unwrap();
}
