//! Integration tests for `SqliteStore` against an in-memory database.

use tally_core::{
  Aggregator, Error as CoreError, StoreError as _, StoreErrorKind,
  post::{NewComment, NewPost},
  store::EngagementStore,
  user::{NewUser, User},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn user(s: &SqliteStore, name: &str) -> User {
  s.add_user(NewUser::new(name, name.to_uppercase()))
    .await
    .unwrap()
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_user() {
  let s = store().await;

  let created = s
    .add_user(NewUser::new("bella", "Bella Barker").with_location("Vilnius, Lithuania"))
    .await
    .unwrap();

  let fetched = s.get_user(created.user_id).await.unwrap().unwrap();
  assert_eq!(fetched.username, "bella");
  assert_eq!(fetched.location.as_deref(), Some("Vilnius, Lithuania"));
  assert_eq!(fetched.created_at, created.created_at);
}

#[tokio::test]
async fn get_user_missing_returns_none() {
  let s = store().await;
  assert!(s.get_user(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
  let s = store().await;
  user(&s, "max").await;

  let err = s.add_user(NewUser::new("max", "Other Max")).await.unwrap_err();
  assert_eq!(err.kind(), StoreErrorKind::Conflict);
  assert!(matches!(err, Error::UsernameTaken(name) if name == "max"));
  assert_eq!(s.list_users().await.unwrap().len(), 1);
}

// ─── Posts and shares ────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_post() {
  let s = store().await;
  let author = user(&s, "luna").await;

  let mut input = NewPost::new(author.user_id, "First walk in the snow");
  input.title = Some("Snow day".into());
  let post = s.create_post(input).await.unwrap();

  let fetched = s.get_post(post.post_id).await.unwrap().unwrap();
  assert_eq!(fetched, post);
  assert!(fetched.reactions.is_none());
}

#[tokio::test]
async fn create_post_requires_author() {
  let s = store().await;
  let ghost = Uuid::new_v4();
  let err = s.create_post(NewPost::new(ghost, "boo")).await.unwrap_err();
  assert!(matches!(err, Error::UserNotFound(id) if id == ghost));
}

#[tokio::test]
async fn shares_of_post_includes_deleted_shares() {
  let s = store().await;
  let author = user(&s, "oscar").await;
  let fan = user(&s, "milo").await;

  let original = s.create_post(NewPost::new(author.user_id, "nap time")).await.unwrap();
  let share = s
    .create_post(NewPost::share(fan.user_id, original.post_id, Some("same".into())))
    .await
    .unwrap();
  let deleted = s
    .create_post(NewPost::share(fan.user_id, original.post_id, None))
    .await
    .unwrap();
  s.soft_delete_post(deleted.post_id).await.unwrap();
  s.create_post(NewPost::new(fan.user_id, "unrelated")).await.unwrap();

  let shares = s.shares_of_post(original.post_id).await.unwrap();
  assert_eq!(shares.len(), 2);
  assert_eq!(shares[0].post_id, share.post_id);
  assert_eq!(shares[0].shared_comment.as_deref(), Some("same"));
  assert_eq!(shares[1].post_id, deleted.post_id);
  assert!(shares[1].is_deleted());
}

#[tokio::test]
async fn share_of_missing_post_is_rejected() {
  let s = store().await;
  let fan = user(&s, "milo").await;
  let missing = Uuid::new_v4();

  let err = s
    .create_post(NewPost::share(fan.user_id, missing, None))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PostNotFound(id) if id == missing));
}

#[tokio::test]
async fn soft_delete_keeps_first_deletion_time() {
  let s = store().await;
  let author = user(&s, "coco").await;
  let post = s.create_post(NewPost::new(author.user_id, "bye")).await.unwrap();

  let first = s.soft_delete_post(post.post_id).await.unwrap().unwrap();
  let second = s.soft_delete_post(post.post_id).await.unwrap().unwrap();
  assert!(first.is_deleted());
  assert_eq!(first.deleted_at, second.deleted_at);

  assert!(s.soft_delete_post(Uuid::new_v4()).await.unwrap().is_none());
}

// ─── Reactions ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn reactions_are_unique_per_kind() {
  let s = store().await;
  let author = user(&s, "rocky").await;
  let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
  let post = s.create_post(NewPost::new(author.user_id, "sit")).await.unwrap();

  s.set_reaction(post.post_id, a, "like".into()).await.unwrap();
  s.set_reaction(post.post_id, a, "like".into()).await.unwrap();
  s.set_reaction(post.post_id, b, "like".into()).await.unwrap();
  let updated = s.set_reaction(post.post_id, a, "love".into()).await.unwrap();

  let reactions = updated.reactions.unwrap();
  assert_eq!(reactions["like"].as_deref(), Some(&[a, b][..]));
  assert_eq!(reactions["love"].as_deref(), Some(&[a][..]));
}

#[tokio::test]
async fn removing_last_reactor_keeps_kind() {
  let s = store().await;
  let author = user(&s, "daisy").await;
  let a = Uuid::new_v4();
  let post = s.create_post(NewPost::new(author.user_id, "roll over")).await.unwrap();

  s.set_reaction(post.post_id, a, "wow".into()).await.unwrap();
  let updated = s.remove_reaction(post.post_id, a, "wow".into()).await.unwrap();

  let reactions = updated.reactions.unwrap();
  assert_eq!(reactions["wow"].as_deref(), Some(&[][..]));
}

#[tokio::test]
async fn reaction_on_missing_post_fails() {
  let s = store().await;
  let err = s
    .set_reaction(Uuid::new_v4(), Uuid::new_v4(), "like".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PostNotFound(_)));
}

// ─── Comments, views, saves ──────────────────────────────────────────────────

#[tokio::test]
async fn comments_and_views_are_per_post() {
  let s = store().await;
  let author = user(&s, "teddy").await;
  let p1 = s.create_post(NewPost::new(author.user_id, "one")).await.unwrap();
  let p2 = s.create_post(NewPost::new(author.user_id, "two")).await.unwrap();
  let viewer = Uuid::new_v4();

  s.add_comment(NewComment { post_id: p1.post_id, user_id: viewer, content: "nice".into() })
    .await
    .unwrap();
  s.record_view(p1.post_id, viewer).await.unwrap();
  s.record_view(p1.post_id, viewer).await.unwrap();
  s.record_view(p2.post_id, viewer).await.unwrap();

  assert_eq!(s.comments_for_post(p1.post_id).await.unwrap().len(), 1);
  assert!(s.comments_for_post(p2.post_id).await.unwrap().is_empty());
  assert_eq!(s.views_for_post(p1.post_id).await.unwrap().len(), 2);
  assert_eq!(s.views_for_post(p2.post_id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn comment_on_missing_post_fails() {
  let s = store().await;
  let missing = Uuid::new_v4();
  let err = s
    .add_comment(NewComment { post_id: missing, user_id: Uuid::new_v4(), content: "?".into() })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::PostNotFound(id) if id == missing));

  let err = s.record_view(missing, Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::PostNotFound(_)));
}

#[tokio::test]
async fn save_and_unsave() {
  let s = store().await;
  let author = user(&s, "bailey").await;
  let fan = user(&s, "cooper").await;
  let post = s.create_post(NewPost::new(author.user_id, "treat")).await.unwrap();

  assert!(s.save_post(fan.user_id, post.post_id).await.unwrap());
  assert!(!s.save_post(fan.user_id, post.post_id).await.unwrap());
  assert!(s.is_post_saved(fan.user_id, post.post_id).await.unwrap());
  assert!(!s.is_post_saved(author.user_id, post.post_id).await.unwrap());

  assert!(s.unsave_post(fan.user_id, post.post_id).await.unwrap());
  assert!(!s.unsave_post(fan.user_id, post.post_id).await.unwrap());
  assert!(!s.is_post_saved(fan.user_id, post.post_id).await.unwrap());
}

#[tokio::test]
async fn count_saves_matches_distinct_savers() {
  let s = store().await;
  let author = user(&s, "zeus").await;
  let fans = [user(&s, "a").await, user(&s, "b").await, user(&s, "c").await];
  let post = s.create_post(NewPost::new(author.user_id, "zoomies")).await.unwrap();

  for fan in &fans[..2] {
    s.save_post(fan.user_id, post.post_id).await.unwrap();
    s.save_post(fan.user_id, post.post_id).await.unwrap();
  }

  assert_eq!(s.count_saves(post.post_id).await.unwrap(), 2);
}

#[tokio::test]
async fn save_by_unknown_user_is_rejected() {
  let s = store().await;
  let author = user(&s, "hera").await;
  let post = s.create_post(NewPost::new(author.user_id, "fetch")).await.unwrap();
  let ghost = Uuid::new_v4();

  let err = s.save_post(ghost, post.post_id).await.unwrap_err();
  assert_eq!(err.kind(), StoreErrorKind::NotFound);
  assert!(matches!(err, Error::UserNotFound(id) if id == ghost));
  assert!(!s.is_post_saved(ghost, post.post_id).await.unwrap());

  let err = s.save_post(author.user_id, Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::PostNotFound(_)));
}

#[tokio::test]
async fn count_saves_agrees_with_user_scan() {
  let s = store().await;
  let author = user(&s, "apollo").await;
  let fans = [user(&s, "x").await, user(&s, "y").await, user(&s, "z").await];
  let post = s.create_post(NewPost::new(author.user_id, "frisbee")).await.unwrap();
  let other = s.create_post(NewPost::new(author.user_id, "ball")).await.unwrap();

  s.save_post(fans[0].user_id, post.post_id).await.unwrap();
  s.save_post(fans[2].user_id, post.post_id).await.unwrap();
  s.save_post(fans[1].user_id, other.post_id).await.unwrap();
  let _ = s.save_post(Uuid::new_v4(), post.post_id).await;

  let mut scanned = 0;
  for u in s.list_users().await.unwrap() {
    if s.is_post_saved(u.user_id, post.post_id).await.unwrap() {
      scanned += 1;
    }
  }

  assert_eq!(scanned, 2);
  assert_eq!(s.count_saves(post.post_id).await.unwrap(), scanned);
}

// ─── End to end ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn aggregator_over_sqlite() {
  let s = store().await;
  let author = user(&s, "nala").await;
  let fan = s
    .add_user(NewUser::new("simba", "Simba").with_location("Riga, Latvia"))
    .await
    .unwrap();
  let post = s.create_post(NewPost::new(author.user_id, "sunbathing")).await.unwrap();

  s.set_reaction(post.post_id, fan.user_id, "like".into()).await.unwrap();
  s.record_view(post.post_id, fan.user_id).await.unwrap();
  s.add_comment(NewComment { post_id: post.post_id, user_id: fan.user_id, content: "warm".into() })
    .await
    .unwrap();
  s.create_post(NewPost::share(fan.user_id, post.post_id, None)).await.unwrap();
  s.save_post(fan.user_id, post.post_id).await.unwrap();

  let aggregator = Aggregator::new(&s);
  let report = aggregator
    .aggregate(post.post_id, Some(author.user_id))
    .await
    .unwrap();

  assert_eq!(report.totals.reactions["like"], 1);
  assert_eq!(report.totals.views, 1);
  assert_eq!(report.totals.comments, 1);
  assert_eq!(report.totals.shares, 1);
  assert_eq!(report.totals.saves, 1);
  assert_eq!(report.recent_activity.len(), 3);
  let insights = report.viewer_insights.unwrap();
  assert_eq!(insights.geography.country_counts["Latvia"], 1);
  let series_total: u64 = report.time_series.series.iter().map(|b| b.total).sum();
  assert_eq!(series_total, 3);

  let deleted_share = s
    .create_post(NewPost::share(fan.user_id, post.post_id, Some("gone".into())))
    .await
    .unwrap();
  s.soft_delete_post(deleted_share.post_id).await.unwrap();
  let report = aggregator.aggregate(post.post_id, None).await.unwrap();
  assert_eq!(report.totals.shares, 2);
  assert_eq!(report.time_series.series.iter().map(|b| b.shares).sum::<u64>(), 2);

  s.soft_delete_post(post.post_id).await.unwrap();
  let err = aggregator.aggregate(post.post_id, None).await.unwrap_err();
  assert!(matches!(err, CoreError::NotFound(_)));
}
