//! Tests for the recognition pass run after approvals.
//!
//! These drive `ProgressionEngine::grant_recognitions` directly against stats
//! rows shaped with SQL, without going through the HTTP layer.

mod common;

use questline_core::clock::Clock;
use questline_db::repositories::{ActivityLogRepo, MenteeStatsRepo};
use sqlx::PgPool;

async fn set_stats(pool: &PgPool, quests_completed: i32, level: i32) {
    sqlx::query("UPDATE mentee_stats SET quests_completed = $1, level = $2")
        .bind(quests_completed)
        .bind(level)
        .execute(pool)
        .await
        .unwrap();
}

async fn earned_count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rerunning_the_pass_grants_nothing_new(pool: PgPool) {
    set_stats(&pool, 1, 1).await;
    let engine = common::test_engine(pool.clone());
    let now = engine.clock().now();

    let first = engine.grant_recognitions(now).await.unwrap();
    let codes: Vec<&str> = first.unlocked.iter().map(|d| d.code.as_str()).collect();
    assert_eq!(codes, vec!["first_steps"]);
    assert_eq!(first.stats.total_xp, 25);
    assert_eq!(first.stats.total_bonus_xp, 25);

    let second = engine.grant_recognitions(now).await.unwrap();
    assert!(second.unlocked.is_empty());
    assert_eq!(second.stats.total_xp, 25);

    assert_eq!(earned_count(&pool, "earned_achievements").await, 1);
    assert_eq!(
        ActivityLogRepo::count_by_action(&pool, "achievement_unlocked")
            .await
            .unwrap(),
        1
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_passes_grant_once(pool: PgPool) {
    set_stats(&pool, 1, 1).await;
    let engine = common::test_engine(pool.clone());
    let now = engine.clock().now();

    let (a, b) = tokio::join!(engine.grant_recognitions(now), engine.grant_recognitions(now));
    let unlocked = a.unwrap().unlocked.len() + b.unwrap().unlocked.len();
    assert_eq!(unlocked, 1);

    assert_eq!(earned_count(&pool, "earned_achievements").await, 1);
    let stats = MenteeStatsRepo::get(&pool).await.unwrap();
    assert_eq!(stats.total_xp, 25);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn badges_are_granted_alongside_achievements(pool: PgPool) {
    set_stats(&pool, 1, 6).await;
    let engine = common::test_engine(pool.clone());
    let now = engine.clock().now();

    let top_up = engine.grant_recognitions(now).await.unwrap();
    let codes: Vec<&str> = top_up.unlocked.iter().map(|d| d.code.as_str()).collect();
    // Achievements are evaluated before badges.
    assert_eq!(codes, vec!["first_steps", "apprentice_rank"]);
    assert_eq!(earned_count(&pool, "earned_badges").await, 1);
    assert_eq!(
        ActivityLogRepo::count_by_action(&pool, "badge_earned")
            .await
            .unwrap(),
        1
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_requirement_types_are_skipped(pool: PgPool) {
    sqlx::query(
        "INSERT INTO achievements (code, name, requirement_type, requirement_value, xp_bonus) \
         VALUES ('moon_walker', 'Moon Walker', 'moon_phase', 1, 10)",
    )
    .execute(&pool)
    .await
    .unwrap();
    set_stats(&pool, 1, 1).await;
    let engine = common::test_engine(pool.clone());

    let top_up = engine.grant_recognitions(engine.clock().now()).await.unwrap();
    let codes: Vec<&str> = top_up.unlocked.iter().map(|d| d.code.as_str()).collect();
    assert_eq!(codes, vec!["first_steps"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn nothing_unlocks_for_fresh_stats(pool: PgPool) {
    let engine = common::test_engine(pool.clone());

    let top_up = engine.grant_recognitions(engine.clock().now()).await.unwrap();
    assert!(top_up.unlocked.is_empty());
    assert_eq!(top_up.stats.total_xp, 0);
}

async fn insert_quest(pool: &PgPool, title: &str, category: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO quests (title, category, xp_reward) VALUES ($1, $2, 100) RETURNING id",
    )
    .bind(title)
    .bind(category)
    .fetch_one(pool)
    .await
    .unwrap()
}

async fn insert_completed_progress(pool: &PgPool, quest_id: i64) {
    sqlx::query(
        "INSERT INTO quest_progress (mentee_stats_id, quest_id, status, completed_at, xp_awarded) \
         SELECT id, $1, 'completed', NOW(), 100 FROM mentee_stats",
    )
    .bind(quest_id)
    .execute(pool)
    .await
    .unwrap();
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn mastery_requires_every_active_quest_in_the_category(pool: PgPool) {
    sqlx::query(
        "INSERT INTO achievements (code, name, requirement_type, requirement_category, xp_bonus) \
         VALUES ('rust_master', 'Rust Master', 'category_mastery', 'rust', 200)",
    )
    .execute(&pool)
    .await
    .unwrap();

    let open_quest = insert_quest(&pool, "Borrow checker kata", "rust").await;
    let retired_quest = insert_quest(&pool, "Old lifetimes quiz", "rust").await;
    insert_completed_progress(&pool, retired_quest).await;
    sqlx::query("UPDATE quests SET is_active = FALSE WHERE id = $1")
        .bind(retired_quest)
        .execute(&pool)
        .await
        .unwrap();

    let engine = common::test_engine(pool.clone());

    // One completion in the category, but it belongs to an archived quest.
    let top_up = engine.grant_recognitions(engine.clock().now()).await.unwrap();
    assert!(top_up.unlocked.is_empty());
    assert_eq!(top_up.stats.total_xp, 0);

    insert_completed_progress(&pool, open_quest).await;
    let top_up = engine.grant_recognitions(engine.clock().now()).await.unwrap();
    let codes: Vec<&str> = top_up.unlocked.iter().map(|d| d.code.as_str()).collect();
    assert_eq!(codes, vec!["rust_master"]);
    assert_eq!(top_up.stats.total_xp, 200);
}
