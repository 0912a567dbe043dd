//! End-to-end tests for the quest lifecycle and the approval reward pipeline.
//!
//! The clock is pinned to noon on Monday 2024-06-17, so no weekend multiplier
//! applies and the first approval of the day earns the first-daily bonus.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_quest, get_auth, mentee_token, mentor_token, post_auth, post_json_auth,
    start_and_submit,
};
use questline_core::quest::ReviewAction;
use questline_api::engine::ReviewOutcome;
use questline_db::models::quest_progress::SubmitQuest;
use questline_db::repositories::MenteeStatsRepo;
use serde_json::{json, Value};
use sqlx::PgPool;

async fn review(app: axum::Router, progress_id: i64, action: &str) -> (StatusCode, Value) {
    let response = post_json_auth(
        app,
        &format!("/api/v1/progress/{progress_id}/review"),
        &mentor_token(),
        json!({ "action": action, "feedback": "Looks good" }),
    )
    .await;
    let status = response.status();
    (status, body_json(response).await)
}

async fn total_xp(app: axum::Router) -> i64 {
    let response = get_auth(app, "/api/v1/stats", &mentee_token()).await;
    body_json(response).await["data"]["stats"]["total_xp"]
        .as_i64()
        .unwrap()
}

fn breakdown_types(result: &Value) -> Vec<String> {
    result["bonus_breakdown"]
        .as_array()
        .unwrap()
        .iter()
        .map(|line| line["type"].as_str().unwrap().to_string())
        .collect()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn first_approval_awards_xp_bonus_and_achievement(pool: PgPool) {
    let app = common::build_test_app(pool);
    let quest_id = create_quest(app.clone(), "Fix the flaky test", 100).await;
    let progress_id = start_and_submit(app.clone(), quest_id).await;

    let (status, json) = review(app.clone(), progress_id, "approve").await;
    assert_eq!(status, StatusCode::OK);

    let result = &json["data"];
    assert_eq!(result["action"], "approved");
    assert_eq!(result["base_xp"], 100);
    // Base plus the first-quest-of-the-day bonus.
    assert_eq!(result["xp_awarded"], 125);
    // First Steps unlocks on the first completion.
    assert_eq!(result["recognition_xp"], 25);
    assert_eq!(result["new_total_xp"], 150);
    assert_eq!(result["new_streak"], 1);
    assert_eq!(result["progress"]["status"], "completed");
    assert_eq!(result["progress"]["xp_awarded"], 125);
    assert_eq!(result["achievements_unlocked"][0]["code"], "first_steps");
    assert_eq!(
        breakdown_types(result),
        vec!["first_daily".to_string(), "achievement".to_string()]
    );

    let response = get_auth(app.clone(), "/api/v1/stats", &mentee_token()).await;
    let stats = body_json(response).await;
    assert_eq!(stats["data"]["stats"]["total_xp"], 150);
    assert_eq!(stats["data"]["stats"]["quests_completed"], 1);
    assert_eq!(stats["data"]["rank"]["rank"]["name"], "ROOKIE");
    assert_eq!(stats["data"]["streak"]["status"], "active");
    assert_eq!(stats["data"]["streak"]["effective_streak"], 1);

    let response = get_auth(app, "/api/v1/achievements", &mentee_token()).await;
    let achievements = body_json(response).await;
    let first_steps = achievements["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["code"] == "first_steps")
        .unwrap()
        .clone();
    assert_eq!(first_steps["earned"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_approval_same_day_gets_no_first_daily_bonus(pool: PgPool) {
    let app = common::build_test_app(pool);
    let first = create_quest(app.clone(), "First", 100).await;
    let progress_id = start_and_submit(app.clone(), first).await;
    review(app.clone(), progress_id, "approve").await;

    // Created after the first rotation so it cannot be the lucky quest.
    let second = create_quest(app.clone(), "Second", 50).await;
    let progress_id = start_and_submit(app.clone(), second).await;
    let (status, json) = review(app.clone(), progress_id, "approve").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["xp_awarded"], 50);
    assert_eq!(json["data"]["new_streak"], 1);
    assert!(breakdown_types(&json["data"]).is_empty());
    assert_eq!(total_xp(app).await, 200);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn approving_unsubmitted_progress_fails_without_xp(pool: PgPool) {
    let app = common::build_test_app(pool);
    let quest_id = create_quest(app.clone(), "Not yet", 100).await;
    let response = post_auth(
        app.clone(),
        &format!("/api/v1/quests/{quest_id}/start"),
        &mentee_token(),
    )
    .await;
    let progress_id = body_json(response).await["data"]["id"].as_i64().unwrap();

    let (status, json) = review(app.clone(), progress_id, "approve").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(total_xp(app).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn approving_twice_awards_once(pool: PgPool) {
    let app = common::build_test_app(pool);
    let quest_id = create_quest(app.clone(), "Once only", 100).await;
    let progress_id = start_and_submit(app.clone(), quest_id).await;

    let (status, _) = review(app.clone(), progress_id, "approve").await;
    assert_eq!(status, StatusCode::OK);
    let after_first = total_xp(app.clone()).await;

    let (status, _) = review(app.clone(), progress_id, "approve").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(total_xp(app).await, after_first);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn rejection_returns_quest_for_rework(pool: PgPool) {
    let app = common::build_test_app(pool);
    let quest_id = create_quest(app.clone(), "Needs polish", 100).await;
    let progress_id = start_and_submit(app.clone(), quest_id).await;

    let (status, json) = review(app.clone(), progress_id, "reject").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["action"], "rejected");
    assert_eq!(json["data"]["progress"]["status"], "in_progress");
    assert_eq!(json["data"]["progress"]["rejection_count"], 1);
    assert_eq!(json["data"]["progress"]["mentor_feedback"], "Looks good");
    assert_eq!(total_xp(app.clone()).await, 0);

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/progress/{progress_id}/submit"),
        &mentee_token(),
        json!({ "evidence_links": ["https://example.com/pr/2"], "reflection": "Addressed comments" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status"], "submitted");

    let (status, json) = review(app, progress_id, "approve").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["progress"]["rejection_count"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn mentee_cannot_review(pool: PgPool) {
    let app = common::build_test_app(pool);
    let quest_id = create_quest(app.clone(), "Self review", 100).await;
    let progress_id = start_and_submit(app.clone(), quest_id).await;

    let response = post_json_auth(
        app,
        &format!("/api/v1/progress/{progress_id}/review"),
        &mentee_token(),
        json!({ "action": "approve" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn approval_rotates_the_lucky_quest(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let first = create_quest(app.clone(), "First", 100).await;
    create_quest(app.clone(), "Second", 100).await;
    let progress_id = start_and_submit(app.clone(), first).await;
    review(app.clone(), progress_id, "approve").await;

    let lucky: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quests WHERE is_lucky_quest")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(lucky, 1);

    let response = get_auth(app, "/api/v1/activity", &mentee_token()).await;
    let json = body_json(response).await;
    let actions: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action_type"].as_str().unwrap())
        .collect();
    assert!(actions.contains(&"lucky_quest_rotated"));
    assert!(actions.contains(&"quest_approved"));
    assert!(actions.contains(&"achievement_unlocked"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn weekend_event_multiplies_before_flat_bonuses(pool: PgPool) {
    // Saturday.
    let saturday = chrono::NaiveDate::from_ymd_opt(2024, 6, 22).unwrap();
    let app = common::build_test_app_on(pool, saturday);
    let quest_id = create_quest(app.clone(), "Weekend work", 100).await;
    let progress_id = start_and_submit(app.clone(), quest_id).await;

    let (status, json) = review(app, progress_id, "approve").await;
    assert_eq!(status, StatusCode::OK);
    // 100 doubled by the default weekend multiplier, then +25 first daily.
    assert_eq!(json["data"]["xp_awarded"], 225);
    assert_eq!(
        breakdown_types(&json["data"]),
        vec![
            "weekend".to_string(),
            "first_daily".to_string(),
            "achievement".to_string()
        ]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn stats_reset_is_mentor_only(pool: PgPool) {
    let app = common::build_test_app(pool);
    let quest_id = create_quest(app.clone(), "Before reset", 100).await;
    let progress_id = start_and_submit(app.clone(), quest_id).await;
    review(app.clone(), progress_id, "approve").await;

    let response = post_auth(app.clone(), "/api/v1/stats/reset", &mentee_token()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_auth(app.clone(), "/api/v1/stats/reset", &mentor_token()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["stats"]["total_xp"], 0);
    assert_eq!(json["data"]["stats"]["streak_freeze_available"], true);
    assert_eq!(json["data"]["streak"]["status"], "none");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_approvals_do_not_lose_updates(pool: PgPool) {
    let engine = common::test_engine(pool.clone());
    let evidence = SubmitQuest {
        evidence_links: vec!["https://example.com/pr/1".to_string()],
        reflection: None,
    };

    let mut progress_ids = Vec::new();
    for (title, xp_reward) in [("Left", 100_i64), ("Right", 200_i64)] {
        let quest_id: i64 = sqlx::query_scalar(
            "INSERT INTO quests (title, xp_reward) VALUES ($1, $2) RETURNING id",
        )
        .bind(title)
        .bind(xp_reward)
        .fetch_one(&pool)
        .await
        .unwrap();
        let progress = engine.start_quest(quest_id).await.unwrap();
        engine.submit_quest(progress.id, &evidence).await.unwrap();
        progress_ids.push(progress.id);
    }

    let (left, right) = tokio::join!(
        engine.review(progress_ids[0], ReviewAction::Approve, None),
        engine.review(progress_ids[1], ReviewAction::Approve, None),
    );
    let ReviewOutcome::Approved(left) = left.unwrap() else {
        panic!("left review was not an approval");
    };
    let ReviewOutcome::Approved(right) = right.unwrap() else {
        panic!("right review was not an approval");
    };

    let stats = MenteeStatsRepo::get(&pool).await.unwrap();
    assert_eq!(stats.quests_completed, 2);
    assert_eq!(
        stats.total_xp,
        left.xp_awarded + right.xp_awarded + left.recognition_xp + right.recognition_xp
    );
}
