//! Integration tests for the comment endpoints.
//!
//! Requires `TEST_DATABASE_URL`.
//!
//! Run with: cargo test -p teahouse-integration-tests -- --ignored

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use teahouse_core::TeaId;
use teahouse_integration_tests::TestContext;
use teahouse_server::db::{CommentRepository, RepositoryError};
use teahouse_server::models::CommentCreate;

/// Create a tea as a fresh user and return its ID.
async fn seeded_tea(ctx: &TestContext, name: &str) -> i64 {
    let (client, _) = ctx.login_as(&format!("{}_owner", name.to_lowercase())).await;
    let tea = ctx.create_tea(&client, name, 3).await;
    tea["id"].as_i64().unwrap()
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_tea_without_comments_lists_empty() {
    let ctx = TestContext::new().await;
    let tea_id = seeded_tea(&ctx, "Silver").await;

    let resp = ctx
        .client()
        .get(ctx.url(&format!("/teas/{tea_id}/comments")))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let comments: Value = resp.json().await.unwrap();
    assert_eq!(comments, json!([]));

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_comments_on_missing_tea_not_found() {
    let ctx = TestContext::new().await;
    let client = ctx.client();

    let resp = client.get(ctx.url("/teas/4242/comments")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .post(ctx.url("/teas/4242/comments"))
        .json(&json!({"content": "Into the void"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Tea not found");

    assert_eq!(ctx.count("comments").await, 0);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_insert_for_vanished_tea_is_not_found() {
    let ctx = TestContext::new().await;
    let tea_id = seeded_tea(&ctx, "Yunnan").await;

    // Tea disappears between the handler's check and the insert
    sqlx::query("DELETE FROM teas WHERE id = $1")
        .bind(tea_id)
        .execute(&ctx.pool)
        .await
        .unwrap();

    let mut conn = ctx.pool.acquire().await.unwrap();
    let payload = CommentCreate {
        content: "Too late".to_string(),
    };
    let err = CommentRepository::new(&mut conn)
        .create(TeaId::new(i32::try_from(tea_id).unwrap()), &payload)
        .await
        .unwrap_err();

    assert!(matches!(err, RepositoryError::NotFound));
    drop(conn);
    assert_eq!(ctx.count("comments").await, 0);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_create_uses_path_tea_and_ignores_body_ids() {
    let ctx = TestContext::new().await;
    let tea_id = seeded_tea(&ctx, "Jasmine").await;
    let other_id = seeded_tea(&ctx, "Chamomile").await;

    // Anonymous: comments carry no ownership
    let resp = ctx
        .client()
        .post(ctx.url(&format!("/teas/{tea_id}/comments")))
        .json(&json!({"id": 999, "tea_id": other_id, "content": "Fragrant"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let comment: Value = resp.json().await.unwrap();
    assert_ne!(comment["id"], 999);
    assert_eq!(comment["tea_id"], tea_id);
    assert_eq!(comment["content"], "Fragrant");

    let id = comment["id"].as_i64().unwrap();
    let fetched: Value = ctx
        .client()
        .get(ctx.url(&format!("/comments/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched, comment);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_update_comment_partial() {
    let ctx = TestContext::new().await;
    let tea_id = seeded_tea(&ctx, "Keemun").await;
    let client = ctx.client();

    let comment: Value = client
        .post(ctx.url(&format!("/teas/{tea_id}/comments")))
        .json(&json!({"content": "Chocolatey"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = comment["id"].as_i64().unwrap();

    let resp = client
        .put(ctx.url(&format!("/comments/{id}")))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let unchanged: Value = resp.json().await.unwrap();
    assert_eq!(unchanged, comment);

    let updated: Value = client
        .put(ctx.url(&format!("/comments/{id}")))
        .json(&json!({"content": "Smoky, actually"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["content"], "Smoky, actually");
    assert_eq!(updated["tea_id"], tea_id);

    let resp = client
        .put(ctx.url("/comments/31337"))
        .json(&json!({"content": "Nobody home"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}

#[tokio::test]
#[ignore = "requires database"]
async fn test_delete_comment_twice() {
    let ctx = TestContext::new().await;
    let tea_id = seeded_tea(&ctx, "Nilgiri").await;
    let client = ctx.client();

    let comment: Value = client
        .post(ctx.url(&format!("/teas/{tea_id}/comments")))
        .json(&json!({"content": "Brisk"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = comment["id"].as_i64().unwrap();

    let resp = client
        .delete(ctx.url(&format!("/comments/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], format!("Comment with ID {id} has been deleted"));

    let resp = client
        .delete(ctx.url(&format!("/comments/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    ctx.cleanup().await;
}
