//! HTTP-level integration tests for the review ledger: append, edit,
//! delete, ownership enforcement, and per-device statistics.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get, get_auth, post_json, post_json_auth, put_json_auth};
use sqlx::PgPool;

use aidex_api::auth::password::hash_password;
use aidex_db::models::device::{Benchmarks, CreateDevice};
use aidex_db::models::user::CreateUser;
use aidex_db::repositories::{DeviceRepo, UserRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a user directly, optionally promote to admin, log in through the
/// API, and return the bearer token.
async fn signup_and_login(pool: &PgPool, username: &str, admin: bool) -> String {
    let password = "review_test_pw_1!";
    let hashed = hash_password(password).expect("hashing should succeed");
    let input = CreateUser {
        username: username.to_string(),
        password_hash: hashed,
        name: None,
        email: None,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed");
    if admin {
        sqlx::query("UPDATE users SET is_admin = TRUE WHERE username = $1")
            .bind(username)
            .execute(pool)
            .await
            .expect("promotion should succeed");
    }

    let app = common::build_test_app(pool.clone()).await;
    let body = serde_json::json!({ "username": username, "password": password });
    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    json["token"].as_str().unwrap().to_string()
}

/// Seed a device directly through the repository and return its id.
async fn seed_device(pool: &PgPool, name: &str) -> i64 {
    let input = CreateDevice {
        name: name.to_string(),
        category: "Edge Server".to_string(),
        processor: "TestChip X1".to_string(),
        ram_gb: 16,
        manufacturer_name: "Testcorp".to_string(),
        manufacturer_country: "Testland".to_string(),
        storage: "512GB NVMe".to_string(),
        avg_inference_latency_ms: 12,
        power_watts: 65,
        price_usd: 1999,
        release_year: 2025,
        benchmarks: Benchmarks::default(),
        location_lat: None,
        location_lon: None,
    };
    DeviceRepo::create(pool, &input)
        .await
        .expect("device creation should succeed")
        .id
}

/// Post a review and return the created review's id.
async fn add_review(pool: &PgPool, device_id: i64, token: &str, rating: i32, comment: &str) -> String {
    let app = common::build_test_app(pool.clone()).await;
    let body = serde_json::json!({ "rating": rating, "comment": comment });
    let response =
        post_json_auth(app, &format!("/api/v1/devices/{device_id}/reviews"), body, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    json["id"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Append tests
// ---------------------------------------------------------------------------

/// Posting a review requires authentication.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_add_review_requires_auth(pool: PgPool) {
    let device_id = seed_device(&pool, "NoAuthBox").await;
    let app = common::build_test_app(pool).await;

    let body = serde_json::json!({ "rating": 4, "comment": "nice" });
    let response = post_json(app, &format!("/api/v1/devices/{device_id}/reviews"), body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Ratings outside 1..=5 are rejected; the boundary values pass.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_review_rating_bounds(pool: PgPool) {
    let token = signup_and_login(&pool, "rater", false).await;
    let device_id = seed_device(&pool, "BoundsBox").await;

    for bad in [0, 6, -1] {
        let app = common::build_test_app(pool.clone()).await;
        let body = serde_json::json!({ "rating": bad, "comment": "x" });
        let response =
            post_json_auth(app, &format!("/api/v1/devices/{device_id}/reviews"), body, &token)
                .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "rating {bad}");
    }

    for good in [1, 5] {
        let app = common::build_test_app(pool.clone()).await;
        let body = serde_json::json!({ "rating": good, "comment": "x" });
        let response =
            post_json_auth(app, &format!("/api/v1/devices/{device_id}/reviews"), body, &token)
                .await;
        assert_eq!(response.status(), StatusCode::CREATED, "rating {good}");
    }
}

/// Reviewing a nonexistent device is a 404.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_add_review_missing_device(pool: PgPool) {
    let token = signup_and_login(&pool, "lost", false).await;
    let app = common::build_test_app(pool).await;

    let body = serde_json::json!({ "rating": 3, "comment": "where" });
    let response = post_json_auth(app, "/api/v1/devices/999999/reviews", body, &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// The stored author is the token subject. A body-supplied author field
/// is ignored entirely.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_review_author_comes_from_token(pool: PgPool) {
    let token = signup_and_login(&pool, "honest", false).await;
    let device_id = seed_device(&pool, "AuthorBox").await;

    let app = common::build_test_app(pool.clone()).await;
    let body = serde_json::json!({ "rating": 4, "comment": "mine", "author": "impostor" });
    let response =
        post_json_auth(app, &format!("/api/v1/devices/{device_id}/reviews"), body, &token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["author"], "honest");

    let app = common::build_test_app(pool).await;
    let response = get(app, &format!("/api/v1/devices/{device_id}/reviews")).await;
    let json = body_json(response).await;
    assert_eq!(json[0]["author"], "honest");
}

/// Reviews come back in insertion order.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_review_order_preserved(pool: PgPool) {
    let token = signup_and_login(&pool, "orderly", false).await;
    let device_id = seed_device(&pool, "OrderBox").await;

    for comment in ["first", "second", "third"] {
        add_review(&pool, device_id, &token, 3, comment).await;
    }

    let app = common::build_test_app(pool).await;
    let response = get(app, &format!("/api/v1/devices/{device_id}/reviews")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let comments: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["comment"].as_str().unwrap())
        .collect();
    assert_eq!(comments, ["first", "second", "third"]);
}

/// Listing reviews of a missing device is a 404; an existing device with
/// no reviews is an empty array, not an error.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_reviews(pool: PgPool) {
    let device_id = seed_device(&pool, "EmptyBox").await;

    let app = common::build_test_app(pool.clone()).await;
    let response = get(app, &format!("/api/v1/devices/{device_id}/reviews")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 0);

    let app = common::build_test_app(pool).await;
    let response = get(app, "/api/v1/devices/999999/reviews").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Ownership tests
// ---------------------------------------------------------------------------

/// The author can edit their own review; the change is visible on read.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_owner_can_edit_own_review(pool: PgPool) {
    let token = signup_and_login(&pool, "owner", false).await;
    let device_id = seed_device(&pool, "EditBox").await;
    let review_id = add_review(&pool, device_id, &token, 2, "meh").await;

    let app = common::build_test_app(pool.clone()).await;
    let body = serde_json::json!({ "rating": 5, "comment": "grew on me" });
    let response = put_json_auth(
        app,
        &format!("/api/v1/devices/{device_id}/reviews/{review_id}"),
        body,
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool).await;
    let response = get(app, &format!("/api/v1/devices/{device_id}/reviews")).await;
    let json = body_json(response).await;
    assert_eq!(json[0]["rating"], 5);
    assert_eq!(json[0]["comment"], "grew on me");
    assert_eq!(json[0]["id"].as_str().unwrap(), review_id);
}

/// A non-owner editing or deleting someone else's review gets the same
/// 404 as a nonexistent review, and the review is untouched.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_non_owner_gets_not_found(pool: PgPool) {
    let alice = signup_and_login(&pool, "alice", false).await;
    let bob = signup_and_login(&pool, "bob", false).await;
    let device_id = seed_device(&pool, "OwnershipBox").await;
    let review_id = add_review(&pool, device_id, &alice, 4, "alice's take").await;

    let app = common::build_test_app(pool.clone()).await;
    let body = serde_json::json!({ "comment": "bob was here" });
    let edit_response = put_json_auth(
        app,
        &format!("/api/v1/devices/{device_id}/reviews/{review_id}"),
        body,
        &bob,
    )
    .await;
    assert_eq!(edit_response.status(), StatusCode::NOT_FOUND);
    let edit_json = body_json(edit_response).await;

    let app = common::build_test_app(pool.clone()).await;
    let missing_id = uuid::Uuid::new_v4();
    let body = serde_json::json!({ "comment": "bob was here" });
    let missing_response = put_json_auth(
        app,
        &format!("/api/v1/devices/{device_id}/reviews/{missing_id}"),
        body,
        &bob,
    )
    .await;
    assert_eq!(missing_response.status(), StatusCode::NOT_FOUND);
    let missing_json = body_json(missing_response).await;

    // Same shape and code either way, so existence does not leak.
    assert_eq!(edit_json["code"], missing_json["code"]);

    let app = common::build_test_app(pool.clone()).await;
    let response = delete_auth(
        app,
        &format!("/api/v1/devices/{device_id}/reviews/{review_id}"),
        &bob,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let app = common::build_test_app(pool).await;
    let response = get(app, &format!("/api/v1/devices/{device_id}/reviews")).await;
    let json = body_json(response).await;
    assert_eq!(json[0]["comment"], "alice's take");
}

/// Admins can edit and delete any review.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_admin_bypasses_ownership(pool: PgPool) {
    let alice = signup_and_login(&pool, "alice2", false).await;
    let admin = signup_and_login(&pool, "moderator", true).await;
    let device_id = seed_device(&pool, "ModBox").await;
    let review_id = add_review(&pool, device_id, &alice, 1, "spam spam spam").await;

    let app = common::build_test_app(pool.clone()).await;
    let body = serde_json::json!({ "comment": "[moderated]" });
    let response = put_json_auth(
        app,
        &format!("/api/v1/devices/{device_id}/reviews/{review_id}"),
        body,
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone()).await;
    let response = delete_auth(
        app,
        &format!("/api/v1/devices/{device_id}/reviews/{review_id}"),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool).await;
    let response = get(app, &format!("/api/v1/devices/{device_id}/reviews")).await;
    let json = body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 0);
}

/// An empty review patch is a 400, and out-of-range ratings in a patch
/// are rejected before touching the database.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_review_update_validation(pool: PgPool) {
    let token = signup_and_login(&pool, "fixer", false).await;
    let device_id = seed_device(&pool, "PatchBox").await;
    let review_id = add_review(&pool, device_id, &token, 3, "ok").await;

    let app = common::build_test_app(pool.clone()).await;
    let response = put_json_auth(
        app,
        &format!("/api/v1/devices/{device_id}/reviews/{review_id}"),
        serde_json::json!({}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool).await;
    let response = put_json_auth(
        app,
        &format!("/api/v1/devices/{device_id}/reviews/{review_id}"),
        serde_json::json!({ "rating": 9 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Stats and cross-device listing
// ---------------------------------------------------------------------------

/// Per-device stats: null average and zero count with no reviews, a real
/// average once reviews exist.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_review_stats(pool: PgPool) {
    let token = signup_and_login(&pool, "statter", false).await;
    let device_id = seed_device(&pool, "StatsBox").await;

    let app = common::build_test_app(pool.clone()).await;
    let response = get(app, &format!("/api/v1/devices/{device_id}/stats")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["average_rating"].is_null());
    assert_eq!(json["review_count"], 0);

    add_review(&pool, device_id, &token, 2, "a").await;
    add_review(&pool, device_id, &token, 4, "b").await;

    let app = common::build_test_app(pool.clone()).await;
    let response = get(app, &format!("/api/v1/devices/{device_id}/stats")).await;
    let json = body_json(response).await;
    assert_eq!(json["device_id"], device_id);
    assert_eq!(json["average_rating"], 3.0);
    assert_eq!(json["review_count"], 2);

    let app = common::build_test_app(pool).await;
    let response = get(app, "/api/v1/devices/999999/stats").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// /auth/myreviews aggregates the caller's reviews across devices.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_my_reviews(pool: PgPool) {
    let mine = signup_and_login(&pool, "prolific", false).await;
    let other = signup_and_login(&pool, "someone", false).await;
    let first = seed_device(&pool, "FirstBox").await;
    let second = seed_device(&pool, "SecondBox").await;

    add_review(&pool, first, &mine, 4, "solid").await;
    add_review(&pool, second, &mine, 2, "loud fans").await;
    add_review(&pool, first, &other, 5, "not mine").await;

    let app = common::build_test_app(pool).await;
    let response = get_auth(app, "/api/v1/auth/myreviews", &mine).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let reviews = json.as_array().unwrap();
    assert_eq!(reviews.len(), 2);
    for review in reviews {
        assert!(review["device_name"].is_string());
        assert!(review["rating"].is_number());
    }
}
