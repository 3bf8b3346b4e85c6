//! Router tests over the in-memory store

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use rushmore_server::db::MemoryStore;
use rushmore_server::{build_router, ApiKeys, AppState, ServerConfig};

fn app_with(store: MemoryStore, keys: ApiKeys) -> Router {
    build_router(AppState::new(store, keys), &ServerConfig::default())
}

fn app() -> Router {
    app_with(MemoryStore::new(), ApiKeys::default())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    send_with_key(app, method, uri, body, None).await
}

async fn send_with_key(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    key: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header("apikey", key);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn create_post(app: &Router, title: &str, category: Option<i64>) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/posts",
        Some(json!({
            "title": title,
            "content": "First paragraph.\n\nSecond paragraph.",
            "author": "Max Fischer",
            "categoryId": category,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

async fn create_comment(app: &Router, post_id: i64, content: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        &format!("/api/posts/{post_id}/comments"),
        Some(json!({ "content": content })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["likes"], 0);
    body["id"].as_i64().unwrap()
}

async fn like(app: &Router, comment_id: i64) -> Value {
    let (status, body) = send(app, "POST", &format!("/api/comments/{comment_id}/like"), None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body
}

#[tokio::test]
async fn health_endpoint() {
    let (status, body) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn create_and_fetch_post() {
    let app = app();
    let id = create_post(&app, "Rushmore", None).await;

    let (status, body) = send(&app, "GET", &format!("/api/posts/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Rushmore");
    assert_eq!(body["author"], "Max Fischer");
    assert_eq!(body["categoryName"], "Uncategorised");
    assert!(body["category"].is_null());
    assert!(body["createdAt"].is_string());
    assert_eq!(
        body["paragraphs"],
        json!(["First paragraph.", "Second paragraph."])
    );
}

#[tokio::test]
async fn malformed_path_ids_are_400() {
    let app = app();
    for uri in ["/api/posts/abc", "/api/posts/0", "/api/posts/%FF"] {
        let (status, body) = send(&app, "GET", uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["message"], "id: must be a positive integer id", "{uri}");
    }
}

#[tokio::test]
async fn post_validation_rejects_empty_fields() {
    let app = app();
    for missing in ["title", "content", "author"] {
        let mut payload = json!({
            "title": "t",
            "content": "c",
            "author": "a",
        });
        payload[missing] = json!("   ");

        let (status, body) = send(&app, "POST", "/api/posts", Some(payload)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{missing}");
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["message"], format!("{missing} cannot be empty"));
    }

    let (_, body) = send(&app, "GET", "/api/posts", None).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn empty_category_string_means_uncategorised() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/posts",
        Some(json!({ "title": "t", "content": "c", "author": "a", "categoryId": "" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["categoryId"].is_null());
}

#[tokio::test]
async fn unknown_category_is_404() {
    let (status, body) = send(
        &app(),
        "POST",
        "/api/posts",
        Some(json!({ "title": "t", "content": "c", "author": "a", "categoryId": 999 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn update_post_replaces_fields() {
    let app = app_with(MemoryStore::with_sample_categories(), ApiKeys::default());
    let id = create_post(&app, "Draft", None).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/posts/{id}"),
        Some(json!({
            "title": "Final",
            "content": "Edited",
            "author": "Herman Blume",
            "categoryId": "1",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["title"], "Final");
    assert_eq!(body["categoryId"], 1);

    let (_, body) = send(&app, "GET", &format!("/api/posts/{id}"), None).await;
    assert_eq!(body["category"]["name"], "Essays");

    let (status, _) = send(
        &app,
        "PUT",
        "/api/posts/4242",
        Some(json!({ "title": "t", "content": "c", "author": "a" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_posts_respects_sort_and_counts_comments() {
    let app = app();
    let older = create_post(&app, "Older", None).await;
    let newer = create_post(&app, "Newer", None).await;
    create_comment(&app, older, "one").await;
    create_comment(&app, older, "two").await;

    let (_, body) = send(&app, "GET", "/api/posts", None).await;
    let posts = body.as_array().unwrap();
    assert_eq!(posts[0]["id"].as_i64(), Some(newer));
    assert_eq!(posts[1]["commentCount"], 2);

    let (_, body) = send(&app, "GET", "/api/posts?sort=asc", None).await;
    assert_eq!(body[0]["id"].as_i64(), Some(older));
}

#[tokio::test]
async fn comments_require_post_id() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/comments", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "Post ID is required" }));

    let (status, body) = send(&app, "GET", "/api/comments?postId=", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Post ID is required");

    let (status, _) = send(&app, "GET", "/api/comments?postId=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn comments_sort_by_likes_newest_oldest() {
    let app = app();
    let post = create_post(&app, "Sorted", None).await;
    let first = create_comment(&app, post, "first").await;
    let second = create_comment(&app, post, "second").await;
    let third = create_comment(&app, post, "third").await;

    like(&app, first).await;
    like(&app, first).await;
    like(&app, third).await;

    let ids = |body: Value| -> Vec<i64> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_i64().unwrap())
            .collect()
    };

    let (_, body) = send(&app, "GET", &format!("/api/comments?postId={post}&sort=likes"), None).await;
    assert_eq!(ids(body), vec![first, third, second]);

    let (_, body) = send(&app, "GET", &format!("/api/comments?postId={post}&sort=oldest"), None).await;
    assert_eq!(ids(body), vec![first, second, third]);

    let (_, body) = send(&app, "GET", &format!("/api/comments?postId={post}"), None).await;
    assert_eq!(ids(body), vec![third, second, first]);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/comments?postId={post}&sort=newest&limit=1"),
        None,
    )
    .await;
    assert_eq!(ids(body), vec![third]);
}

#[tokio::test]
async fn like_increments_by_one() {
    let app = app();
    let post = create_post(&app, "Liked", None).await;
    let comment = create_comment(&app, post, "nice").await;

    let body = like(&app, comment).await;
    assert_eq!(body, json!({ "success": true, "likes": 1 }));
    let body = like(&app, comment).await;
    assert_eq!(body["likes"], 2);

    let (_, body) = send(&app, "GET", &format!("/api/comments/{comment}"), None).await;
    assert_eq!(body["likes"], 2);
}

#[tokio::test]
async fn like_missing_or_malformed_comment() {
    let app = app();
    let (status, _) = send(&app, "POST", "/api/comments/77/like", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", "/api/comments/abc/like", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn comment_validation_and_unknown_post() {
    let app = app();
    let post = create_post(&app, "Commented", None).await;

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/posts/{post}/comments"),
        Some(json!({ "content": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/api/posts/999/comments",
        Some(json!({ "content": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn edit_comment_checks_owning_post() {
    let app = app();
    let post = create_post(&app, "Owner", None).await;
    let other = create_post(&app, "Other", None).await;
    let comment = create_comment(&app, post, "original").await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/posts/{post}/comments/{comment}"),
        Some(json!({ "content": "edited" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "edited");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/posts/{other}/comments/{comment}"),
        Some(json!({ "content": "hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, "GET", &format!("/api/comments/{comment}"), None).await;
    assert_eq!(body["content"], "edited");
}

#[tokio::test]
async fn deleting_post_removes_its_comments() {
    let app = app();
    let post = create_post(&app, "Doomed", None).await;
    let comment = create_comment(&app, post, "gone soon").await;

    let (status, body) = send(&app, "DELETE", &format!("/api/posts/{post}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send(&app, "GET", &format!("/api/posts/{post}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", &format!("/api/comments/{comment}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &format!("/api/posts/{post}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_category_keeps_posts_uncategorised() {
    let app = app();
    let (status, category) = send(
        &app,
        "POST",
        "/api/categories",
        Some(json!({ "name": "Reviews", "description": "Critical analysis" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let category_id = category["id"].as_i64().unwrap();
    let post = create_post(&app, "Reviewed", Some(category_id)).await;

    let (_, detail) = send(&app, "GET", &format!("/api/categories/{category_id}"), None).await;
    assert_eq!(detail["category"]["postCount"], 1);
    assert_eq!(detail["posts"][0]["categoryName"], "Reviews");

    let (status, _) = send(&app, "DELETE", &format!("/api/categories/{category_id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", &format!("/api/posts/{post}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["categoryId"].is_null());
    assert_eq!(body["categoryName"], "Uncategorised");

    let (status, _) = send(&app, "GET", &format!("/api/categories/{category_id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn categories_listed_by_name_with_counts() {
    let app = app_with(MemoryStore::with_sample_categories(), ApiKeys::default());
    create_post(&app, "Essay", Some(1)).await;

    let (status, body) = send(&app, "GET", "/api/categories", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_owned())
        .collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);

    let essays = body
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Essays")
        .unwrap();
    assert_eq!(essays["postCount"], 1);
}

#[tokio::test]
async fn home_shows_latest_three_posts_and_four_categories() {
    let app = app_with(MemoryStore::with_sample_categories(), ApiKeys::default());
    for title in ["a", "b", "c", "d"] {
        create_post(&app, title, None).await;
    }

    let (status, body) = send(&app, "GET", "/api/home", None).await;
    assert_eq!(status, StatusCode::OK);
    let latest = body["latestPosts"].as_array().unwrap();
    assert_eq!(latest.len(), 3);
    assert_eq!(latest[0]["title"], "d");
    let featured = body["featuredCategories"].as_array().unwrap();
    assert_eq!(featured.len(), 4);
    assert_eq!(featured[0]["name"], "Essays");
}

#[tokio::test]
async fn keys_gate_writes_and_deletes() {
    let keys = ApiKeys::new(Some("anon".into()), Some("service".into()));
    let app = app_with(MemoryStore::new(), keys);
    let payload = json!({ "title": "t", "content": "c", "author": "a" });

    let (status, _) = send(&app, "POST", "/api/posts", Some(payload.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) =
        send_with_key(&app, "POST", "/api/posts", Some(payload), Some("anon")).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_i64().unwrap();

    // Reads stay public
    let (status, _) = send(&app, "GET", &format!("/api/posts/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/api/posts/{id}");
    let (status, _) = send_with_key(&app, "DELETE", &uri, None, Some("anon")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send_with_key(&app, "DELETE", &uri, None, Some("service")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn bearer_header_is_accepted() {
    let keys = ApiKeys::new(Some("anon".into()), Some("service".into()));
    let app = app_with(MemoryStore::new(), keys);

    let request = |token: &str| {
        Request::builder()
            .method("POST")
            .uri("/api/posts")
            .header("authorization", format!("Bearer {token}"))
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "title": "t", "content": "c", "author": "a" }).to_string(),
            ))
            .unwrap()
    };

    let response = app.clone().oneshot(request("anon")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.clone().oneshot(request("wrong")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn categories_require_service_role() {
    let keys = ApiKeys::new(Some("anon".into()), Some("service".into()));
    let app = app_with(MemoryStore::with_sample_categories(), keys);
    let payload = json!({ "name": "Recipes" });

    let (status, body) =
        send_with_key(&app, "POST", "/api/categories", Some(payload.clone()), Some("anon")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, _) = send_with_key(&app, "DELETE", "/api/categories/1", None, Some("anon")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, "GET", "/api/categories/1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) =
        send_with_key(&app, "POST", "/api/categories", Some(payload), Some("service")).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) =
        send_with_key(&app, "DELETE", "/api/categories/1", None, Some("service")).await;
    assert_eq!(status, StatusCode::OK);
}
