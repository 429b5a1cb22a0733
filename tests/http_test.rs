use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use feedboard::config::Config;
use feedboard::db;
use feedboard::state::AppState;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

fn test_app() -> (TempDir, Router) {
    let temp_dir = TempDir::new().unwrap();
    let db_pool = db::create_pool(&temp_dir.path().join("test.db")).unwrap();
    db::run_migrations(&db_pool).unwrap();

    let mut config = Config::default();
    config.auth.bcrypt_cost = 4;

    let state = AppState {
        db: db_pool,
        config,
        graphql_schema: feedboard::graphql::build_schema(),
    };
    (temp_dir, feedboard::routes::app(state))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(app: &Router, email: &str, name: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "email": email, "name": name, "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_feed_requires_session() {
    let (_tmp, app) = test_app();

    let (status, _) = send(&app, "GET", "/api/posts", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/posts", Some("bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_login_logout() {
    let (_tmp, app) = test_app();
    register(&app, "ann@example.com", "Ann").await;

    let (status, _) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "ann@example.com", "password": "wrong password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "email": "ANN@example.com", "password": "correct horse" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, me) = send(&app, "GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["name"], "Ann");

    let (status, _) = send(&app, "POST", "/auth/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_duplicate_registration_is_rejected() {
    let (_tmp, app) = test_app();
    register(&app, "ann@example.com", "Ann").await;

    let (status, _) = send(
        &app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "email": "ann@example.com", "name": "Other", "password": "another one" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_anonymous_post_over_http() {
    let (_tmp, app) = test_app();
    let ann = register(&app, "ann@example.com", "Ann").await;
    let ben = register(&app, "ben@example.com", "Ben").await;

    let (status, post) = send(
        &app,
        "POST",
        "/api/posts",
        Some(&ann),
        Some(json!({ "title": "Idea", "content": "Make it *faster*", "anonymous": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(post["author"]["name"], "Anonymous (you)");
    assert!(post.get("comments").is_none());

    let id = post["id"].as_str().unwrap();
    let (status, seen) = send(&app, "GET", &format!("/api/posts/{}", id), Some(&ben), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(seen["author"]["name"], "Anonymous");
    assert!(seen["author"]["image"].is_null());
    assert_eq!(seen["comments"], json!([]));
}

#[tokio::test]
async fn test_invalid_post_is_bad_request() {
    let (_tmp, app) = test_app();
    let ann = register(&app, "ann@example.com", "Ann").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/posts",
        Some(&ann),
        Some(json!({ "title": "   ", "content": "body" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_posts_default_to_published() {
    let (_tmp, app) = test_app();
    let ann = register(&app, "ann@example.com", "Ann").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/posts",
        Some(&ann),
        Some(json!({ "title": "Live", "content": "no published flag" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, drafts) = send(&app, "GET", "/api/posts?filter=draft", Some(&ann), None).await;
    assert!(drafts["items"].as_array().unwrap().is_empty());

    let (_, all) = send(&app, "GET", "/api/posts", Some(&ann), None).await;
    assert_eq!(all["items"].as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        "POST",
        "/api/posts",
        Some(&ann),
        Some(json!({ "title": "Draft", "content": "later", "published": false })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, drafts) = send(&app, "GET", "/api/posts?filter=draft", Some(&ann), None).await;
    assert_eq!(drafts["items"][0]["title"], "Draft");
}

#[tokio::test]
async fn test_oversized_input_is_bad_request() {
    let (_tmp, app) = test_app();
    let ann = register(&app, "ann@example.com", "Ann").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/posts",
        Some(&ann),
        Some(json!({ "title": "x".repeat(201), "content": "body" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, post) = send(
        &app,
        "POST",
        "/api/posts",
        Some(&ann),
        Some(json!({ "title": "Ok", "content": "body" })),
    )
    .await;
    let uri = format!("/api/posts/{}/comments", post["id"].as_str().unwrap());

    let (status, _) = send(&app, "POST", &uri, Some(&ann), Some(json!({ "content": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(
        &app,
        "POST",
        &uri,
        Some(&ann),
        Some(json!({ "content": "x".repeat(2001) })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_read_tracking_over_http() {
    let (_tmp, app) = test_app();
    let ann = register(&app, "ann@example.com", "Ann").await;
    let ben = register(&app, "ben@example.com", "Ben").await;

    let (_, post) = send(
        &app,
        "POST",
        "/api/posts",
        Some(&ann),
        Some(json!({ "title": "Read me", "content": "please" })),
    )
    .await;
    let id = post["id"].as_str().unwrap().to_string();

    let (_, count) = send(&app, "GET", "/api/posts/unread-count", Some(&ben), None).await;
    assert_eq!(count, json!({ "unreadCount": 1, "totalCount": 1 }));

    let uri = format!("/api/posts/{}/read", id);
    let (status, first) = send(&app, "POST", &uri, Some(&ben), None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = send(&app, "POST", &uri, Some(&ben), None).await;
    assert_eq!(first, second);

    let (_, count) = send(&app, "GET", "/api/posts/unread-count", Some(&ben), None).await;
    assert_eq!(count["unreadCount"], 0);

    let (_, page) = send(&app, "GET", "/api/posts?filter=unread", Some(&ben), None).await;
    assert!(page["items"].as_array().unwrap().is_empty());
    assert!(page.get("nextCursor").is_none());

    let (_, page) = send(&app, "GET", "/api/posts?filter=unread", Some(&ann), None).await;
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_comments_over_http() {
    let (_tmp, app) = test_app();
    let ann = register(&app, "ann@example.com", "Ann").await;
    let ben = register(&app, "ben@example.com", "Ben").await;

    let (_, post) = send(
        &app,
        "POST",
        "/api/posts",
        Some(&ann),
        Some(json!({ "title": "Thoughts?", "content": "..." })),
    )
    .await;
    let id = post["id"].as_str().unwrap();

    let (status, comment) = send(
        &app,
        "POST",
        &format!("/api/posts/{}/comments", id),
        Some(&ben),
        Some(json!({ "content": "Looks good" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comment["author"]["name"], "Ben");

    let (_, page) = send(&app, "GET", "/api/posts?filter=replied", Some(&ann), None).await;
    assert_eq!(page["items"][0]["commentCount"], 1);

    let (_, page) = send(&app, "GET", "/api/posts?filter=unrepliedByMe", Some(&ben), None).await;
    assert!(page["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_pagination_over_http() {
    let (_tmp, app) = test_app();
    let ann = register(&app, "ann@example.com", "Ann").await;

    for i in 0..5 {
        send(
            &app,
            "POST",
            "/api/posts",
            Some(&ann),
            Some(json!({ "title": format!("Post {}", i), "content": "x" })),
        )
        .await;
    }

    let (_, first) = send(&app, "GET", "/api/posts?limit=2", Some(&ann), None).await;
    assert_eq!(first["items"].as_array().unwrap().len(), 2);
    let cursor = first["nextCursor"].as_str().unwrap();

    let (_, second) = send(
        &app,
        "GET",
        &format!("/api/posts?limit=2&cursor={}", cursor),
        Some(&ann),
        None,
    )
    .await;
    assert_eq!(second["items"].as_array().unwrap().len(), 2);

    let first_ids: Vec<&Value> = first["items"].as_array().unwrap().iter().map(|p| &p["id"]).collect();
    for item in second["items"].as_array().unwrap() {
        assert!(!first_ids.contains(&&item["id"]));
    }

    let (status, _) = send(&app, "GET", "/api/posts?limit=0", Some(&ann), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&app, "GET", "/api/posts?limit=101", Some(&ann), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_missing_post_is_not_found() {
    let (_tmp, app) = test_app();
    let ann = register(&app, "ann@example.com", "Ann").await;

    let (status, _) = send(&app, "GET", "/api/posts/nope", Some(&ann), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/api/posts/nope/comments",
        Some(&ann),
        Some(json!({ "content": "hi" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_graphql_endpoint_uses_session() {
    let (_tmp, app) = test_app();
    let ann = register(&app, "ann@example.com", "Ann").await;

    let (status, _) = send(
        &app,
        "POST",
        "/graphql",
        None,
        Some(json!({ "query": "{ me { name } }" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        "POST",
        "/graphql",
        Some(&ann),
        Some(json!({ "query": "{ me { name } }" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["me"]["name"], "Ann");
}
