use argon2::Params;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use jotter_api::password::Passwords;
use jotter_api::token::TokenKeys;
use jotter_api::{AppState, AppStateInner, router};
use jotter_db::Database;

const SECRET: &str = "integration-secret";

fn setup() -> (AppState, Router) {
    let db = Database::open_in_memory().unwrap();
    let passwords = Passwords::new(Params::new(8, 1, 1, None).unwrap()).unwrap();
    let tokens = TokenKeys::new(SECRET, chrono::Duration::hours(1));
    let state = AppStateInner::new(db, passwords, tokens);
    (state.clone(), router(state))
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
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
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
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/register",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await
}

/// Register and log in, returning the bearer token.
async fn signup(app: &Router, username: &str) -> String {
    let (status, _) = register(app, username, "pa55word").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = login(app, username, "pa55word").await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

async fn create_post(app: &Router, token: &str, title: &str) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/posts",
        Some(token),
        Some(json!({ "title": title, "content": format!("{title} body") })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn register_returns_created_user() {
    let (_, app) = setup();

    let (status, body) = register(&app, "ana", "pa55word").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "ana");
    assert!(body["id"].as_i64().is_some());
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn registering_same_username_twice_fails() {
    let (_, app) = setup();

    assert_eq!(register(&app, "ana", "first").await.0, StatusCode::CREATED);

    let (status, body) = register(&app, "ana", "second").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Username already registered");
}

#[tokio::test]
async fn stored_password_is_not_the_plaintext() {
    let (state, app) = setup();
    register(&app, "ana", "pa55word").await;

    let row = state.db.get_user_by_username("ana").unwrap().unwrap();
    assert_ne!(row.password, "pa55word");
    assert!(state.passwords.verify("pa55word", &row.password));
}

#[tokio::test]
async fn register_rejects_missing_and_blank_fields() {
    let (_, app) = setup();

    let (status, _) = send(&app, "POST", "/register", None, Some(json!({ "username": "ana" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = register(&app, "", "pw").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "username must not be empty");
}

#[tokio::test]
async fn login_issues_bearer_token() {
    let (_, app) = setup();
    register(&app, "ana", "pa55word").await;

    let (status, body) = login(&app, "ana", "pa55word").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    assert!(!body["access_token"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn wrong_password_and_unknown_user_fail_identically() {
    let (_, app) = setup();
    register(&app, "ana", "pa55word").await;

    let wrong_password = login(&app, "ana", "nope").await;
    let unknown_user = login(&app, "nobody", "pa55word").await;

    assert_eq!(wrong_password.0, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password, unknown_user);
}

#[tokio::test]
async fn token_endpoint_accepts_oauth_form() {
    let (_, app) = setup();
    register(&app, "ana", "pa55word").await;

    let request = Request::builder()
        .method("POST")
        .uri("/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("grant_type=password&username=ana&password=pa55word&scope="))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    let token = body["access_token"].as_str().unwrap();

    // The form-issued token works on protected routes
    let post = create_post(&app, token, "via form").await;
    assert_eq!(post["author_username"], "ana");
}

#[tokio::test]
async fn creating_a_post_requires_a_valid_token() {
    let (_, app) = setup();
    let body = json!({ "title": "t", "content": "c" });

    let (status, _) = send(&app, "POST", "/posts", None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "POST", "/posts", Some("not-a-jwt"), Some(body.clone())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = TokenKeys::new("some-other-secret", chrono::Duration::hours(1))
        .issue(1, "ana")
        .unwrap();
    let (status, _) = send(&app, "POST", "/posts", Some(&forged), Some(body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_unauthorized() {
    let (_, app) = setup();
    signup(&app, "ana").await;

    let expired = TokenKeys::new(SECRET, chrono::Duration::hours(-2))
        .issue(1, "ana")
        .unwrap();
    let (status, _) = send(
        &app,
        "POST",
        "/posts",
        Some(&expired),
        Some(json!({ "title": "t", "content": "c" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_for_vanished_user_is_invalid_user() {
    let (_, app) = setup();

    let orphan = TokenKeys::new(SECRET, chrono::Duration::hours(1))
        .issue(999, "ghost")
        .unwrap();
    let (status, body) = send(
        &app,
        "POST",
        "/posts",
        Some(&orphan),
        Some(json!({ "title": "t", "content": "c" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid user");
}

#[tokio::test]
async fn create_post_rejects_missing_fields() {
    let (_, app) = setup();
    let token = signup(&app, "ana").await;

    let (status, _) = send(&app, "POST", "/posts", Some(&token), Some(json!({ "title": "t" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "POST", "/posts", Some(&token), Some(json!({ "content": "c" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_returns_every_post_with_its_owner() {
    let (_, app) = setup();
    let ana = signup(&app, "ana").await;
    let bo = signup(&app, "bo").await;

    let a1 = create_post(&app, &ana, "a1").await;
    let b1 = create_post(&app, &bo, "b1").await;
    let a2 = create_post(&app, &ana, "a2").await;

    let (status, body) = send(&app, "GET", "/posts", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let posts = body.as_array().unwrap();
    assert_eq!(posts.len(), 3);

    let summary: Vec<(&str, i64, &str)> = posts
        .iter()
        .map(|p| {
            (
                p["title"].as_str().unwrap(),
                p["user_id"].as_i64().unwrap(),
                p["author_username"].as_str().unwrap(),
            )
        })
        .collect();
    let ana_id = a1["user_id"].as_i64().unwrap();
    let bo_id = b1["user_id"].as_i64().unwrap();
    assert_ne!(ana_id, bo_id);
    assert_eq!(a2["user_id"].as_i64().unwrap(), ana_id);
    assert_eq!(
        summary,
        vec![("a1", ana_id, "ana"), ("b1", bo_id, "bo"), ("a2", ana_id, "ana")]
    );
}

#[tokio::test]
async fn owner_can_update_and_delete() {
    let (_, app) = setup();
    let token = signup(&app, "ana").await;
    let post = create_post(&app, &token, "draft").await;
    let uri = format!("/posts/{}", post["id"]);

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&token),
        Some(json!({ "title": "final", "content": "done" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "final");
    assert_eq!(body["content"], "done");
    assert_eq!(body["id"], post["id"]);

    let (status, body) = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["detail"], "Post deleted");

    let (_, listing) = send(&app, "GET", "/posts", None, None).await;
    assert!(listing.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn other_users_cannot_touch_a_post() {
    let (_, app) = setup();
    let ana = signup(&app, "ana").await;
    let bo = signup(&app, "bo").await;
    let post = create_post(&app, &ana, "mine").await;
    let uri = format!("/posts/{}", post["id"]);

    let (status, _) = send(
        &app,
        "PUT",
        &uri,
        Some(&bo),
        Some(json!({ "title": "yours now", "content": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "DELETE", &uri, Some(&bo), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, listing) = send(&app, "GET", "/posts", None, None).await;
    assert_eq!(listing[0]["title"], "mine");
}

#[tokio::test]
async fn missing_post_is_not_found() {
    let (_, app) = setup();
    let token = signup(&app, "ana").await;

    let (status, body) = send(
        &app,
        "PUT",
        "/posts/4242",
        Some(&token),
        Some(json!({ "title": "t", "content": "c" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Post not found");

    let (status, _) = send(&app, "DELETE", "/posts/4242", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_is_public() {
    let (_, app) = setup();
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn malformed_post_id_gets_json_bad_request() {
    let (_, app) = setup();
    let token = signup(&app, "ana").await;

    for uri in ["/posts/abc", "/posts/99999999999999999999999"] {
        let (status, body) = send(&app, "DELETE", uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("Cannot parse"));

        let (status, body) = send(
            &app,
            "PUT",
            uri,
            Some(&token),
            Some(json!({ "title": "t", "content": "c" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].is_string());
    }
}
