mod common;

use axum::http::StatusCode;
use finboard_backend::model::user::Role;
use serde_json::json;

use common::TestContext;

#[tokio::test]
async fn test_register_returns_token_and_public_user() {
    let ctx = TestContext::new();
    let (status, body) = ctx
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "casey",
                "email": "casey@example.com",
                "password": "Password123",
                "role": "analyst",
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    let token = body["token"].as_str().expect("token missing");
    assert!(!token.is_empty());
    assert_eq!(body["user"]["role"], "analyst");
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());

    // The returned token must resolve to the same user through the
    // authenticated profile route.
    let (status, body) = ctx
        .request("GET", "/api/auth/profile", Some(token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "casey");
    assert_eq!(body["user"]["role"], "analyst");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_defaults_to_viewer() {
    let ctx = TestContext::new();
    let (status, body) = ctx
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "plain",
                "email": "plain@example.com",
                "password": "Password123",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "viewer");
}

#[tokio::test]
async fn test_register_duplicate_is_conflict() {
    let ctx = TestContext::new();
    ctx.register("casey", Role::Viewer).await;

    let (status, _) = ctx
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "casey2",
                "email": "casey@example.com",
                "password": "Password123",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = ctx
        .request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": "casey",
                "email": "other@example.com",
                "password": "Password123",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_wrong_password_matches_unknown_email() {
    let ctx = TestContext::new();
    ctx.register("casey", Role::Viewer).await;

    let (wrong_status, wrong_body) = ctx
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "casey@example.com", "password": "NotThePassword1" })),
        )
        .await;
    let (unknown_status, unknown_body) = ctx
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "ghost@example.com", "password": "Password123" })),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    // Identical bodies: the response never reveals whether the email exists
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn test_login_success() {
    let ctx = TestContext::new();
    ctx.register("casey", Role::Admin).await;

    let (status, body) = ctx
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "casey@example.com", "password": "Password123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["email"], "casey@example.com");
}

#[tokio::test]
async fn test_missing_token_is_401_invalid_token_is_403() {
    let ctx = TestContext::new();

    let (status, _) = ctx.request("GET", "/api/auth/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx
        .request("GET", "/api/auth/profile", Some("not.a.token"), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_token_for_vanished_user_is_403() {
    let ctx = TestContext::new();
    // Token signed with the right secret but for an id nobody has
    let token = {
        use finboard_backend::util::jwt::JwtTokenUtils;
        ctx.jwt_utils
            .generate_token("507f1f77bcf86cd799439011")
            .unwrap()
    };
    let (status, _) = ctx
        .request("GET", "/api/auth/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_users_is_admin_only() {
    let ctx = TestContext::new();
    let admin = ctx.register("root", Role::Admin).await;
    let viewer = ctx.register("watcher", Role::Viewer).await;
    let analyst = ctx.register("nums", Role::Analyst).await;

    let (status, body) = ctx
        .request("GET", "/api/auth/users", Some(&admin.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 3);

    let (status, _) = ctx
        .request("GET", "/api/auth/users", Some(&viewer.token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = ctx
        .request("GET", "/api/auth/users", Some(&analyst.token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_change_password_requires_current() {
    let ctx = TestContext::new();
    let auth = ctx.register("casey", Role::Viewer).await;

    let (status, _) = ctx
        .request(
            "PUT",
            "/api/auth/change-password",
            Some(&auth.token),
            Some(json!({ "currentPassword": "WrongOne123", "newPassword": "NewPassword456" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .request(
            "PUT",
            "/api/auth/change-password",
            Some(&auth.token),
            Some(json!({ "currentPassword": "Password123", "newPassword": "NewPassword456" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    // The new password works, the old one does not
    let (status, _) = ctx
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "casey@example.com", "password": "NewPassword456" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = ctx
        .request(
            "POST",
            "/api/auth/login",
            None,
            Some(json!({ "email": "casey@example.com", "password": "Password123" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_profile_rejects_taken_email() {
    let ctx = TestContext::new();
    ctx.register("first", Role::Viewer).await;
    let second = ctx.register("second", Role::Viewer).await;

    let (status, _) = ctx
        .request(
            "PUT",
            "/api/auth/profile",
            Some(&second.token),
            Some(json!({ "email": "first@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = ctx
        .request(
            "PUT",
            "/api/auth/profile",
            Some(&second.token),
            Some(json!({ "username": "renamed" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["username"], "renamed");
}

#[tokio::test]
async fn test_setup_admin_is_idempotent() {
    let ctx = TestContext::new();

    let (status, body) = ctx
        .request("POST", "/api/auth/setup-admin", None, None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["role"], "admin");

    // Second call is a no-op, not an error
    let (status, body) = ctx
        .request("POST", "/api/auth/setup-admin", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("token").is_none());
    assert_eq!(body["message"], "Admin user already exists");
}

#[tokio::test]
async fn test_activity_log_records_logins() {
    let ctx = TestContext::new();
    let admin = ctx.register("root", Role::Admin).await;

    ctx.request(
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "root@example.com", "password": "Password123" })),
    )
    .await;

    let (status, body) = ctx
        .request("GET", "/api/auth/activity-log", Some(&admin.token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let log = body["activityLog"].as_array().unwrap();
    assert!(log.iter().any(|e| e["action"] == "Login"));
    assert!(log.iter().all(|e| e["user"].as_str().is_some()));

    // Not visible below admin
    let viewer = ctx.register("watcher", Role::Viewer).await;
    let (status, _) = ctx
        .request("GET", "/api/auth/activity-log", Some(&viewer.token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
