mod common;

use common::{TEST_SECRET, TestApp};
use member_portal::session::LoginManager;
use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@example.com", Uuid::new_v4())
}

#[tokio::test]
async fn signup_login_profile_logout_flow() {
    let Some(app) = TestApp::spawn_with_database().await else {
        return;
    };
    let email = unique_email("flow");

    let signup = app
        .client
        .post(app.url("/signup"))
        .json(&json!({
            "email": email,
            "password": "correct-horse",
            "name": "Flow Tester"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(signup.status(), StatusCode::CREATED);
    let signup_body = signup.json::<serde_json::Value>().await.unwrap();
    assert_eq!(signup_body["email"], email.as_str());
    assert!(signup_body["id"].as_i64().is_some());

    let login = app
        .client
        .post(app.url("/login"))
        .json(&json!({
            "email": email,
            "password": "correct-horse"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(login.status(), StatusCode::OK);
    let cookie = login
        .headers()
        .get("set-cookie")
        .and_then(|value| value.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));
    let login_body = login.json::<serde_json::Value>().await.unwrap();
    assert_eq!(login_body["token_type"], "bearer");
    let token = login_body["access_token"].as_str().unwrap().to_string();
    let auth_header = format!("Bearer {token}");

    let profile = app
        .client
        .get(app.url("/profile"))
        .header("Authorization", &auth_header)
        .send()
        .await
        .unwrap();
    assert_eq!(profile.status(), StatusCode::OK);
    let profile_body = profile.json::<serde_json::Value>().await.unwrap();
    assert_eq!(profile_body["email"], email.as_str());
    assert_eq!(profile_body["name"], "Flow Tester");
    assert_eq!(profile_body["id"], signup_body["id"]);

    let cookie_pair = cookie.split(';').next().unwrap().to_string();
    let via_cookie = app
        .client
        .get(app.url("/profile"))
        .header("Cookie", &cookie_pair)
        .send()
        .await
        .unwrap();
    assert_eq!(via_cookie.status(), StatusCode::OK);

    let logout = app
        .client
        .post(app.url("/logout"))
        .header("Authorization", &auth_header)
        .send()
        .await
        .unwrap();
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);
    let cleared = logout
        .headers()
        .get("set-cookie")
        .and_then(|value| value.to_str().ok())
        .unwrap();
    assert!(cleared.starts_with("session=;"));
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn duplicate_signup_returns_conflict() {
    let Some(app) = TestApp::spawn_with_database().await else {
        return;
    };
    let payload = json!({
        "email": unique_email("dupe"),
        "password": "secret123",
        "name": "First"
    });

    let first = app
        .client
        .post(app.url("/signup"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .client
        .post(app.url("/signup"))
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
    let body = second.json::<serde_json::Value>().await.unwrap();
    assert_eq!(body["detail"], "User already exists");
}

#[tokio::test]
async fn login_rejects_invalid_credentials() {
    let Some(app) = TestApp::spawn_with_database().await else {
        return;
    };
    let email = unique_email("creds");

    let signup = app
        .client
        .post(app.url("/signup"))
        .json(&json!({
            "email": email,
            "password": "correct-horse"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(signup.status(), StatusCode::CREATED);

    let wrong_password = app
        .client
        .post(app.url("/login"))
        .json(&json!({
            "email": email,
            "password": "tr0ub4dor"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    let body = wrong_password.json::<serde_json::Value>().await.unwrap();
    assert_eq!(body["detail"], "Invalid credentials");

    let unknown_user = app
        .client
        .post(app.url("/login"))
        .json(&json!({
            "email": unique_email("ghost"),
            "password": "whatever"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    let body = unknown_user.json::<serde_json::Value>().await.unwrap();
    assert_eq!(body["detail"], "Invalid credentials");
}

#[tokio::test]
async fn signup_rejects_missing_fields() {
    let app = TestApp::spawn().await;

    let no_email = app
        .client
        .post(app.url("/signup"))
        .json(&json!({
            "email": "",
            "password": "secret123"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(no_email.status(), StatusCode::BAD_REQUEST);

    let no_password = app
        .client
        .post(app.url("/signup"))
        .json(&json!({
            "email": "someone@example.com",
            "password": ""
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(no_password.status(), StatusCode::BAD_REQUEST);
    let body = no_password.json::<serde_json::Value>().await.unwrap();
    assert_eq!(body["detail"], "Email and password are required");
}

#[tokio::test]
async fn session_for_a_missing_user_is_rejected() {
    let Some(app) = TestApp::spawn_with_database().await else {
        return;
    };

    // Signed with the app secret, but no row can ever carry this id.
    let manager = LoginManager::new(TEST_SECRET, 60, "/login");
    let token = manager.issue_session(i64::MAX).unwrap();

    let response = app
        .client
        .get(app.url("/profile"))
        .header("Authorization", format!("Bearer {token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = response.json::<serde_json::Value>().await.unwrap();
    assert_eq!(body["detail"], "Login required");
    assert_eq!(body["login_url"], "/login");
}
