mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use chrono::Duration;
use cohort_tools_api::auth::{Claims, TokenIssuer};
use cohort_tools_api::config::AppConfig;
use cohort_tools_api::database::models::PublicUser;
use serde_json::json;

use common::{TestApp, TEST_SECRET};

#[tokio::test]
async fn auth_index_responds() -> Result<()> {
    let app = TestApp::new();

    let res = app.get("/auth").await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!("All good in auth"));
    Ok(())
}

#[tokio::test]
async fn signup_returns_public_user() -> Result<()> {
    let app = TestApp::new();

    let res = app
        .post(
            "/auth/signup",
            json!({ "email": "ada@example.com", "password": "p4ssw0rd", "name": "Ada" }),
        )
        .await?;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["email"], "ada@example.com");
    assert_eq!(res.body["name"], "Ada");
    assert!(res.body["_id"].is_string());
    assert!(res.body.get("password").is_none());
    assert!(res.body.get("passwordHash").is_none());
    assert_eq!(res.body.as_object().map(|o| o.len()), Some(3));
    Ok(())
}

#[tokio::test]
async fn signup_rejects_missing_fields() -> Result<()> {
    let app = TestApp::new();

    let payloads = [
        json!({ "password": "p4ssw0rd", "name": "Ada" }),
        json!({ "email": "ada@example.com", "name": "Ada" }),
        json!({ "email": "ada@example.com", "password": "p4ssw0rd", "name": "" }),
        json!({}),
    ];

    for payload in payloads {
        let res = app.post("/auth/signup", payload).await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.body, json!({ "message": "Provide email, password and name" }));
    }
    assert_eq!(app.store.user_count().await, 0);
    Ok(())
}

#[tokio::test]
async fn signup_rejects_malformed_email() -> Result<()> {
    let app = TestApp::new();

    for email in ["ada", "ada@example", "ada@example.c", "ada smith@example.com"] {
        let res = app
            .post(
                "/auth/signup",
                json!({ "email": email, "password": "p4ssw0rd", "name": "Ada" }),
            )
            .await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST, "accepted {}", email);
        assert_eq!(res.body, json!({ "message": "Provide a valid email address" }));
    }
    Ok(())
}

#[tokio::test]
async fn signup_rejects_duplicate_email() -> Result<()> {
    let app = TestApp::new();
    let payload = json!({ "email": "ada@example.com", "password": "p4ssw0rd", "name": "Ada" });

    assert_eq!(app.post("/auth/signup", payload.clone()).await?.status, StatusCode::CREATED);

    let res = app.post("/auth/signup", payload).await?;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.body, json!({ "message": "User already exists" }));
    assert_eq!(app.store.user_count().await, 1);
    Ok(())
}

#[tokio::test]
async fn concurrent_signups_create_one_user() -> Result<()> {
    let app = TestApp::new();
    let payload = json!({ "email": "race@example.com", "password": "p4ssw0rd", "name": "Race" });

    let attempts = (0..8).map(|_| app.post("/auth/signup", payload.clone()));
    let results = futures::future::join_all(attempts).await;

    let created = results
        .iter()
        .filter(|r| matches!(r, Ok(res) if res.status == StatusCode::CREATED))
        .count();
    assert_eq!(created, 1);
    assert_eq!(app.store.user_count().await, 1);
    Ok(())
}

#[tokio::test]
async fn login_token_verifies_with_same_identity() -> Result<()> {
    let app = TestApp::new();

    let signup = app
        .post(
            "/auth/signup",
            json!({ "email": "ada@example.com", "password": "p4ssw0rd", "name": "Ada" }),
        )
        .await?;
    let token = app.login_as_existing("ada@example.com", "p4ssw0rd").await?;

    let res = app.send(Method::GET, "/auth/verify", None, Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["_id"], signup.body["_id"]);
    assert_eq!(res.body["email"], "ada@example.com");
    assert_eq!(res.body["name"], "Ada");

    let iat = res.body["iat"].as_i64().unwrap_or_default();
    let exp = res.body["exp"].as_i64().unwrap_or_default();
    assert_eq!(exp - iat, 6 * 60 * 60);
    Ok(())
}

#[tokio::test]
async fn login_rejects_bad_credentials() -> Result<()> {
    let app = TestApp::new();
    app.login_as("ada@example.com", "p4ssw0rd", "Ada").await?;

    let wrong = app
        .post("/auth/login", json!({ "email": "ada@example.com", "password": "nope" }))
        .await?;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong.body, json!({ "message": "Unable to authenticate the user" }));
    assert!(wrong.body.get("authToken").is_none());

    let unknown = app
        .post("/auth/login", json!({ "email": "bob@example.com", "password": "p4ssw0rd" }))
        .await?;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.body, json!({ "message": "User not found" }));

    let missing = app.post("/auth/login", json!({ "email": "ada@example.com" })).await?;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body, json!({ "message": "Provide email and password" }));
    Ok(())
}

#[tokio::test]
async fn verify_rejects_missing_and_malformed_tokens() -> Result<()> {
    let app = TestApp::new();

    let missing = app.get("/auth/verify").await?;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let garbage = app
        .send(Method::GET, "/auth/verify", None, Some("not.a.token"))
        .await?;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
    assert!(garbage.body["message"].is_string());
    Ok(())
}

#[tokio::test]
async fn verify_rejects_expired_and_foreign_tokens() -> Result<()> {
    let app = TestApp::new();
    let user = PublicUser {
        id: uuid::Uuid::new_v4(),
        email: "ada@example.com".to_string(),
        name: "Ada".to_string(),
    };

    let expired = app.state.tokens.issue_for(&user, Duration::seconds(-60))?;
    let res = app.send(Method::GET, "/auth/verify", None, Some(&expired)).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body, json!({ "message": "Token expired" }));

    let foreign = TokenIssuer::new(&AppConfig::for_testing("someone-else").security)?;
    let token = foreign.sign(&Claims::new(&user, Duration::hours(1)))?;
    let res = app.send(Method::GET, "/auth/verify", None, Some(&token)).await?;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let own = TokenIssuer::new(&AppConfig::for_testing(TEST_SECRET).security)?;
    let token = own.issue(&user)?;
    let res = app.send(Method::GET, "/auth/verify", None, Some(&token)).await?;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}
