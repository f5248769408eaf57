//! Integration tests for the public portal route.

mod helpers;

use http::StatusCode;

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_valid_token_resolves_gallery() {
    let app = helpers::TestApp::new().await;
    let subject = app.create_subject("Mara Jensen", None).await;
    let (_id, value) = app.issue_token("student", &[subject]).await;

    let response = app.request("GET", &format!("/f/{value}"), None, false).await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["is_valid"], true);
    assert_eq!(data["access_level"], "student");
    assert_eq!(data["event"], "Spring Portraits 2026");
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_expired_token_is_generic_invalid() {
    let app = helpers::TestApp::new().await;
    let subject = app.create_subject("Mara Jensen", None).await;
    let (_id, value) = app.issue_token("student", &[subject]).await;
    app.force_expiry(&value, -1).await;

    let expired = app.request("GET", &format!("/f/{value}"), None, false).await;
    let unknown = app
        .request("GET", "/f/NOSUCHTOKENVALUE12345", None, false)
        .await;

    assert_eq!(expired.status, StatusCode::OK);
    assert_eq!(unknown.status, StatusCode::OK);
    assert_eq!(expired.body["data"]["is_valid"], false);
    // Identical bodies: an attacker probing values learns nothing about
    // token lifecycle.
    assert_eq!(expired.body, unknown.body);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_legacy_gallery_token_still_works() {
    let app = helpers::TestApp::new().await;
    app.create_subject("Mara Jensen", Some("LEGACYTOKEN1234567890"))
        .await;

    let response = app
        .request("GET", "/f/LEGACYTOKEN1234567890", None, false)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["is_valid"], true);
    assert_eq!(response.body["data"]["access_level"], "student");
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_validation_bumps_usage_count() {
    let app = helpers::TestApp::new().await;
    let subject = app.create_subject("Mara Jensen", None).await;
    let (id, value) = app.issue_token("student", &[subject]).await;

    app.request("GET", &format!("/f/{value}"), None, false).await;

    // The usage write is fire-and-forget; give the flusher a moment.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    let count: i64 =
        sqlx::query_scalar("SELECT usage_count FROM access_tokens WHERE id = $1")
            .bind(id)
            .fetch_one(&app.db_pool)
            .await
            .expect("query");
    assert_eq!(count, 1);
}
