//! Integration tests for token administration.

mod helpers;

use http::StatusCode;

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_issue_requires_admin_key() {
    let app = helpers::TestApp::new().await;
    let subject = app.create_subject("Mara Jensen", None).await;

    let response = app
        .request(
            "POST",
            "/api/tokens",
            Some(serde_json::json!({
                "kind": "student",
                "subject_ids": [subject],
            })),
            false,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_issue_returns_value_and_portal_url() {
    let app = helpers::TestApp::new().await;
    let subject = app.create_subject("Mara Jensen", None).await;
    let (_id, value) = app.issue_token("student", &[subject]).await;

    assert!(value.len() >= 20);
    assert!(value.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_rotation_swaps_old_for_new() {
    let app = helpers::TestApp::new().await;
    let subject = app.create_subject("Mara Jensen", None).await;
    let (id, old_value) = app.issue_token("family", &[subject]).await;

    let response = app
        .request("POST", &format!("/api/tokens/{id}/rotate"), None, true)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let new_value = response.body["data"]["value"].as_str().expect("value");

    let old_access = app
        .request("GET", &format!("/f/{old_value}"), None, false)
        .await;
    let new_access = app
        .request("GET", &format!("/f/{new_value}"), None, false)
        .await;

    assert_eq!(old_access.body["data"]["is_valid"], false);
    assert_eq!(new_access.body["data"]["is_valid"], true);
    assert_eq!(new_access.body["data"]["access_level"], "family");
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_revoked_token_stops_validating() {
    let app = helpers::TestApp::new().await;
    let subject = app.create_subject("Mara Jensen", None).await;
    let (id, value) = app.issue_token("student", &[subject]).await;

    let response = app
        .request("DELETE", &format!("/api/tokens/{id}"), None, true)
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let access = app.request("GET", &format!("/f/{value}"), None, false).await;
    assert_eq!(access.body["data"]["is_valid"], false);

    // Soft deactivation: the row survives for audit.
    let active: bool = sqlx::query_scalar("SELECT is_active FROM access_tokens WHERE id = $1")
        .bind(id)
        .fetch_one(&app.db_pool)
        .await
        .expect("query");
    assert!(!active);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_bulk_issue_reports_per_item() {
    let app = helpers::TestApp::new().await;
    let s1 = app.create_subject("Mara Jensen", None).await;
    let s2 = app.create_subject("Tom Jensen", None).await;

    let response = app
        .request(
            "POST",
            "/api/tokens/bulk",
            Some(serde_json::json!({
                "items": [
                    { "label": "S-1", "kind": "student", "subject_ids": [s1] },
                    { "label": "S-2", "kind": "student", "subject_ids": [s2] },
                    { "label": "S-3", "kind": "student", "subject_ids": [] },
                ],
            })),
            true,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["successful"].as_array().expect("successful").len(), 2);
    assert_eq!(data["failed"].as_array().expect("failed").len(), 0);
    assert_eq!(data["skipped"], serde_json::json!(["S-3"]));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_listing_masks_token_values() {
    let app = helpers::TestApp::new().await;
    let subject = app.create_subject("Mara Jensen", None).await;
    let (_id, value) = app.issue_token("student", &[subject]).await;

    let response = app.request("GET", "/api/tokens", None, true).await;
    assert_eq!(response.status, StatusCode::OK);

    let items = response.body["data"]["items"].as_array().expect("items");
    assert_eq!(items.len(), 1);
    let masked = items[0]["value_masked"].as_str().expect("masked");
    assert!(masked.starts_with("tok_"));
    assert!(masked.contains("***"));
    assert!(!response.body.to_string().contains(&value));
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_rotate_expiring_sweep_is_idempotent() {
    let app = helpers::TestApp::new().await;
    let subject = app.create_subject("Mara Jensen", None).await;
    let (_id, value) = app.issue_token("student", &[subject]).await;
    app.force_expiry(&value, 3).await;

    let first = app
        .request("POST", "/api/tokens/rotate-expiring", None, true)
        .await;
    let second = app
        .request("POST", "/api/tokens/rotate-expiring", None, true)
        .await;

    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(
        first.body["data"]["rotated"].as_array().expect("rotated").len(),
        1
    );
    assert_eq!(
        second.body["data"]["rotated"]
            .as_array()
            .expect("rotated")
            .len(),
        0
    );
}
