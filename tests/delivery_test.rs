//! Integration tests for token delivery.

mod helpers;

use http::StatusCode;

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_dry_run_delivery_reports_and_records() {
    let app = helpers::TestApp::new().await;
    let subject = app.create_subject("Mara Jensen", None).await;
    let (id, _value) = app.issue_token("family", &[subject]).await;

    let response = app
        .request(
            "POST",
            &format!("/api/tokens/{id}/deliver"),
            Some(serde_json::json!({
                "recipients": [
                    { "channel": "email", "recipient": "jensen@example.com" },
                    { "channel": "sms", "recipient": "+4512345678" },
                    { "channel": "print", "recipient": "order-card" },
                ],
            })),
            true,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["successful"].as_array().expect("successful").len(), 2);
    assert_eq!(data["failed"].as_array().expect("failed").len(), 0);
    assert_eq!(data["skipped"], serde_json::json!(["order-card"]));

    let history = app
        .request("GET", &format!("/api/tokens/{id}/deliveries"), None, true)
        .await;
    assert_eq!(history.status, StatusCode::OK);
    let records = history.body["data"].as_array().expect("records");
    assert_eq!(records.len(), 3);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_invalid_channel_is_rejected() {
    let app = helpers::TestApp::new().await;
    let subject = app.create_subject("Mara Jensen", None).await;
    let (id, _value) = app.issue_token("student", &[subject]).await;

    let response = app
        .request(
            "POST",
            &format!("/api/tokens/{id}/deliver"),
            Some(serde_json::json!({
                "recipients": [
                    { "channel": "carrier-pigeon", "recipient": "roof" },
                ],
            })),
            true,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "requires a PostgreSQL instance"]
async fn test_delivery_for_unknown_token_is_not_found() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            &format!("/api/tokens/{}/deliver", uuid::Uuid::new_v4()),
            Some(serde_json::json!({
                "recipients": [
                    { "channel": "email", "recipient": "jensen@example.com" },
                ],
            })),
            true,
        )
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
