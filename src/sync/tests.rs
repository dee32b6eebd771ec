//! Integration Tests for the Sync Module
//!
//! HTTP interactions mocked with mockito:
//! - Sync trigger happy path and body shape
//! - Session-expiry policy on 401
//! - Error-detail extraction from JSON bodies and bare statuses
//! - Status and preview endpoints

use super::api::{EmailSyncClient, SyncApiError};
use super::models::{SyncRequestBuilder, TokenBundle};
use crate::config::ClientConfig;
use crate::session::SessionStore;
use mockito::{Matcher, Server};
use std::sync::Arc;

fn client_for(server: &Server, session: Arc<SessionStore>) -> EmailSyncClient {
    let config = ClientConfig {
        api_base_url: server.url(),
        ..Default::default()
    };
    EmailSyncClient::new(&config, session)
}

async fn authenticated_session() -> Arc<SessionStore> {
    let session = Arc::new(SessionStore::new());
    session.set_token("test-bearer".to_string()).await;
    session
}

#[tokio::test]
async fn test_sync_with_range_sends_expected_body() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/email/sync-with-range")
        .match_header("authorization", "Bearer test-bearer")
        .match_body(Matcher::Json(serde_json::json!({
            "date_range": "90_days",
            "max_emails": 100
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "status": "completed",
                "emails_processed": 42,
                "transactions_found": 17,
                "duplicates_skipped": 3,
                "message": "Sync complete"
            }"#,
        )
        .expect(1)
        .create_async()
        .await;

    let session = authenticated_session().await;
    let client = client_for(&server, session);

    let request = SyncRequestBuilder::new(100).build(&TokenBundle::new("test-bearer"), Some("90_days"));
    let outcome = client.sync_with_range(&request).await.unwrap();

    assert_eq!(outcome.emails_processed, 42);
    assert_eq!(outcome.transactions_found, 17);
    assert_eq!(outcome.duplicates_skipped, Some(3));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unauthorized_clears_session_once() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/email/sync-with-range")
        .with_status(401)
        .with_body(r#"{"detail": "Token expired"}"#)
        .create_async()
        .await;

    let session = authenticated_session().await;
    let client = client_for(&server, session.clone());

    let request = SyncRequestBuilder::new(100).build(&TokenBundle::new("test-bearer"), None);
    let err = client.sync_with_range(&request).await.unwrap_err();

    assert!(matches!(err, SyncApiError::Unauthorized));
    // Credential store cleared by the expiry policy
    assert!(session.token().await.is_none());

    // A follow-up call finds no token and never reaches the wire
    let err = client.sync_with_range(&request).await.unwrap_err();
    assert!(matches!(err, SyncApiError::Unauthorized));
}

#[tokio::test]
async fn test_rejection_extracts_json_detail() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/email/sync-with-range")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": "Gmail quota exceeded"}"#)
        .create_async()
        .await;

    let session = authenticated_session().await;
    let client = client_for(&server, session.clone());

    let request = SyncRequestBuilder::new(100).build(&TokenBundle::new("test-bearer"), None);
    match client.sync_with_range(&request).await.unwrap_err() {
        SyncApiError::Rejected { detail } => assert_eq!(detail, "Gmail quota exceeded"),
        other => panic!("expected Rejected, got {:?}", other),
    }
    // Non-401 failures leave the session intact
    assert!(session.token().await.is_some());
}

#[tokio::test]
async fn test_rejection_falls_back_to_status_text() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/email/sync-with-range")
        .with_status(503)
        .with_body("upstream unavailable")
        .create_async()
        .await;

    let session = authenticated_session().await;
    let client = client_for(&server, session);

    let request = SyncRequestBuilder::new(100).build(&TokenBundle::new("test-bearer"), None);
    match client.sync_with_range(&request).await.unwrap_err() {
        SyncApiError::Rejected { detail } => {
            assert!(detail.contains("Service Unavailable"), "got: {}", detail)
        }
        other => panic!("expected Rejected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_sync_status_round_trip() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/email/status")
        .match_header("authorization", "Bearer test-bearer")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "last_sync": "2025-06-01T10:00:00Z",
                "total_emails_synced": 120,
                "total_transactions": 55,
                "sync_in_progress": false
            }"#,
        )
        .create_async()
        .await;

    let session = authenticated_session().await;
    let client = client_for(&server, session);

    let status = client.sync_status().await.unwrap();
    assert_eq!(status.total_emails_synced, 120);
    assert!(!status.sync_in_progress);
}

#[tokio::test]
async fn test_preview_transactions() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/email/preview?limit=5")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "total_emails": 2,
                "transactions": [{
                    "email_id": "m-1",
                    "date": "2025-05-30",
                    "amount": 9.99,
                    "trans_type": "debit",
                    "merchant": "StreamFlix",
                    "category": "subscription",
                    "category_confidence": 0.92
                }]
            }"#,
        )
        .create_async()
        .await;

    let session = authenticated_session().await;
    let client = client_for(&server, session);

    let preview = client.preview_transactions(5).await.unwrap();
    assert_eq!(preview.total_emails, 2);
    assert_eq!(preview.transactions[0].merchant, "StreamFlix");
}
