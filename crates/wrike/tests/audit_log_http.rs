//! Agregação do audit log contra um servidor HTTP simulado

use httpmock::prelude::*;
use serde_json::json;

use wrike::audit_log::{AggregateOptions, AuditLogAggregator, StopReason};
use wrike::types::AuditLogQuery;
use wrike::{FetchError, WrikeClient, WrikeConfig};

fn client_for(server: &MockServer) -> WrikeClient {
    let config = WrikeConfig::new("test-token").with_base_url(server.base_url());
    WrikeClient::from_config(&config).unwrap()
}

fn entry(id: &str, operation: &str) -> serde_json::Value {
    json!({
        "id": id,
        "operation": operation,
        "userId": "KUAAAAAA",
        "userEmail": "ops@example.com",
        "eventDate": "2024-03-01T07:51:44Z",
        "ipAddress": "10.0.0.1",
        "objectType": "Task",
        "objectName": "Relatório",
        "objectId": "IEAAAAAA",
        "details": {"Title": "Relatório mensal", "Status": "Active"}
    })
}

fn login_query() -> AuditLogQuery {
    AuditLogQuery {
        operations: vec!["TaskCreated".to_string()],
        ..AuditLogQuery::default()
    }
}

#[tokio::test]
async fn test_follows_next_page_token_until_exhausted() {
    let server = MockServer::start_async().await;

    let first = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/audit_log")
                .header("Authorization", "bearer test-token")
                .query_param("pageSize", "100")
                .query_param("operations", "[\"TaskCreated\"]");
            then.status(200).json_body(json!({
                "kind": "auditLog",
                "nextPageToken": "t1",
                "data": [entry("E1", "TaskCreated"), entry("E2", "TaskCreated")]
            }));
        })
        .await;

    let second = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/audit_log")
                .query_param("pageSize", "100")
                .query_param("nextPageToken", "t1");
            then.status(200).json_body(json!({
                "kind": "auditLog",
                "data": [entry("E3", "TaskCreated")]
            }));
        })
        .await;

    let aggregator = AuditLogAggregator::new(client_for(&server));
    let options = AggregateOptions {
        query: login_query(),
        ..AggregateOptions::default()
    };
    let result = aggregator.aggregate(&options).await;

    first.assert_async().await;
    second.assert_async().await;

    assert_eq!(result.stop, StopReason::Exhausted);
    assert_eq!(result.pages, 2);
    let ids: Vec<&str> = result.entries.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, vec!["E1", "E2", "E3"]);
    assert!(result.exploded.is_none());
}

#[tokio::test]
async fn test_reframe_explodes_details() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/audit_log");
            then.status(200).json_body(json!({
                "kind": "auditLog",
                "nextPageToken": "",
                "data": [entry("E1", "TaskCreated")]
            }));
        })
        .await;

    let aggregator = AuditLogAggregator::new(client_for(&server));
    let options = AggregateOptions {
        reframe: true,
        ..AggregateOptions::default()
    };
    let result = aggregator.aggregate(&options).await;

    assert!(result.is_complete());
    let rows = result.exploded.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["event"], json!("Title"));
    assert_eq!(rows[0]["description"], json!("Relatório mensal"));
    assert_eq!(rows[1]["event"], json!("Status"));
    assert!(rows.iter().all(|row| !row.contains_key("details")));
}

#[tokio::test]
async fn test_unauthorized_is_reported_not_raised() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/audit_log");
            then.status(401).json_body(json!({
                "errorDescription": "Access token is invalid",
                "error": "not_authorized"
            }));
        })
        .await;

    let aggregator = AuditLogAggregator::new(client_for(&server));
    let result = aggregator.aggregate(&AggregateOptions::default()).await;

    assert_eq!(result.pages, 0);
    assert!(result.entries.is_empty());
    match result.error() {
        Some(FetchError::Unauthorized { status, .. }) => assert_eq!(*status, 401),
        other => panic!("esperado Unauthorized, obtido {:?}", other),
    }
}

#[tokio::test]
async fn test_failure_on_second_page_keeps_first_page() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/audit_log")
                .query_param("operations", "[\"TaskCreated\"]");
            then.status(200).json_body(json!({
                "nextPageToken": "t1",
                "data": [entry("E1", "TaskCreated")]
            }));
        })
        .await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/audit_log").query_param("nextPageToken", "t1");
            then.status(400).json_body(json!({"errorDescription": "Invalid token"}));
        })
        .await;

    let aggregator = AuditLogAggregator::new(client_for(&server));
    let options = AggregateOptions {
        query: login_query(),
        ..AggregateOptions::default()
    };
    let result = aggregator.aggregate(&options).await;

    assert_eq!(result.entries.len(), 1);
    assert_eq!(result.pages, 1);
    assert!(matches!(result.error(), Some(FetchError::BadRequest { .. })));
}

#[tokio::test]
async fn test_iteration_cap_stops_with_token_pending() {
    let server = MockServer::start_async().await;

    let page = server
        .mock_async(|when, then| {
            when.method(GET).path("/audit_log");
            then.status(200).json_body(json!({
                "nextPageToken": "always-more",
                "data": [entry("E1", "TaskCreated")]
            }));
        })
        .await;

    let aggregator = AuditLogAggregator::new(client_for(&server));
    let options = AggregateOptions {
        max_iterations: Some(2),
        ..AggregateOptions::default()
    };
    let result = aggregator.aggregate(&options).await;

    assert_eq!(page.hits_async().await, 2);
    assert_eq!(result.stop, StopReason::IterationCap);
    assert!(result.stopped_early());
    assert_eq!(result.entries.len(), 2);
}
