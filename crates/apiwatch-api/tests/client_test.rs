#![allow(clippy::unwrap_used)]
// Integration tests for `MonitorClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use apiwatch_api::{EndpointId, Error, LogQuery, MonitorClient, OverviewSummary, Status};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, MonitorClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = MonitorClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn log_rows(count: i64) -> serde_json::Value {
    let rows: Vec<_> = (0..count)
        .map(|i| {
            json!({
                "id": 1000 - i,
                "api_id": 3,
                "timestamp": "2026-02-02 12:00:00",
                "status": "UP",
                "status_code": 200,
                "latency": 0.05,
                "response": "ok"
            })
        })
        .collect();
    json!(rows)
}

// ── Overview & health ───────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_overview() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/stats/overview"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"total": 5, "up": 3, "down": 1})),
        )
        .mount(&server)
        .await;

    let overview = client.fetch_overview().await.unwrap();
    assert_eq!(
        overview,
        OverviewSummary {
            total: 5,
            up: 3,
            down: 1
        }
    );
    assert_eq!(overview.unknown(), 1);
}

#[tokio::test]
async fn test_health() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    assert!(client.health().await.unwrap());
}

#[tokio::test]
async fn test_unreachable_service_is_network_error() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    drop(server);

    let client = MonitorClient::with_client(reqwest::Client::new(), base_url);
    let result = client.fetch_overview().await;

    assert!(
        matches!(result, Err(Error::Network(_))),
        "expected Network error, got: {result:?}"
    );
}

// ── Endpoint listing ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_endpoints_preserves_order_and_tolerates_nulls() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/apis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 7,
                "name": "payments",
                "url": "https://pay.example.com/health",
                "created_at": "2026-02-01 09:00:00",
                "last_status": "DOWN",
                "last_status_code": 503,
                "last_latency": 1.25,
                "last_checked_at": "2026-02-02 12:00:00",
                "last_alert_at": "2026-02-02 12:00:01"
            },
            {
                "id": 2,
                "name": "auth",
                "url": "https://auth.example.com",
                "last_status": null,
                "last_latency": null,
                "last_checked_at": null
            }
        ])))
        .mount(&server)
        .await;

    let endpoints = client.list_endpoints().await.unwrap();
    let ids: Vec<_> = endpoints.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![EndpointId(7), EndpointId(2)]);

    assert_eq!(endpoints[0].last_status, Status::Down);
    assert_eq!(endpoints[0].last_status_code, Some(503));
    assert!(endpoints[0].last_checked_at.is_some());

    assert_eq!(endpoints[1].last_status, Status::Unknown);
    assert_eq!(endpoints[1].last_latency, None);
    assert!(endpoints[1].last_checked_at.is_none());
}

#[tokio::test]
async fn test_get_endpoint_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/apis/99"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "API not found"})))
        .mount(&server)
        .await;

    let err = client.get_endpoint(EndpointId(99)).await.unwrap_err();
    assert!(err.is_not_found(), "expected NotFound, got: {err:?}");
    assert_eq!(err.to_string(), "API not found");
}

#[tokio::test]
async fn test_malformed_body_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/apis"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let result = client.list_endpoints().await;
    match result {
        Err(Error::Deserialization { body, .. }) => assert_eq!(body, "<html>maintenance</html>"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

// ── Create ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_endpoint_trims_and_accepts_ack() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/apis"))
        .and(body_json(json!({"name": "search", "url": "https://search.example.com"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let created = client
        .create_endpoint("  search ", " https://search.example.com  ")
        .await
        .unwrap();
    assert!(created.endpoint().is_none());
}

#[tokio::test]
async fn test_create_endpoint_returns_record() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/apis"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 11,
            "name": "search",
            "url": "https://search.example.com",
            "last_status": null
        })))
        .mount(&server)
        .await;

    let created = client
        .create_endpoint("search", "https://search.example.com")
        .await
        .unwrap();
    let endpoint = created.endpoint().unwrap();
    assert_eq!(endpoint.id, EndpointId(11));
    assert_eq!(endpoint.last_status, Status::Unknown);
}

#[tokio::test]
async fn test_create_endpoint_rejects_empty_input_locally() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/apis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(0)
        .mount(&server)
        .await;

    let err = client.create_endpoint("   ", "https://x.example.com").await.unwrap_err();
    assert!(
        matches!(err, Error::InvalidInput { field: "name", .. }),
        "expected InvalidInput(name), got: {err:?}"
    );

    let err = client.create_endpoint("x", "").await.unwrap_err();
    assert!(
        matches!(err, Error::InvalidInput { field: "url", .. }),
        "expected InvalidInput(url), got: {err:?}"
    );
}

#[tokio::test]
async fn test_create_endpoint_surfaces_server_detail() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/apis"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "API already exists"})),
        )
        .mount(&server)
        .await;

    let err = client
        .create_endpoint("dup", "https://dup.example.com")
        .await
        .unwrap_err();
    assert!(err.is_validation(), "expected Validation, got: {err:?}");
    assert_eq!(err.status(), Some(400));
    assert_eq!(err.to_string(), "API already exists");
}

#[tokio::test]
async fn test_create_endpoint_structured_detail() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/apis"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{"loc": ["body", "url"], "msg": "Invalid URL", "type": "value_error"}]
        })))
        .mount(&server)
        .await;

    let err = client.create_endpoint("x", "nope").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid URL");
}

#[tokio::test]
async fn test_server_error_without_detail() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/apis"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = client
        .create_endpoint("x", "https://x.example.com")
        .await
        .unwrap_err();
    assert!(
        matches!(err, Error::Server { status: 500, .. }),
        "expected Server error, got: {err:?}"
    );
    assert!(err.is_transient());
}

// ── Delete ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_endpoint() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/apis/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let confirmation = client.delete_endpoint(EndpointId(4)).await.unwrap();
    assert!(confirmation.ok);
}

#[tokio::test]
async fn test_delete_endpoint_empty_body() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/apis/4"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let confirmation = client.delete_endpoint(EndpointId(4)).await.unwrap();
    assert!(!confirmation.ok);
}

#[tokio::test]
async fn test_delete_missing_endpoint() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/apis/404"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "API not found"})))
        .mount(&server)
        .await;

    let err = client.delete_endpoint(EndpointId(404)).await.unwrap_err();
    assert!(err.is_not_found());
}

// ── Logs ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_logs_sends_limit_and_bounds() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/apis/3/logs"))
        .and(query_param("limit", "50"))
        .and(query_param("since", "2026-02-02 08:00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(log_rows(2)))
        .expect(1)
        .mount(&server)
        .await;

    let since = chrono::DateTime::parse_from_rfc3339("2026-02-02T08:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);
    let query = LogQuery {
        limit: 50,
        since: Some(since),
        until: None,
    };
    let logs = client.fetch_logs(EndpointId(3), &query).await.unwrap();

    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].status, Status::Up);
    assert_eq!(logs[0].status_code, Some(200));
    assert_eq!(logs[0].response.as_deref(), Some("ok"));
}

#[tokio::test]
async fn test_fetch_logs_never_exceeds_limit() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/apis/3/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(log_rows(30)))
        .mount(&server)
        .await;

    let logs = client
        .fetch_logs(EndpointId(3), &LogQuery::with_limit(10))
        .await
        .unwrap();
    assert_eq!(logs.len(), 10);
    assert_eq!(logs[0].id, 1000);
}

#[tokio::test]
async fn test_fetch_logs_clamps_limit() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/apis/3/logs"))
        .and(query_param("limit", "2000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let logs = client
        .fetch_logs(EndpointId(3), &LogQuery::with_limit(9999))
        .await
        .unwrap();
    assert!(logs.is_empty());
}

// ── Upload ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_bulk_import() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/apis/upload"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"apis.txt\""))
        .and(body_string_contains("https://a.example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"added": 2, "skipped": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let summary = client
        .bulk_import("apis.txt", b"a,https://a.example.com\n".to_vec())
        .await
        .unwrap();
    assert_eq!((summary.added, summary.skipped), (2, 1));
}

#[tokio::test]
async fn test_bulk_import_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/apis/upload"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "File must be UTF-8 text"})),
        )
        .mount(&server)
        .await;

    let err = client
        .bulk_import("blob.bin", vec![0xff, 0xfe])
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.to_string(), "File must be UTF-8 text");
}
