mod common;

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::*;
use pleme_clusterscope::config::EngineConfig;
use pleme_clusterscope::domain::grid_service::GridService;
use pleme_clusterscope::query::{BatchQueryRequest, HttpQueryEngine, QueryEngine, QueryStatement};
use pleme_clusterscope::{GridError, HealthStatus, QueryError};

fn engine_config(url: &str) -> EngineConfig {
    EngineConfig {
        url: format!("{url}/"),
        timeout_secs: 5,
        lookback_hours: 1,
        api_token: Some("s3cret".to_string()),
    }
}

fn request() -> BatchQueryRequest {
    BatchQueryRequest {
        session_id: "abc123".to_string(),
        timeout_secs: 5,
        requests: vec![QueryStatement {
            id: "0".to_string(),
            workspace_id: "logs-guid".to_string(),
            workspace_resource_id: workspace("logs").resource_id,
            query: "ContainerHealth | take 1".to_string(),
        }],
    }
}

#[tokio::test]
async fn posts_batch_with_session_and_token() {
    let server = MockServer::start().await;
    let reply = batch(vec![table_response("0", vec![healthy_row("c1")])]);
    Mock::given(method("POST"))
        .and(path("/v1/batch"))
        .and(header("x-ms-client-session-id", "abc123"))
        .and(header("authorization", "Bearer s3cret"))
        .and(body_partial_json(json!({ "session_id": "abc123" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&reply))
        .expect(1)
        .mount(&server)
        .await;

    let engine = HttpQueryEngine::new(&engine_config(&server.uri())).unwrap();
    let got = engine.batch(&request()).await.unwrap();
    assert_eq!(got, reply);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/batch"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let engine = HttpQueryEngine::new(&engine_config(&server.uri())).unwrap();
    let err = engine.batch(&request()).await.unwrap_err();
    assert!(matches!(err, QueryError::Status(s) if s.as_u16() == 503));
}

#[tokio::test]
async fn grid_refresh_over_http() {
    let server = MockServer::start().await;
    let reply = json!({
        "responses": [
            {
                "id": "0",
                "status": 200,
                "body": {
                    "tables": [{
                        "columns": [
                            { "name": "ClusterId", "type": "string" },
                            { "name": "NodeStatus", "type": "string" },
                            { "name": "UserPodStatus", "type": "string" },
                            { "name": "SystemPodStatus", "type": "string" },
                            { "name": "ClusterVersion", "type": "string" }
                        ],
                        "rows": [[
                            resource_id("alpha"),
                            "[{\"status\":\"Green\",\"count\":4}]",
                            "[{\"status\":\"Green\",\"count\":19},{\"status\":\"Red\",\"count\":1}]",
                            "[{\"status\":\"Green\",\"count\":8}]",
                            "1.30.1"
                        ]]
                    }]
                }
            },
            { "id": "1", "status": 403, "body": { "error": { "code": "Forbidden" } } }
        ]
    });
    Mock::given(method("POST"))
        .and(path("/v1/batch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply))
        .mount(&server)
        .await;

    let config = engine_config(&server.uri());
    let engine = Arc::new(HttpQueryEngine::new(&config).unwrap());
    let mut alpha = monitored("alpha", "logs-a");
    alpha.kubernetes_version = None;
    let svc = GridService::new(engine, config, vec![alpha, monitored("bravo", "logs-b")]).unwrap();
    svc.refresh().await.unwrap();

    let alpha = svc.cluster("alpha").await.unwrap();
    assert_eq!(alpha.status_code, HealthStatus::Warning.value());
    assert_eq!(alpha.user_pods, "19/20");
    assert_eq!(alpha.version, "1.30.1");

    let bravo = svc.cluster("bravo").await.unwrap();
    assert_eq!(bravo.status_code, HealthStatus::UnAuthorized.value());
}

#[tokio::test]
async fn unreachable_engine_fails_refresh() {
    let server = MockServer::start().await;
    let config = engine_config(&server.uri());
    drop(server);

    let engine = Arc::new(HttpQueryEngine::new(&config).unwrap());
    let svc = GridService::new(engine, config, vec![monitored("alpha", "logs")]).unwrap();
    let err = svc.refresh().await.unwrap_err();
    assert!(matches!(err, GridError::Query(QueryError::Request(_))));
}
