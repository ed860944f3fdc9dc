//! LangSmith recorder tests against a mock run API

use multi_agent_router::agents::Category;
use multi_agent_router::trace::{
    LangSmithConfig, LangSmithRecorder, SpanKind, TraceRecorder, Tracer, TracingStyle,
};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{header, method, path, path_regex};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

use test_helpers::{scripted_provider, split_orchestrator};

async fn mount_run_api(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/runs"))
        .and(header("x-api-key", "ls-test-key"))
        .respond_with(ResponseTemplate::new(202))
        .mount(server)
        .await;
    Mock::given(method("PATCH"))
        .and(path_regex(r"^/runs/[0-9a-f-]+$"))
        .and(header("x-api-key", "ls-test-key"))
        .respond_with(ResponseTemplate::new(202))
        .mount(server)
        .await;
}

fn recorder(server: &MockServer) -> LangSmithRecorder {
    LangSmithRecorder::new(LangSmithConfig {
        api_key: "ls-test-key".to_string(),
        endpoint: server.uri(),
        project: "router-tests".to_string(),
        ..Default::default()
    })
    .unwrap()
}

fn bodies(requests: &[Request], verb: &str) -> Vec<Value> {
    requests
        .iter()
        .filter(|r| r.method.as_str() == verb)
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_span_lifecycle_creates_and_completes_run() {
    let server = MockServer::start().await;
    mount_run_api(&server).await;
    let tracer = Tracer::new(Arc::new(recorder(&server)));

    let span = tracer
        .begin_span("route_query", SpanKind::Chain, json!({"query": "q"}), None)
        .await;
    let span_id = span.id();
    span.end_with(json!({"route": "tech"})).await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);

    let created = &bodies(&requests, "POST")[0];
    assert_eq!(created["id"], json!(span_id));
    assert_eq!(created["trace_id"], json!(span_id));
    assert!(created["parent_run_id"].is_null());
    assert_eq!(created["name"], "route_query");
    assert_eq!(created["run_type"], "chain");
    assert_eq!(created["inputs"], json!({"query": "q"}));
    assert_eq!(created["session_name"], "router-tests");

    let patch = &requests[1];
    assert_eq!(patch.url.path(), format!("/runs/{span_id}"));
    let updated = &bodies(&requests, "PATCH")[0];
    assert_eq!(updated["outputs"], json!({"route": "tech"}));
    assert!(updated["end_time"].is_string());
    assert!(updated.get("error").is_none());
}

#[tokio::test]
async fn test_orchestration_creates_linked_runs() {
    let server = MockServer::start().await;
    mount_run_api(&server).await;

    let provider = scripted_provider("HR", "Fifteen days.");
    let orchestrator = split_orchestrator(
        provider.clone(),
        provider.clone(),
        provider,
        Tracer::new(Arc::new(recorder(&server))),
    )
    .with_style(TracingStyle::Decorator);

    let result = orchestrator.orchestrate("vacation?").await.unwrap();
    assert_eq!(result.route, Category::Hr);

    let requests = server.received_requests().await.unwrap();
    let created = bodies(&requests, "POST");
    let updated = bodies(&requests, "PATCH");
    assert_eq!(created.len(), 3);
    assert_eq!(updated.len(), 3);

    let root = created.iter().find(|b| b["name"] == "orchestrator").unwrap();
    let root_order = root["dotted_order"].as_str().unwrap();
    for name in ["route_query", "hr_agent"] {
        let child = created.iter().find(|b| b["name"] == name).unwrap();
        assert_eq!(child["parent_run_id"], root["id"]);
        assert_eq!(child["trace_id"], root["id"]);
        assert!(child["dotted_order"]
            .as_str()
            .unwrap()
            .starts_with(&format!("{root_order}.")));
    }

    let agent = created.iter().find(|b| b["name"] == "hr_agent").unwrap();
    assert_eq!(agent["run_type"], "llm");

    let root_update = updated.last().unwrap();
    assert_eq!(
        root_update["outputs"],
        json!({"route": "hr", "answer": "Fifteen days."})
    );
}

#[tokio::test]
async fn test_failed_span_reports_error() {
    let server = MockServer::start().await;
    mount_run_api(&server).await;
    let tracer = Tracer::new(Arc::new(recorder(&server)));

    let span = tracer
        .begin_span("tech_agent", SpanKind::Llm, json!({"query": "q"}), None)
        .await;
    span.fail("Network error: connection reset").await;

    let requests = server.received_requests().await.unwrap();
    let updated = &bodies(&requests, "PATCH")[0];
    assert_eq!(updated["error"], "Network error: connection reset");
    assert_eq!(updated["outputs"], json!({}));
}

#[tokio::test]
async fn test_rejected_request_surfaces_as_trace_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/runs"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .mount(&server)
        .await;

    let recorder = recorder(&server);
    let span = multi_agent_router::trace::SpanRecord::start(
        "orchestrator",
        SpanKind::Chain,
        json!({}),
        None,
    );

    let error = recorder.start_span(&span).await.unwrap_err();
    assert_eq!(
        error.to_string(),
        "Trace backend rejected request: 401 - invalid key"
    );
}
