mod helpers;

use axum::http::StatusCode;
use serde_json::{json, Value};

use helpers::TestHost;
use lineage_rs::driver::GraphDriver;
use lineage_rs::edges::EdgeLabel;
use lineage_rs::nodes::NodeType;

fn generate_event() -> Value {
    json!({
        "entity_name": "sample-process",
        "entity_type": "process",
        "operation": "generate",
        "cluster_name": "primary-cluster",
        "workflow_user": "falcon-user",
        "nominal_time": "2014-01-01T01:00Z",
        "timestamp": "2014-01-01T01:05:30Z",
        "counters": "TIMETAKEN:36956,COPY:30",
        "input_feed_names": "clicks",
        "input_feed_paths": "/falcon/clicks/2014-01-01-00,/falcon/clicks/2014-01-01-01",
        "output_feed_names": "imp-click-join",
        "output_feed_paths": "/falcon/imp-click-join/2014-01-01-01",
        "workflow": { "workflowId": "0000-oozie-wf", "runId": "1", "status": "SUCCEEDED" }
    })
}

fn replicate_event() -> Value {
    json!({
        "entity_name": "clicks",
        "entity_type": "feed",
        "operation": "replicate",
        "cluster_name": "backup-cluster",
        "src_cluster_name": "primary-cluster",
        "workflow_user": "falcon-user",
        "nominal_time": "2014-01-01T01:00Z",
        "timestamp": "2014-01-01T02:00:00Z",
        "output_feed_names": "clicks",
        "output_feed_paths": "/falcon/clicks/2014-01-01-01"
    })
}

// ---------------------------------------------------------------------------
// POST /events
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_generate_event_is_recorded() {
    let host = TestHost::new(false).await;
    let (status, body) = host.post_event(&generate_event()).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["operation"], "generate");
    assert!(body["process_instance"].is_string());
    assert_eq!(body["feed_instances"].as_array().map(Vec::len), Some(3));
    assert_eq!(body["summary"]["nodes_created"], 4);

    assert_eq!(host.store.nodes_of_type(NodeType::ProcessInstance).len(), 1);
    assert_eq!(host.store.edges_with_label(EdgeLabel::ProcessInput).len(), 2);
}

#[tokio::test]
async fn test_unknown_cluster_is_conflict_and_writes_nothing() {
    let host = TestHost::new(false).await;
    let nodes = host.store.node_count();

    let mut event = generate_event();
    event["cluster_name"] = json!("no-such-cluster");
    let (status, body) = host.post_event(&event).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap_or_default().contains("no-such-cluster"));
    assert_eq!(host.store.node_count(), nodes);
}

#[tokio::test]
async fn test_malformed_counters_are_unprocessable() {
    let host = TestHost::new(false).await;
    let mut event = generate_event();
    event["counters"] = json!("TIMETAKEN:fast");

    let (status, _) = host.post_event(&event).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(host.store.nodes_of_type(NodeType::ProcessInstance).is_empty());
}

#[tokio::test]
async fn test_missing_catalog_entry_is_failed_dependency() {
    let host = TestHost::new(true).await;
    let mut event = replicate_event();
    // Feed node exists in the graph but the definition is absent from the catalog.
    event["entity_name"] = json!("impressions");
    event["output_feed_names"] = json!("impressions");
    host.store
        .insert_node(lineage_rs::nodes::GraphNode::new(
            "impressions",
            NodeType::FeedEntity,
            chrono::Utc::now(),
        ))
        .unwrap();

    let (status, _) = host.post_event(&event).await;
    assert_eq!(status, StatusCode::FAILED_DEPENDENCY);
}

#[tokio::test]
async fn test_redelivered_replicate_reuses_instance() {
    let host = TestHost::new(true).await;
    let (first_status, first) = host.post_event(&replicate_event()).await;
    let (second_status, second) = host.post_event(&replicate_event()).await;

    assert_eq!(first_status, StatusCode::CREATED);
    assert_eq!(second_status, StatusCode::CREATED);
    assert_eq!(first["feed_instances"], second["feed_instances"]);
    assert_eq!(second["summary"]["nodes_created"], 0);
    assert_eq!(host.store.edges_with_label(EdgeLabel::Replicated).len(), 2);
    assert_eq!(host.store.edges_with_label(EdgeLabel::GroupedAs).len(), 1);
}

#[tokio::test]
async fn test_concurrent_replicates_share_one_instance() {
    let host = TestHost::new(false).await;
    let event = replicate_event();

    let (a, b) = tokio::join!(host.post_event(&event), host.post_event(&event));
    assert_eq!(a.0, StatusCode::CREATED);
    assert_eq!(b.0, StatusCode::CREATED);
    assert_eq!(host.store.nodes_of_type(NodeType::FeedInstance).len(), 1);
}

#[tokio::test]
async fn test_invalid_json_body_is_rejected() {
    let host = TestHost::new(false).await;
    let (status, _) = host.post_event(&json!({ "entity_name": "sample-process" })).await;
    assert!(status.is_client_error());
    assert_eq!(host.store.nodes_of_type(NodeType::ProcessInstance).len(), 0);
}

#[tokio::test]
async fn test_body_limit_is_enforced() {
    let host = TestHost::with_body_limit(false, 64).await;
    let (status, _) = host.post_event(&generate_event()).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
}

// ---------------------------------------------------------------------------
// GET /nodes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_get_node_by_key() {
    let host = TestHost::new(false).await;
    host.post_event(&generate_event()).await;

    let (status, body) = host
        .get("/nodes/process-instance/sample-process/2014-01-01T01:00Z")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "sample-process/2014-01-01T01:00Z");
    assert_eq!(body["properties"]["workflowId"], "0000-oozie-wf");
    assert_eq!(body["properties"]["TIMETAKEN"], 36956);
}

#[tokio::test]
async fn test_get_seeded_entity() {
    let host = TestHost::new(false).await;
    let (status, body) = host.get("/nodes/classification/classification=secure").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["node_type"], "classification");
}

#[tokio::test]
async fn test_get_missing_node_is_404() {
    let host = TestHost::new(false).await;
    let (status, _) = host.get("/nodes/cluster-entity/nowhere").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_unknown_node_type_is_unprocessable() {
    let host = TestHost::new(false).await;
    let (status, _) = host.get("/nodes/galaxy/andromeda").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

// ---------------------------------------------------------------------------
// Health checks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_health_and_ready() {
    let host = TestHost::new(false).await;
    assert_eq!(host.get("/health").await.0, StatusCode::OK);
    assert_eq!(host.get("/ready").await.0, StatusCode::OK);
}
