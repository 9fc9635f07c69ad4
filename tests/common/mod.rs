#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;

use pleme_clusterscope::config::EngineConfig;
use pleme_clusterscope::domain::grid_service::GridService;
use pleme_clusterscope::domain::types::{ManagedCluster, WorkspaceRef};
use pleme_clusterscope::query::{
    BatchQueryRequest, BatchQueryResponse, Column, QueryEngine, QueryErrorBody, QueryResponse,
    QueryResponseBody, Table,
};
use pleme_clusterscope::QueryError;

pub const AKS: &str = "microsoft.containerservice/managedclusters";

pub fn workspace(name: &str) -> WorkspaceRef {
    WorkspaceRef {
        id: format!("{name}-guid"),
        resource_id: format!(
            "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.OperationalInsights/workspaces/{name}"
        ),
    }
}

pub fn resource_id(name: &str) -> String {
    format!("/subscriptions/sub/resourceGroups/rg/providers/Microsoft.ContainerService/managedClusters/{name}")
}

pub fn monitored(name: &str, ws: &str) -> ManagedCluster {
    ManagedCluster {
        resource_id: resource_id(name),
        name: name.to_string(),
        kind: AKS.to_string(),
        kubernetes_version: Some("1.29.2".to_string()),
        location: Some("westeurope".to_string()),
        workspace: Some(workspace(ws)),
        workspace_unavailable: false,
    }
}

pub fn unmonitored(name: &str) -> ManagedCluster {
    ManagedCluster {
        workspace: None,
        ..monitored(name, "unused")
    }
}

/// Status column value as the engine emits it: a JSON-encoded string.
pub fn statuses(pairs: &[(&str, u64)]) -> Value {
    let arr: Vec<Value> = pairs
        .iter()
        .map(|(status, count)| json!({ "status": status, "count": count }))
        .collect();
    Value::String(Value::Array(arr).to_string())
}

/// One result row: (cluster id, nodes, user pods, system pods).
pub fn row(cluster_id: &str, nodes: Value, user_pods: Value, system_pods: Value) -> Vec<Value> {
    vec![Value::String(cluster_id.to_string()), nodes, user_pods, system_pods]
}

pub fn healthy_row(cluster_id: &str) -> Vec<Value> {
    row(
        cluster_id,
        statuses(&[("Green", 3)]),
        statuses(&[("Green", 10)]),
        statuses(&[("Green", 5)]),
    )
}

pub fn table_response(id: &str, rows: Vec<Vec<Value>>) -> QueryResponse {
    let columns = ["ClusterId", "NodeStatus", "UserPodStatus", "SystemPodStatus"]
        .into_iter()
        .map(|name| Column {
            name: name.to_string(),
            column_type: Some("string".to_string()),
        })
        .collect();
    QueryResponse {
        id: id.to_string(),
        status: 200,
        body: QueryResponseBody::Tables {
            tables: vec![Table {
                name: Some("PrimaryResult".to_string()),
                columns,
                rows,
            }],
        },
    }
}

pub fn error_response(id: &str, status: u16) -> QueryResponse {
    QueryResponse {
        id: id.to_string(),
        status,
        body: QueryResponseBody::Error {
            error: QueryErrorBody {
                code: Some("Failed".to_string()),
                message: Some("request rejected".to_string()),
            },
        },
    }
}

pub fn batch(responses: Vec<QueryResponse>) -> BatchQueryResponse {
    BatchQueryResponse { responses }
}

/// Engine replaying scripted results in call order. When `gate_first` is
/// set, the first call blocks until `release()` is called.
pub struct ScriptedEngine {
    script: Mutex<VecDeque<Result<BatchQueryResponse, QueryError>>>,
    pub requests: Mutex<Vec<BatchQueryRequest>>,
    calls: AtomicUsize,
    gate: Option<Notify>,
}

impl ScriptedEngine {
    pub fn new(script: Vec<Result<BatchQueryResponse, QueryError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    pub fn gated(script: Vec<Result<BatchQueryResponse, QueryError>>) -> Self {
        Self {
            gate: Some(Notify::new()),
            ..Self::new(script)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }
}

#[async_trait]
impl QueryEngine for ScriptedEngine {
    async fn batch(&self, request: &BatchQueryRequest) -> Result<BatchQueryResponse, QueryError> {
        self.requests.lock().unwrap().push(request.clone());
        let result = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(QueryError::MissingParameter("scripted response")));
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call == 0 {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
        }
        result
    }
}

pub fn service(engine: Arc<ScriptedEngine>, clusters: Vec<ManagedCluster>) -> GridService {
    GridService::new(engine, EngineConfig::default(), clusters).unwrap()
}
