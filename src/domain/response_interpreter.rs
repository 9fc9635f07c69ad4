//! DraftGridResponseInterpreter: batch response → per-cluster result rows.
//!
//! Every requested cluster ends up with exactly one row: the engine's own
//! row when it returned one, a synthetic NoData row when it did not, or a
//! failed row carrying the request's HTTP outcome.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::InterpreterError;
use crate::query::{BatchQueryResponse, ClusterQueryRequest, QueryResponse, QueryResponseBody, Table};
use crate::strings;

use super::grid::WorkspaceClusters;
use super::types::{MonitoredClusterQueryResponseResultRow, ResourceStatusObj, ResponseStatus};

pub const CLUSTER_ID_COLUMN: &str = "ClusterId";
pub const NODE_STATUS_COLUMN: &str = "NodeStatus";
pub const USER_POD_STATUS_COLUMN: &str = "UserPodStatus";
pub const SYSTEM_POD_STATUS_COLUMN: &str = "SystemPodStatus";
pub const CLUSTER_VERSION_COLUMN: &str = "ClusterVersion";

/// Last segment of a workspace resource id
/// (`/subscriptions/{s}/resourceGroups/{g}/providers/{p}/workspaces/{name}`).
/// Ids too short to carry a name are returned unchanged.
pub fn workspace_short_name(resource_id: &str) -> &str {
    resource_id.split('/').nth(8).unwrap_or(resource_id)
}

/// Error template for a failed request's status code.
fn failure_message(status: ResponseStatus, workspace_resource_id: &str) -> String {
    let template = match status {
        ResponseStatus::Error => strings::QUERY_FAILED,
        ResponseStatus::Unauthorized => strings::WORKSPACE_UNAUTHORIZED,
        ResponseStatus::NotFound => strings::WORKSPACE_NOT_FOUND,
        ResponseStatus::Misconfigured => strings::WORKSPACE_MISCONFIGURED,
        _ => strings::QUERY_UNKNOWN_ERROR,
    };
    strings::format(template, &[workspace_short_name(workspace_resource_id)])
}

#[derive(Default)]
struct RequestResult {
    rows: Vec<MonitoredClusterQueryResponseResultRow>,
    answered: bool,
}

pub struct DraftGridResponseInterpreter<'a> {
    requests: &'a [ClusterQueryRequest],
}

impl<'a> DraftGridResponseInterpreter<'a> {
    pub fn new(requests: &'a [ClusterQueryRequest]) -> Self {
        Self { requests }
    }

    /// Turn a batch response into result rows, in request order.
    pub fn interpret(
        &self,
        response: &BatchQueryResponse,
    ) -> Result<Vec<MonitoredClusterQueryResponseResultRow>, InterpreterError> {
        let index: HashMap<&str, usize> = self
            .requests
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.as_str(), i))
            .collect();
        let mut results: Vec<RequestResult> =
            self.requests.iter().map(|_| RequestResult::default()).collect();

        for resp in &response.responses {
            let slot = *index
                .get(resp.id.as_str())
                .ok_or_else(|| InterpreterError::UnknownRequestId(resp.id.clone()))?;
            let request = &self.requests[slot];
            let result = &mut results[slot];
            if result.answered {
                warn!(request_id = %resp.id, "duplicate response for request, ignoring");
                continue;
            }
            result.answered = true;
            result.rows = interpret_one(request, resp)?;
        }

        let mut rows = Vec::new();
        for (request, result) in self.requests.iter().zip(results) {
            if result.answered {
                rows.extend(result.rows);
            } else {
                warn!(request_id = %request.id, "batch response has no entry for request");
                rows.extend(failed_rows(request, ResponseStatus::Unknown));
            }
        }
        Ok(rows)
    }

    /// Rows for clusters whose workspace is known to be deleted or
    /// inaccessible. Only produced on the initial load, since those
    /// clusters are never part of a batch.
    pub fn unavailable_workspace_rows(
        unavailable: &[WorkspaceClusters],
    ) -> Vec<MonitoredClusterQueryResponseResultRow> {
        unavailable
            .iter()
            .flat_map(|entry| {
                let message = strings::format(
                    strings::WORKSPACE_UNAVAILABLE,
                    &[workspace_short_name(&entry.workspace.resource_id)],
                );
                entry.cluster_ids.iter().map(move |id| {
                    MonitoredClusterQueryResponseResultRow::failed(
                        id.clone(),
                        ResponseStatus::NotFound,
                        message.clone(),
                    )
                })
            })
            .collect()
    }
}

fn interpret_one(
    request: &ClusterQueryRequest,
    resp: &QueryResponse,
) -> Result<Vec<MonitoredClusterQueryResponseResultRow>, InterpreterError> {
    let status = ResponseStatus::from_http_status(resp.status);
    match (&resp.body, status) {
        (QueryResponseBody::Tables { tables }, ResponseStatus::Success) => {
            let mut rows = match tables.first() {
                Some(table) => table_rows(&request.id, table)?,
                None => Vec::new(),
            };
            rows.extend(no_data_rows(request, &rows));
            debug!(
                request_id = %request.id,
                requested = request.cluster_ids.len(),
                rows = rows.len(),
                "interpreted successful response"
            );
            Ok(rows)
        }
        (QueryResponseBody::Error { error }, ResponseStatus::Success) => {
            warn!(
                request_id = %request.id,
                code = ?error.code,
                "successful status carried an error body"
            );
            Ok(failed_rows(request, ResponseStatus::Unknown))
        }
        (body, status) => {
            if let QueryResponseBody::Error { error } = body {
                warn!(
                    request_id = %request.id,
                    http_status = resp.status,
                    code = ?error.code,
                    message = ?error.message,
                    "batch request failed"
                );
            }
            Ok(failed_rows(request, status))
        }
    }
}

fn failed_rows(
    request: &ClusterQueryRequest,
    status: ResponseStatus,
) -> Vec<MonitoredClusterQueryResponseResultRow> {
    let message = failure_message(status, &request.workspace.resource_id);
    request
        .cluster_ids
        .iter()
        .map(|id| MonitoredClusterQueryResponseResultRow::failed(id.clone(), status, message.clone()))
        .collect()
}

/// NoData rows for requested clusters absent from `returned`.
fn no_data_rows(
    request: &ClusterQueryRequest,
    returned: &[MonitoredClusterQueryResponseResultRow],
) -> Vec<MonitoredClusterQueryResponseResultRow> {
    if returned.len() >= request.cluster_ids.len() {
        return Vec::new();
    }
    let seen: HashSet<String> = returned
        .iter()
        .filter_map(|r| r.cluster_id.as_deref())
        .map(str::to_lowercase)
        .collect();
    let message = strings::format(
        strings::NO_DATA_IN_WORKSPACE,
        &[workspace_short_name(&request.workspace.resource_id)],
    );
    request
        .cluster_ids
        .iter()
        .filter(|id| !seen.contains(&id.to_lowercase()))
        .map(|id| {
            MonitoredClusterQueryResponseResultRow::failed(
                id.clone(),
                ResponseStatus::NoData,
                message.clone(),
            )
        })
        .collect()
}

fn table_rows(
    request_id: &str,
    table: &Table,
) -> Result<Vec<MonitoredClusterQueryResponseResultRow>, InterpreterError> {
    let column = |name: &str| {
        table
            .column_index(name)
            .ok_or_else(|| InterpreterError::MissingColumn {
                request_id: request_id.to_string(),
                column: name.to_string(),
            })
    };
    let id_col = column(CLUSTER_ID_COLUMN)?;
    let node_col = column(NODE_STATUS_COLUMN)?;
    let user_col = column(USER_POD_STATUS_COLUMN)?;
    let system_col = column(SYSTEM_POD_STATUS_COLUMN)?;
    let version_col = table.column_index(CLUSTER_VERSION_COLUMN);

    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    for raw in &table.rows {
        let Some(cluster_id) = raw.get(id_col).and_then(Value::as_str).filter(|s| !s.is_empty())
        else {
            warn!(request_id, "result row without a cluster id, skipping");
            continue;
        };
        if !seen.insert(cluster_id.to_lowercase()) {
            debug!(request_id, cluster_id, "repeated cluster id in result, keeping first");
            continue;
        }

        let statuses = |col: usize, name: &str| parse_statuses(cluster_id, name, raw.get(col));
        rows.push(MonitoredClusterQueryResponseResultRow {
            cluster_id: Some(cluster_id.to_string()),
            node_status: statuses(node_col, NODE_STATUS_COLUMN)?,
            user_pod_status: statuses(user_col, USER_POD_STATUS_COLUMN)?,
            system_pod_status: statuses(system_col, SYSTEM_POD_STATUS_COLUMN)?,
            response_status: ResponseStatus::Success,
            error_message: None,
            cluster_version: version_col
                .and_then(|c| raw.get(c))
                .and_then(Value::as_str)
                .filter(|v| !v.is_empty())
                .map(str::to_string),
        });
    }
    Ok(rows)
}

/// Status arrays arrive JSON-encoded inside a string cell; null or empty
/// cells mean the engine saw nothing for that resource kind.
fn parse_statuses(
    cluster_id: &str,
    column: &str,
    cell: Option<&Value>,
) -> Result<Option<Vec<ResourceStatusObj>>, InterpreterError> {
    let malformed = |source: serde_json::Error| InterpreterError::MalformedStatus {
        cluster_id: cluster_id.to_string(),
        column: column.to_string(),
        source,
    };
    match cell {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => serde_json::from_str(s).map(Some).map_err(malformed),
        Some(other) => serde_json::from_value(other.clone()).map(Some).map_err(malformed),
    }
}
