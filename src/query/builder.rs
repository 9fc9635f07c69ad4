//! Builds the per-workspace health statements for one batch.

use chrono::SecondsFormat;

use crate::domain::grid::WorkspaceClusters;
use crate::error::QueryError;

use super::{BatchQueryRequest, ClusterQueryRequest, QueryStatement, TimeRange};

const HEALTH_QUERY: &str = r#"let startDateTime = datetime({start});
let endDateTime = datetime({end});
let clusterIds = dynamic([{cluster_ids}]);
let nodes = KubeNodeInventory
| where TimeGenerated between (startDateTime .. endDateTime)
| where ClusterId in~ (clusterIds)
| summarize arg_max(TimeGenerated, Status, KubeletVersion) by ClusterId, Computer
| extend NodeHealth = iff(Status has 'Ready' and Status !has 'NotReady', 'Green', 'Red')
| summarize NodeCount = count(), ClusterVersion = any(KubeletVersion) by ClusterId, NodeHealth
| summarize NodeStatus = tostring(make_list(pack('status', NodeHealth, 'count', NodeCount))),
    ClusterVersion = any(ClusterVersion) by ClusterId;
let pods = KubePodInventory
| where TimeGenerated between (startDateTime .. endDateTime)
| where ClusterId in~ (clusterIds)
| summarize arg_max(TimeGenerated, PodStatus, Namespace) by ClusterId, PodUid
| extend IsSystem = Namespace =~ 'kube-system'
| extend PodHealth = case(PodStatus =~ 'Running', 'Green',
    PodStatus =~ 'Succeeded', 'Stopped',
    PodStatus =~ 'Pending', 'Yellow',
    'Red')
| summarize PodCount = count() by ClusterId, IsSystem, PodHealth;
let userPods = pods
| where not(IsSystem)
| summarize UserPodStatus = tostring(make_list(pack('status', PodHealth, 'count', PodCount))) by ClusterId;
let systemPods = pods
| where IsSystem
| summarize SystemPodStatus = tostring(make_list(pack('status', PodHealth, 'count', PodCount))) by ClusterId;
nodes
| join kind=fullouter (userPods) on ClusterId
| join kind=fullouter (systemPods) on ClusterId
| project ClusterId = coalesce(ClusterId, ClusterId1, ClusterId2),
    NodeStatus, UserPodStatus, SystemPodStatus, ClusterVersion"#;

fn kql_string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Health statement for `cluster_ids` over `range`.
pub fn health_query(cluster_ids: &[String], range: Option<&TimeRange>) -> Result<String, QueryError> {
    if cluster_ids.is_empty() {
        return Err(QueryError::MissingParameter("cluster_ids"));
    }
    let range = range.ok_or(QueryError::MissingParameter("time_range"))?;
    if range.start >= range.end {
        return Err(QueryError::InvalidParameter {
            name: "time_range",
            reason: format!("start {} is not before end {}", range.start, range.end),
        });
    }

    let ids = cluster_ids
        .iter()
        .map(|id| kql_string(id))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(HEALTH_QUERY
        .replace("{start}", &range.start.to_rfc3339_opts(SecondsFormat::Secs, true))
        .replace("{end}", &range.end.to_rfc3339_opts(SecondsFormat::Secs, true))
        .replace("{cluster_ids}", &ids))
}

/// One statement per workspace, with request ids assigned in workspace order.
pub fn build_batch(
    workspaces: &[WorkspaceClusters],
    range: Option<&TimeRange>,
    session_id: &str,
    timeout_secs: u64,
) -> Result<(Vec<ClusterQueryRequest>, BatchQueryRequest), QueryError> {
    if session_id.is_empty() {
        return Err(QueryError::MissingParameter("session_id"));
    }

    let mut pending = Vec::with_capacity(workspaces.len());
    let mut statements = Vec::with_capacity(workspaces.len());

    for (index, entry) in workspaces.iter().enumerate() {
        let id = index.to_string();
        let query = health_query(&entry.cluster_ids, range)?;
        statements.push(QueryStatement {
            id: id.clone(),
            workspace_id: entry.workspace.id.clone(),
            workspace_resource_id: entry.workspace.resource_id.clone(),
            query,
        });
        pending.push(ClusterQueryRequest {
            id,
            workspace: entry.workspace.clone(),
            cluster_ids: entry.cluster_ids.clone(),
        });
    }

    Ok((
        pending,
        BatchQueryRequest {
            session_id: session_id.to_string(),
            timeout_secs,
            requests: statements,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::WorkspaceRef;
    use chrono::{TimeZone, Utc};

    fn range() -> TimeRange {
        TimeRange {
            start: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 5, 1, 6, 0, 0).unwrap(),
        }
    }

    fn workspace(name: &str) -> WorkspaceRef {
        WorkspaceRef {
            id: format!("{name}-guid"),
            resource_id: format!(
                "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.OperationalInsights/workspaces/{name}"
            ),
        }
    }

    #[test]
    fn query_embeds_filter_and_window() {
        let q = health_query(&["/subs/a".to_string(), "o'brien".to_string()], Some(&range())).unwrap();
        assert!(q.contains("dynamic(['/subs/a', 'o\\'brien'])"));
        assert!(q.contains("datetime(2024-05-01T00:00:00Z)"));
        assert!(q.contains("datetime(2024-05-01T06:00:00Z)"));
    }

    #[test]
    fn missing_parameters_are_rejected() {
        assert!(matches!(
            health_query(&[], Some(&range())),
            Err(QueryError::MissingParameter("cluster_ids"))
        ));
        assert!(matches!(
            health_query(&["a".to_string()], None),
            Err(QueryError::MissingParameter("time_range"))
        ));
        let backwards = TimeRange {
            start: range().end,
            end: range().start,
        };
        assert!(matches!(
            health_query(&["a".to_string()], Some(&backwards)),
            Err(QueryError::InvalidParameter { name: "time_range", .. })
        ));
    }

    #[test]
    fn batch_assigns_ids_in_workspace_order() {
        let workspaces = vec![
            WorkspaceClusters {
                workspace: workspace("alpha"),
                cluster_ids: vec!["c1".to_string(), "c2".to_string()],
            },
            WorkspaceClusters {
                workspace: workspace("beta"),
                cluster_ids: vec!["c3".to_string()],
            },
        ];
        let (pending, batch) = build_batch(&workspaces, Some(&range()), "session", 120).unwrap();

        assert_eq!(batch.requests.len(), 2);
        assert_eq!(batch.requests[0].id, "0");
        assert_eq!(batch.requests[1].id, "1");
        assert_eq!(batch.requests[1].workspace_id, "beta-guid");
        assert_eq!(batch.timeout_secs, 120);
        assert_eq!(pending[0].cluster_ids, vec!["c1", "c2"]);
        assert_eq!(pending[1].workspace, workspace("beta"));
    }
}
