use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};

use crate::error::HealthError;

// ── Health ──────────────────────────────────────────────────

/// Roll-up health of a cluster or one of its resource kinds.
///
/// Values are ordered worst first, so "worst status wins" is a plain `min`
/// and grid sorting compares the numeric value directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(i64)]
pub enum HealthStatus {
    Critical = 0,
    Error = 10,
    UnAuthorized = 20,
    NotFound = 30,
    MisConfigured = 40,
    NoData = 50,
    Warning = 100,
    Unknown = 200,
    Healthy = 300,
    Unmonitored = 400,
}

impl HealthStatus {
    pub const ALL: [HealthStatus; 10] = [
        HealthStatus::Critical,
        HealthStatus::Error,
        HealthStatus::UnAuthorized,
        HealthStatus::NotFound,
        HealthStatus::MisConfigured,
        HealthStatus::NoData,
        HealthStatus::Warning,
        HealthStatus::Unknown,
        HealthStatus::Healthy,
        HealthStatus::Unmonitored,
    ];

    pub fn value(self) -> i64 {
        self as i64
    }

    pub fn label(self) -> &'static str {
        match self {
            HealthStatus::Critical => "Critical",
            HealthStatus::Error => "Error",
            HealthStatus::UnAuthorized => "Unauthorized",
            HealthStatus::NotFound => "Not found",
            HealthStatus::MisConfigured => "Misconfigured",
            HealthStatus::NoData => "No data",
            HealthStatus::Warning => "Warning",
            HealthStatus::Unknown => "Unknown",
            HealthStatus::Healthy => "Healthy",
            HealthStatus::Unmonitored => "Unmonitored",
        }
    }
}

impl TryFrom<i64> for HealthStatus {
    type Error = HealthError;

    fn try_from(value: i64) -> Result<Self, HealthError> {
        Self::ALL
            .into_iter()
            .find(|s| s.value() == value)
            .ok_or(HealthError::UnknownStatus(value))
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of the query that produced a cluster's result row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseStatus {
    Success,
    Unauthorized,
    NotFound,
    Misconfigured,
    Error,
    NoData,
    Unknown,
}

impl ResponseStatus {
    /// Classify an HTTP-like status code returned for one batch request.
    pub fn from_http_status(code: u16) -> Self {
        match code {
            200..=299 => Self::Success,
            500..=599 => Self::Error,
            401 | 403 => Self::Unauthorized,
            404 => Self::NotFound,
            400 => Self::Misconfigured,
            _ => Self::Unknown,
        }
    }
}

// ── Query results ───────────────────────────────────────────

/// Aggregate count of nodes or pods in one status bucket for one cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
pub struct ResourceStatusObj {
    pub status: String,
    pub count: u64,
}

impl ResourceStatusObj {
    pub fn new(status: impl Into<String>, count: u64) -> Self {
        Self {
            status: status.into(),
            count,
        }
    }
}

/// Per-cluster outcome of one batched health query.
///
/// A `None` status array means the engine reported nothing for that
/// resource kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoredClusterQueryResponseResultRow {
    pub cluster_id: Option<String>,
    pub node_status: Option<Vec<ResourceStatusObj>>,
    pub user_pod_status: Option<Vec<ResourceStatusObj>>,
    pub system_pod_status: Option<Vec<ResourceStatusObj>>,
    pub response_status: ResponseStatus,
    pub error_message: Option<String>,
    pub cluster_version: Option<String>,
}

impl MonitoredClusterQueryResponseResultRow {
    /// A row carrying only a failure outcome for `cluster_id`.
    pub fn failed(
        cluster_id: impl Into<String>,
        response_status: ResponseStatus,
        error_message: String,
    ) -> Self {
        Self {
            cluster_id: Some(cluster_id.into()),
            node_status: None,
            user_pod_status: None,
            system_pod_status: None,
            response_status,
            error_message: Some(error_message),
            cluster_version: None,
        }
    }
}

// ── Managed clusters ────────────────────────────────────────

/// Kubernetes distribution of a managed cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClusterType {
    Aks,
    AksEngine,
    AksEngineAzureStack,
    Aro,
    Arc,
    Other,
}

impl ClusterType {
    pub fn classify(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "microsoft.containerservice/managedclusters" | "aks" => Self::Aks,
            "aks-engine" | "aksengine" => Self::AksEngine,
            "aks-engine-azurestack" | "aksengineazurestack" => Self::AksEngineAzureStack,
            "microsoft.redhatopenshift/openshiftclusters" | "aro" => Self::Aro,
            "microsoft.kubernetes/connectedclusters" | "arc" => Self::Arc,
            _ => Self::Other,
        }
    }

    /// AKS-Engine clusters report their name as the cluster id.
    pub fn is_aks_engine(self) -> bool {
        matches!(self, Self::AksEngine | Self::AksEngineAzureStack)
    }
}

/// Log Analytics workspace a cluster reports into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
pub struct WorkspaceRef {
    /// Workspace GUID used by the query engine.
    pub id: String,
    pub resource_id: String,
}

/// A cluster as known to the host inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
pub struct ManagedCluster {
    pub resource_id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub kubernetes_version: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub workspace: Option<WorkspaceRef>,
    /// Workspace was deleted or access to it was lost.
    #[serde(default)]
    pub workspace_unavailable: bool,
}

impl ManagedCluster {
    pub fn cluster_type(&self) -> ClusterType {
        ClusterType::classify(&self.kind)
    }

    pub fn is_monitored(&self) -> bool {
        self.workspace.is_some()
    }

    /// Id the query engine reports for this cluster.
    pub fn expected_cluster_id(&self) -> &str {
        if self.cluster_type().is_aks_engine() {
            &self.name
        } else {
            &self.resource_id
        }
    }
}
