//! Per-cluster view models built from one result row and one managed cluster.

use std::sync::Arc;

use crate::error::HealthError;
use crate::strings;

use super::grid::{self, CellValue, GridCell, GridRow};
use super::health_calculator;
use super::types::{
    ClusterType, HealthStatus, ManagedCluster, MonitoredClusterQueryResponseResultRow,
    ResourceStatusObj, ResponseStatus,
};

/// Sort value of a ratio with no data behind it (JS `Number.MIN_SAFE_INTEGER`).
pub const MISSING_RATIO: f64 = -9_007_199_254_740_991.0;

pub const NODE_HEALTHY_STATUSES: &[&str] = &["Green"];
pub const POD_HEALTHY_STATUSES: &[&str] = &["Green", "Stopped"];

/// Count `(healthy, total)` over status buckets.
pub fn tally_resource_statuses(statuses: &[ResourceStatusObj], healthy: &[&str]) -> (u64, u64) {
    statuses.iter().fold((0, 0), |(ok, total), s| {
        let is_healthy = healthy.iter().any(|h| h.eq_ignore_ascii_case(&s.status));
        (if is_healthy { ok + s.count } else { ok }, total + s.count)
    })
}

/// Health of one resource kind (nodes, user pods or system pods).
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceHealth {
    pub healthy: u64,
    pub total: u64,
    /// Healthy fraction in [0, 1], or [`MISSING_RATIO`].
    pub ratio: f64,
    pub health: HealthStatus,
    pub display: String,
}

impl ResourceHealth {
    fn missing() -> Self {
        Self {
            healthy: 0,
            total: 0,
            ratio: MISSING_RATIO,
            health: HealthStatus::Unknown,
            display: strings::MISSING_DATA.to_string(),
        }
    }

    /// No user pods scheduled at all; nothing is unhealthy.
    fn none_scheduled() -> Self {
        Self {
            healthy: 0,
            total: 0,
            ratio: 1.0,
            health: HealthStatus::Healthy,
            display: "0".to_string(),
        }
    }

    fn from_statuses(
        statuses: Option<&[ResourceStatusObj]>,
        healthy_set: &[&str],
        classify: fn(f64) -> Result<HealthStatus, HealthError>,
    ) -> Result<Self, HealthError> {
        let Some(statuses) = statuses.filter(|s| !s.is_empty()) else {
            return Ok(Self::missing());
        };
        let (healthy, total) = tally_resource_statuses(statuses, healthy_set);
        if total == 0 {
            return Ok(Self::missing());
        }
        let ratio = healthy as f64 / total as f64;
        Ok(Self {
            healthy,
            total,
            ratio,
            health: classify(ratio)?,
            display: format!("{healthy}/{total}"),
        })
    }

    pub fn is_missing(&self) -> bool {
        self.ratio <= MISSING_RATIO
    }
}

fn has_data(statuses: &Option<Vec<ResourceStatusObj>>) -> bool {
    statuses.as_ref().is_some_and(|s| !s.is_empty())
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonitoredClusterMetaData {
    pub cluster_id: String,
    pub cluster: ManagedCluster,
    pub version: String,
    pub nodes: ResourceHealth,
    pub user_pods: ResourceHealth,
    pub system_pods: ResourceHealth,
    pub status: HealthStatus,
    pub response_status: Option<ResponseStatus>,
    pub error_message: Option<String>,
}

impl MonitoredClusterMetaData {
    /// `row` is `None` before the first query for this cluster completes.
    pub fn new(
        row: Option<&MonitoredClusterQueryResponseResultRow>,
        cluster: &ManagedCluster,
    ) -> Result<Self, HealthError> {
        let cluster_id = match row.and_then(|r| r.cluster_id.clone()) {
            Some(id) => id,
            None => cluster.expected_cluster_id().to_string(),
        };

        let version = cluster
            .kubernetes_version
            .as_deref()
            .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(strings::UNKNOWN_VERSION))
            .or_else(|| row.and_then(|r| r.cluster_version.as_deref()))
            .unwrap_or(strings::UNKNOWN_VERSION)
            .to_string();

        let node_status = row.and_then(|r| r.node_status.as_deref());
        let system_pod_status = row.and_then(|r| r.system_pod_status.as_deref());
        let user_pod_status = row.and_then(|r| r.user_pod_status.as_deref());

        let nodes = ResourceHealth::from_statuses(
            node_status,
            NODE_HEALTHY_STATUSES,
            health_calculator::node_overall_health,
        )?;
        let system_pods = ResourceHealth::from_statuses(
            system_pod_status,
            POD_HEALTHY_STATUSES,
            health_calculator::system_pod_overall_health,
        )?;
        let user_pods = match row {
            Some(r) if !has_data(&r.user_pod_status) && has_data(&r.system_pod_status) => {
                ResourceHealth::none_scheduled()
            }
            _ => ResourceHealth::from_statuses(
                user_pod_status,
                POD_HEALTHY_STATUSES,
                health_calculator::user_pod_overall_health,
            )?,
        };

        let response_status = row.map(|r| r.response_status);
        let status = health_calculator::cluster_health(
            nodes.health,
            user_pods.health,
            system_pods.health,
            response_status,
        );

        Ok(Self {
            cluster_id,
            cluster: cluster.clone(),
            version,
            nodes,
            user_pods,
            system_pods,
            status,
            response_status,
            error_message: row.and_then(|r| r.error_message.clone()),
        })
    }

    /// Cells in grid column order.
    pub fn format_monitored_cluster_row(&self) -> GridRow {
        let meta = Arc::new(ClusterMetaData::Monitored(self.clone()));
        let cell = |value: CellValue, display: String| GridCell {
            value,
            display,
            metadata: Arc::clone(&meta),
        };
        let ratio = |r: &ResourceHealth| cell(CellValue::Number(r.ratio), r.display.clone());

        GridRow {
            cells: [
                cell(CellValue::Text(self.cluster.name.clone()), self.cluster.name.clone()),
                type_cell(&meta, self.cluster.cluster_type()),
                cell(CellValue::Text(self.version.clone()), self.version.clone()),
                cell(
                    CellValue::Number(self.status.value() as f64),
                    self.status.label().to_string(),
                ),
                ratio(&self.nodes),
                ratio(&self.user_pods),
                ratio(&self.system_pods),
            ],
        }
    }
}

fn type_cell(meta: &Arc<ClusterMetaData>, cluster_type: ClusterType) -> GridCell {
    let display = grid::cluster_type_display(cluster_type).to_string();
    GridCell {
        value: CellValue::Text(display.clone()),
        display,
        metadata: Arc::clone(meta),
    }
}

/// A cluster with no workspace attached.
#[derive(Debug, Clone, PartialEq)]
pub struct UnmonitoredClusterMetaData {
    pub cluster: ManagedCluster,
    pub version: String,
}

impl UnmonitoredClusterMetaData {
    pub fn new(cluster: &ManagedCluster) -> Self {
        let version = cluster
            .kubernetes_version
            .clone()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| strings::UNKNOWN_VERSION.to_string());
        Self {
            cluster: cluster.clone(),
            version,
        }
    }

    pub fn format_unmonitored_cluster_row(&self) -> GridRow {
        let meta = Arc::new(ClusterMetaData::Unmonitored(self.clone()));
        let cell = |value: CellValue, display: &str| GridCell {
            value,
            display: display.to_string(),
            metadata: Arc::clone(&meta),
        };
        let status = HealthStatus::Unmonitored;

        GridRow {
            cells: [
                cell(CellValue::Text(self.cluster.name.clone()), &self.cluster.name),
                type_cell(&meta, self.cluster.cluster_type()),
                cell(CellValue::Text(self.version.clone()), &self.version),
                cell(CellValue::Number(status.value() as f64), strings::NOT_MONITORED),
                cell(CellValue::Text(String::new()), ""),
                cell(CellValue::Text(String::new()), ""),
                cell(CellValue::Text(String::new()), ""),
            ],
        }
    }
}

/// Back-reference carried by every grid cell, for sorting and tooltips.
#[derive(Debug, Clone, PartialEq)]
pub enum ClusterMetaData {
    Monitored(MonitoredClusterMetaData),
    Unmonitored(UnmonitoredClusterMetaData),
}

impl ClusterMetaData {
    pub fn cluster(&self) -> &ManagedCluster {
        match self {
            Self::Monitored(m) => &m.cluster,
            Self::Unmonitored(u) => &u.cluster,
        }
    }

    pub fn name(&self) -> &str {
        &self.cluster().name
    }

    pub fn cluster_id(&self) -> &str {
        match self {
            Self::Monitored(m) => &m.cluster_id,
            Self::Unmonitored(u) => &u.cluster.resource_id,
        }
    }

    pub fn version(&self) -> &str {
        match self {
            Self::Monitored(m) => &m.version,
            Self::Unmonitored(u) => &u.version,
        }
    }

    pub fn status(&self) -> HealthStatus {
        match self {
            Self::Monitored(m) => m.status,
            Self::Unmonitored(_) => HealthStatus::Unmonitored,
        }
    }

    /// Tooltip text for the status cell.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Monitored(m) => m.error_message.as_deref(),
            Self::Unmonitored(_) => Some(strings::NOT_MONITORED),
        }
    }
}
