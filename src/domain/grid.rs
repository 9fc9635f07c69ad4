//! MulticlusterGridBase: sorting, filtering and summary helpers for the
//! cluster grid.
//!
//! Rows are fixed-width tuples of cells in [`GridColumn`] order. Every cell
//! points back at its cluster's metadata so comparators and tooltips can
//! reach the underlying values.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::iter::Peekable;
use std::str::{Chars, FromStr};
use std::sync::Arc;

use async_graphql::SimpleObject;
use serde::{Deserialize, Serialize};

use crate::error::HealthError;

use super::cluster_metadata::{ClusterMetaData, MISSING_RATIO};
use super::types::{ClusterType, HealthStatus, ManagedCluster, WorkspaceRef};

pub const MIN_SAFE_INTEGER: f64 = -9_007_199_254_740_991.0;
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

// ── Cells and rows ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

#[derive(Debug, Clone)]
pub struct GridCell {
    pub value: CellValue,
    pub display: String,
    pub metadata: Arc<ClusterMetaData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridColumn {
    Name,
    Type,
    Version,
    Status,
    Nodes,
    UserPods,
    SystemPods,
}

impl GridColumn {
    pub const ALL: [GridColumn; 7] = [
        GridColumn::Name,
        GridColumn::Type,
        GridColumn::Version,
        GridColumn::Status,
        GridColumn::Nodes,
        GridColumn::UserPods,
        GridColumn::SystemPods,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn header(self) -> &'static str {
        match self {
            Self::Name => "Cluster",
            Self::Type => "Type",
            Self::Version => "Version",
            Self::Status => "Status",
            Self::Nodes => "Nodes",
            Self::UserPods => "User pods",
            Self::SystemPods => "System pods",
        }
    }
}

impl FromStr for GridColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "name" | "cluster" => Ok(Self::Name),
            "type" => Ok(Self::Type),
            "version" => Ok(Self::Version),
            "status" => Ok(Self::Status),
            "nodes" => Ok(Self::Nodes),
            "userpods" => Ok(Self::UserPods),
            "systempods" => Ok(Self::SystemPods),
            other => Err(format!("unknown grid column: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GridRow {
    pub cells: [GridCell; 7],
}

impl GridRow {
    pub fn cell(&self, column: GridColumn) -> &GridCell {
        &self.cells[column.index()]
    }

    pub fn metadata(&self) -> &ClusterMetaData {
        &self.cells[0].metadata
    }

    /// Status as carried by the status cell.
    pub fn status(&self) -> Result<HealthStatus, HealthError> {
        match &self.cell(GridColumn::Status).value {
            CellValue::Number(v) if v.fract() == 0.0 => HealthStatus::try_from(*v as i64),
            CellValue::Number(v) => Err(HealthError::NonNumericStatus(v.to_string())),
            CellValue::Text(t) => Err(HealthError::NonNumericStatus(t.clone())),
        }
    }

    pub fn view(&self) -> ClusterRowView {
        let meta = self.metadata();
        let status = meta.status();
        ClusterRowView {
            cluster_id: meta.cluster_id().to_string(),
            name: self.cell(GridColumn::Name).display.clone(),
            cluster_type: self.cell(GridColumn::Type).display.clone(),
            version: self.cell(GridColumn::Version).display.clone(),
            status: self.cell(GridColumn::Status).display.clone(),
            status_code: status.value(),
            status_icon: status_icon(status).name().to_string(),
            nodes: self.cell(GridColumn::Nodes).display.clone(),
            user_pods: self.cell(GridColumn::UserPods).display.clone(),
            system_pods: self.cell(GridColumn::SystemPods).display.clone(),
            message: meta.message().map(str::to_string),
        }
    }
}

/// Flattened row as served over the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, SimpleObject)]
pub struct ClusterRowView {
    pub cluster_id: String,
    pub name: String,
    pub cluster_type: String,
    pub version: String,
    pub status: String,
    pub status_code: i64,
    pub status_icon: String,
    pub nodes: String,
    pub user_pods: String,
    pub system_pods: String,
    pub message: Option<String>,
}

// ── Sorting ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridQueryProps {
    pub sort_column: GridColumn,
    pub sort_direction: SortDirection,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}

impl GridQueryProps {
    /// Parse optional column/direction strings, defaulting unset ones.
    pub fn parse(column: Option<&str>, direction: Option<&str>) -> Result<Self, String> {
        let defaults = Self::default();
        Ok(Self {
            sort_column: column
                .map(str::parse::<GridColumn>)
                .transpose()?
                .unwrap_or(defaults.sort_column),
            sort_direction: direction
                .map(str::parse::<SortDirection>)
                .transpose()?
                .unwrap_or(defaults.sort_direction),
        })
    }
}

impl Default for GridQueryProps {
    fn default() -> Self {
        Self {
            sort_column: GridColumn::Status,
            sort_direction: SortDirection::Ascending,
        }
    }
}

fn directed(ord: Ordering, direction: SortDirection) -> Ordering {
    match direction {
        SortDirection::Ascending => ord,
        SortDirection::Descending => ord.reverse(),
    }
}

fn take_digits(it: &mut Peekable<Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = it.peek().copied().filter(char::is_ascii_digit) {
        digits.push(c);
        it.next();
    }
    digits
}

/// Case-insensitive comparison with digit runs compared as numbers
/// (`node2` before `node10`).
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let mut ai = a.chars().peekable();
    let mut bi = b.chars().peekable();
    loop {
        match (ai.peek().copied(), bi.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) if ca.is_ascii_digit() && cb.is_ascii_digit() => {
                let da = take_digits(&mut ai);
                let db = take_digits(&mut bi);
                let (ta, tb) = (da.trim_start_matches('0'), db.trim_start_matches('0'));
                let ord = ta.len().cmp(&tb.len()).then_with(|| ta.cmp(tb));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(ca), Some(cb)) => {
                ai.next();
                bi.next();
                let ord = ca.to_lowercase().cmp(cb.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

fn name_tie_break(a: &GridCell, b: &GridCell, direction: SortDirection) -> Ordering {
    directed(compare_names(a.metadata.name(), b.metadata.name()), direction)
}

fn numeric_value(cell: &GridCell) -> Option<f64> {
    match cell.value {
        CellValue::Number(v) if v.is_finite() && v > MISSING_RATIO => Some(v),
        _ => None,
    }
}

/// Comparator for numeric columns, returning the final display order for
/// the requested direction.
///
/// Missing values take the sentinel that lands them after every known value
/// once the direction is applied, so "no data" rows stay at the bottom
/// either way. Equal values fall back to the cluster name.
pub fn grid_sort_value(a: &GridCell, b: &GridCell, props: &GridQueryProps) -> Ordering {
    let sentinel = match props.sort_direction {
        SortDirection::Ascending => MAX_SAFE_INTEGER,
        SortDirection::Descending => MIN_SAFE_INTEGER,
    };
    let va = numeric_value(a).unwrap_or(sentinel);
    let vb = numeric_value(b).unwrap_or(sentinel);
    directed(va.partial_cmp(&vb).unwrap_or(Ordering::Equal), props.sort_direction)
        .then_with(|| name_tie_break(a, b, props.sort_direction))
}

fn version_components(version: &str) -> Option<Vec<u64>> {
    let trimmed = version.trim().trim_start_matches(['v', 'V']);
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .split('.')
        .map(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        })
        .collect()
}

/// Dotted-version comparator. Shared components compare as integers; when
/// they all match, the shorter version comes first, then the cluster name.
/// Unparseable versions always sort last.
pub fn sort_cluster_version(a: &GridCell, b: &GridCell, props: &GridQueryProps) -> Ordering {
    let direction = props.sort_direction;
    match (
        version_components(a.metadata.version()),
        version_components(b.metadata.version()),
    ) {
        (None, None) => name_tie_break(a, b, direction),
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(va), Some(vb)) => {
            let shared = va
                .iter()
                .zip(&vb)
                .map(|(x, y)| x.cmp(y))
                .find(|o| *o != Ordering::Equal)
                .unwrap_or(Ordering::Equal);
            directed(shared.then_with(|| va.len().cmp(&vb.len())), direction)
                .then_with(|| name_tie_break(a, b, direction))
        }
    }
}

fn compare_text(a: &GridCell, b: &GridCell, props: &GridQueryProps) -> Ordering {
    directed(compare_names(&a.display, &b.display), props.sort_direction)
        .then_with(|| name_tie_break(a, b, props.sort_direction))
}

/// Stable sort of `rows` by the column and direction in `props`.
pub fn sort_rows(rows: &mut [GridRow], props: &GridQueryProps) {
    let column = props.sort_column;
    rows.sort_by(|x, y| {
        let (a, b) = (x.cell(column), y.cell(column));
        match column {
            GridColumn::Name | GridColumn::Type => compare_text(a, b, props),
            GridColumn::Version => sort_cluster_version(a, b, props),
            GridColumn::Status | GridColumn::Nodes | GridColumn::UserPods | GridColumn::SystemPods => {
                grid_sort_value(a, b, props)
            }
        }
    });
}

// ── Summary and filtering ──────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StatusCategory {
    #[default]
    All,
    Critical,
    Warning,
    Healthy,
    Unknown,
    Unmonitored,
}

impl FromStr for StatusCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "critical" => Ok(Self::Critical),
            "warning" => Ok(Self::Warning),
            "healthy" => Ok(Self::Healthy),
            "unknown" => Ok(Self::Unknown),
            "unmonitored" | "nonmonitored" => Ok(Self::Unmonitored),
            other => Err(format!("unknown status category: {other}")),
        }
    }
}

/// Summary-panel bucket a status is counted under.
pub fn status_category(status: HealthStatus) -> StatusCategory {
    match status {
        HealthStatus::Critical => StatusCategory::Critical,
        HealthStatus::Warning => StatusCategory::Warning,
        HealthStatus::Healthy => StatusCategory::Healthy,
        HealthStatus::Unmonitored => StatusCategory::Unmonitored,
        HealthStatus::Unknown
        | HealthStatus::Error
        | HealthStatus::UnAuthorized
        | HealthStatus::NotFound
        | HealthStatus::MisConfigured
        | HealthStatus::NoData => StatusCategory::Unknown,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, SimpleObject)]
pub struct ClusterStatusSummary {
    pub total: u32,
    pub critical: u32,
    pub warning: u32,
    pub healthy: u32,
    pub unknown: u32,
    pub unmonitored: u32,
}

/// Count monitored and unmonitored rows into summary-panel buckets.
pub fn tally_cluster_statuses(
    monitored: &[GridRow],
    unmonitored: &[GridRow],
) -> Result<ClusterStatusSummary, HealthError> {
    monitored
        .iter()
        .chain(unmonitored)
        .try_fold(ClusterStatusSummary::default(), |mut summary, row| {
            summary.total += 1;
            match status_category(row.status()?) {
                StatusCategory::Critical => summary.critical += 1,
                StatusCategory::Warning => summary.warning += 1,
                StatusCategory::Healthy => summary.healthy += 1,
                StatusCategory::Unknown => summary.unknown += 1,
                StatusCategory::Unmonitored => summary.unmonitored += 1,
                StatusCategory::All => {}
            }
            Ok(summary)
        })
}

/// Rows whose name contains `search` (case-insensitive) and whose status
/// falls in `category`.
pub fn filter_rows(
    rows: &[GridRow],
    search: &str,
    category: StatusCategory,
) -> Result<Vec<GridRow>, HealthError> {
    let needle = search.trim().to_lowercase();
    let mut kept = Vec::new();
    for row in rows {
        if !needle.is_empty() && !row.metadata().name().to_lowercase().contains(&needle) {
            continue;
        }
        if category != StatusCategory::All && status_category(row.status()?) != category {
            continue;
        }
        kept.push(row.clone());
    }
    Ok(kept)
}

// ── Workspace mapping ──────────────────────────────────────

/// Monitored clusters reporting into one workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceClusters {
    pub workspace: WorkspaceRef,
    pub cluster_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkspaceMapping {
    pub accessible: Vec<WorkspaceClusters>,
    /// Workspaces deleted or no longer readable; never queried.
    pub unavailable: Vec<WorkspaceClusters>,
}

fn add_to(
    groups: &mut Vec<WorkspaceClusters>,
    index: &mut HashMap<String, (usize, HashSet<String>)>,
    workspace: &WorkspaceRef,
    cluster_id: &str,
) {
    let (slot, seen) = index
        .entry(workspace.resource_id.to_lowercase())
        .or_insert_with(|| {
            groups.push(WorkspaceClusters {
                workspace: workspace.clone(),
                cluster_ids: Vec::new(),
            });
            (groups.len() - 1, HashSet::new())
        });
    if seen.insert(cluster_id.to_lowercase()) {
        groups[*slot].cluster_ids.push(cluster_id.to_string());
    }
}

/// Group monitored clusters by workspace, splitting out workspaces known to
/// be deleted or inaccessible. Cluster ids are deduplicated per workspace.
pub fn workspace_to_monitored_clusters_mapping(clusters: &[ManagedCluster]) -> WorkspaceMapping {
    let mut mapping = WorkspaceMapping::default();
    let mut accessible_index = HashMap::new();
    let mut unavailable_index = HashMap::new();

    for cluster in clusters {
        let Some(workspace) = &cluster.workspace else {
            continue;
        };
        let cluster_id = cluster.expected_cluster_id();
        if cluster.workspace_unavailable {
            add_to(&mut mapping.unavailable, &mut unavailable_index, workspace, cluster_id);
        } else {
            add_to(&mut mapping.accessible, &mut accessible_index, workspace, cluster_id);
        }
    }
    mapping
}

// ── Icons and labels ───────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusIcon {
    Critical,
    Error,
    Warning,
    Healthy,
    Unknown,
    Unmonitored,
}

impl StatusIcon {
    pub fn name(self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Healthy => "healthy",
            Self::Unknown => "unknown",
            Self::Unmonitored => "unmonitored",
        }
    }
}

pub fn status_icon(status: HealthStatus) -> StatusIcon {
    match status {
        HealthStatus::Critical => StatusIcon::Critical,
        HealthStatus::Warning => StatusIcon::Warning,
        HealthStatus::Healthy => StatusIcon::Healthy,
        HealthStatus::Unknown => StatusIcon::Unknown,
        HealthStatus::Unmonitored => StatusIcon::Unmonitored,
        HealthStatus::Error
        | HealthStatus::UnAuthorized
        | HealthStatus::NotFound
        | HealthStatus::MisConfigured
        | HealthStatus::NoData => StatusIcon::Error,
    }
}

pub fn cluster_type_display(cluster_type: ClusterType) -> &'static str {
    match cluster_type {
        ClusterType::Aks => "AKS",
        ClusterType::AksEngine => "AKS Engine",
        ClusterType::AksEngineAzureStack => "AKS Engine (Azure Stack)",
        ClusterType::Aro => "Azure Red Hat OpenShift",
        ClusterType::Arc => "Azure Arc",
        ClusterType::Other => "Other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cluster_metadata::{MonitoredClusterMetaData, UnmonitoredClusterMetaData};
    use crate::domain::types::{
        MonitoredClusterQueryResponseResultRow, ResourceStatusObj, ResponseStatus,
    };

    fn cluster(name: &str, version: Option<&str>, workspace: Option<&str>) -> ManagedCluster {
        ManagedCluster {
            resource_id: format!("/subscriptions/s/resourceGroups/rg/providers/Microsoft.ContainerService/managedClusters/{name}"),
            name: name.to_string(),
            kind: "aks".to_string(),
            kubernetes_version: version.map(str::to_string),
            location: None,
            workspace: workspace.map(|w| WorkspaceRef {
                id: format!("{w}-guid"),
                resource_id: format!("/subscriptions/s/resourceGroups/rg/providers/Microsoft.OperationalInsights/workspaces/{w}"),
            }),
            workspace_unavailable: false,
        }
    }

    fn monitored(name: &str, healthy_nodes: Option<u64>) -> GridRow {
        let row = MonitoredClusterQueryResponseResultRow {
            cluster_id: Some(name.to_string()),
            node_status: healthy_nodes.map(|h| {
                vec![
                    ResourceStatusObj::new("Green", h),
                    ResourceStatusObj::new("Red", 10 - h),
                ]
            }),
            user_pod_status: Some(vec![ResourceStatusObj::new("Green", 4)]),
            system_pod_status: Some(vec![ResourceStatusObj::new("Green", 4)]),
            response_status: ResponseStatus::Success,
            error_message: None,
            cluster_version: None,
        };
        MonitoredClusterMetaData::new(Some(&row), &cluster(name, None, Some("ws")))
            .unwrap()
            .format_monitored_cluster_row()
    }

    fn versioned(name: &str, version: &str) -> GridRow {
        MonitoredClusterMetaData::new(None, &cluster(name, Some(version), Some("ws")))
            .unwrap()
            .format_monitored_cluster_row()
    }

    fn names(rows: &[GridRow]) -> Vec<String> {
        rows.iter().map(|r| r.metadata().name().to_string()).collect()
    }

    fn props(column: GridColumn, direction: SortDirection) -> GridQueryProps {
        GridQueryProps {
            sort_column: column,
            sort_direction: direction,
        }
    }

    #[test]
    fn natural_name_comparison() {
        assert_eq!(compare_names("node2", "node10"), Ordering::Less);
        assert_eq!(compare_names("Alpha", "alpha"), Ordering::Equal);
        assert_eq!(compare_names("beta", "Alpha"), Ordering::Greater);
        assert_eq!(compare_names("a", "ab"), Ordering::Less);
        assert_eq!(compare_names("x007", "x7"), Ordering::Equal);
    }

    #[test]
    fn missing_value_sorts_last_in_both_directions() {
        let missing = monitored("a-missing", None);
        let known = monitored("z-known", Some(9));
        let column = GridColumn::Nodes;

        for direction in [SortDirection::Ascending, SortDirection::Descending] {
            let p = props(column, direction);
            assert_eq!(
                grid_sort_value(missing.cell(column), known.cell(column), &p),
                Ordering::Greater
            );
            assert_eq!(
                grid_sort_value(known.cell(column), missing.cell(column), &p),
                Ordering::Less
            );
        }
    }

    #[test]
    fn sort_rows_by_ratio() {
        let mut rows = vec![
            monitored("c", Some(5)),
            monitored("missing", None),
            monitored("a", Some(9)),
            monitored("b", Some(5)),
        ];

        sort_rows(&mut rows, &props(GridColumn::Nodes, SortDirection::Ascending));
        assert_eq!(names(&rows), ["b", "c", "a", "missing"]);

        sort_rows(&mut rows, &props(GridColumn::Nodes, SortDirection::Descending));
        assert_eq!(names(&rows), ["a", "c", "b", "missing"]);
    }

    #[test]
    fn sort_rows_by_status_puts_worst_first() {
        let mut rows = vec![
            monitored("healthy", Some(10)),
            monitored("critical", Some(2)),
            monitored("warning", Some(7)),
        ];
        sort_rows(&mut rows, &props(GridColumn::Status, SortDirection::Ascending));
        assert_eq!(names(&rows), ["critical", "warning", "healthy"]);
    }

    #[test]
    fn version_sort_compares_components_numerically() {
        let mut rows = vec![
            versioned("d", "1.9.0"),
            versioned("a", "1.10.2"),
            versioned("b", "1.10"),
            versioned("c", "Unknown"),
        ];
        sort_rows(&mut rows, &props(GridColumn::Version, SortDirection::Ascending));
        assert_eq!(names(&rows), ["d", "b", "a", "c"]);

        sort_rows(&mut rows, &props(GridColumn::Version, SortDirection::Descending));
        assert_eq!(names(&rows), ["a", "b", "d", "c"]);
    }

    #[test]
    fn equal_versions_tie_break_on_name() {
        let x = versioned("node10", "1.29.0");
        let y = versioned("node2", "1.29.0");
        let col = GridColumn::Version;
        assert_eq!(
            sort_cluster_version(x.cell(col), y.cell(col), &props(col, SortDirection::Ascending)),
            Ordering::Greater
        );
        assert_eq!(
            sort_cluster_version(x.cell(col), y.cell(col), &props(col, SortDirection::Descending)),
            Ordering::Less
        );
    }

    #[test]
    fn tally_buckets_statuses() {
        let monitored_rows = vec![
            monitored("h", Some(10)),
            monitored("w", Some(7)),
            monitored("c", Some(1)),
            monitored("u", None),
        ];
        let unmonitored_rows = vec![UnmonitoredClusterMetaData::new(&cluster("x", None, None))
            .format_unmonitored_cluster_row()];

        let summary = tally_cluster_statuses(&monitored_rows, &unmonitored_rows).unwrap();
        assert_eq!(
            summary,
            ClusterStatusSummary {
                total: 5,
                critical: 1,
                warning: 1,
                healthy: 1,
                unknown: 1,
                unmonitored: 1,
            }
        );
    }

    #[test]
    fn tally_rejects_unknown_status_value() {
        let mut row = monitored("h", Some(10));
        row.cells[GridColumn::Status.index()].value = CellValue::Number(42.0);
        let err = tally_cluster_statuses(&[row], &[]).unwrap_err();
        assert_eq!(err, HealthError::UnknownStatus(42));
    }

    #[test]
    fn filter_by_search_and_category() {
        let rows = vec![
            monitored("prod-east", Some(10)),
            monitored("prod-west", Some(1)),
            monitored("dev", Some(10)),
        ];
        let prod = filter_rows(&rows, "PROD", StatusCategory::All).unwrap();
        assert_eq!(names(&prod), ["prod-east", "prod-west"]);
        let healthy = filter_rows(&rows, "", StatusCategory::Healthy).unwrap();
        assert_eq!(names(&healthy), ["prod-east", "dev"]);
        let both = filter_rows(&rows, "prod", StatusCategory::Critical).unwrap();
        assert_eq!(names(&both), ["prod-west"]);
    }

    #[test]
    fn workspace_mapping_partitions_and_dedupes() {
        let mut gone = cluster("gone", None, Some("old"));
        gone.workspace_unavailable = true;
        let clusters = vec![
            cluster("a", None, Some("ws1")),
            cluster("b", None, Some("ws2")),
            cluster("a", None, Some("ws1")),
            cluster("c", None, Some("WS1")),
            cluster("none", None, None),
            gone,
        ];
        let mapping = workspace_to_monitored_clusters_mapping(&clusters);

        assert_eq!(mapping.accessible.len(), 2);
        assert_eq!(mapping.accessible[0].cluster_ids.len(), 2);
        assert!(mapping.accessible[0].cluster_ids[1].ends_with("/c"));
        assert_eq!(mapping.accessible[1].cluster_ids.len(), 1);
        assert_eq!(mapping.unavailable.len(), 1);
        assert!(mapping.unavailable[0].cluster_ids[0].ends_with("/gone"));
    }

    #[test]
    fn query_props_parse_with_defaults() {
        let p = GridQueryProps::parse(Some("user-pods"), Some("DESC")).unwrap();
        assert_eq!(p.sort_column, GridColumn::UserPods);
        assert_eq!(p.sort_direction, SortDirection::Descending);
        assert_eq!(GridQueryProps::parse(None, None).unwrap(), GridQueryProps::default());
        assert!(GridQueryProps::parse(Some("colour"), None).is_err());
    }

    #[test]
    fn icons_group_error_statuses() {
        assert_eq!(status_icon(HealthStatus::NotFound), StatusIcon::Error);
        assert_eq!(status_icon(HealthStatus::Critical), StatusIcon::Critical);
        assert_eq!(cluster_type_display(ClusterType::AksEngine), "AKS Engine");
    }
}
