//! Managed-cluster inventory file.
//!
//! Accepts either a bare list of clusters or a `clusters:` mapping, in YAML
//! or JSON (JSON parses as YAML).

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::types::ManagedCluster;

#[derive(Deserialize)]
#[serde(untagged)]
enum InventoryFile {
    List(Vec<ManagedCluster>),
    Wrapped { clusters: Vec<ManagedCluster> },
}

pub fn parse(content: &str) -> Result<Vec<ManagedCluster>> {
    let file: InventoryFile = serde_yaml::from_str(content).context("parsing cluster inventory")?;
    Ok(match file {
        InventoryFile::List(clusters) | InventoryFile::Wrapped { clusters } => clusters,
    })
}

pub fn load(path: &Path) -> Result<Vec<ManagedCluster>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading inventory {}", path.display()))?;
    let clusters = parse(&content).with_context(|| format!("in {}", path.display()))?;
    tracing::debug!(path = %path.display(), clusters = clusters.len(), "loaded inventory");
    Ok(clusters)
}
