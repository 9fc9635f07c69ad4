//! Threshold-based health roll-ups for nodes, pods, and whole clusters.

use crate::error::HealthError;

use super::types::{HealthStatus, ResponseStatus};

const NODE_HEALTHY_ABOVE: f64 = 0.85;
const NODE_WARNING_ABOVE: f64 = 0.6;
const USER_POD_WARNING_FROM: f64 = 0.9;

fn check_ratio(ratio: f64) -> Result<f64, HealthError> {
    if (0.0..=1.0).contains(&ratio) {
        Ok(ratio)
    } else {
        Err(HealthError::RatioOutOfRange(ratio))
    }
}

/// Healthy above 85% ready nodes, Warning above 60%, Critical otherwise.
pub fn node_overall_health(ratio: f64) -> Result<HealthStatus, HealthError> {
    let ratio = check_ratio(ratio)?;
    Ok(if ratio > NODE_HEALTHY_ABOVE {
        HealthStatus::Healthy
    } else if ratio > NODE_WARNING_ABOVE {
        HealthStatus::Warning
    } else {
        HealthStatus::Critical
    })
}

/// Healthy only when every user pod is healthy; Warning from 90%.
pub fn user_pod_overall_health(ratio: f64) -> Result<HealthStatus, HealthError> {
    let ratio = check_ratio(ratio)?;
    Ok(if ratio == 1.0 {
        HealthStatus::Healthy
    } else if ratio >= USER_POD_WARNING_FROM {
        HealthStatus::Warning
    } else {
        HealthStatus::Critical
    })
}

/// System pods have no warning tier.
pub fn system_pod_overall_health(ratio: f64) -> Result<HealthStatus, HealthError> {
    let ratio = check_ratio(ratio)?;
    Ok(if ratio == 1.0 {
        HealthStatus::Healthy
    } else {
        HealthStatus::Critical
    })
}

/// Roll the three per-resource healths up into one cluster status.
///
/// A failed query outcome overrides the resource healths entirely.
pub fn cluster_health(
    node_health: HealthStatus,
    pod_health: HealthStatus,
    system_pod_health: HealthStatus,
    response_status: Option<ResponseStatus>,
) -> HealthStatus {
    if let Some(status) = response_status {
        if status != ResponseStatus::Success {
            return match status {
                ResponseStatus::Unauthorized => HealthStatus::UnAuthorized,
                ResponseStatus::Error => HealthStatus::Error,
                ResponseStatus::Misconfigured => HealthStatus::MisConfigured,
                ResponseStatus::NoData => HealthStatus::NoData,
                ResponseStatus::NotFound => HealthStatus::NotFound,
                _ => HealthStatus::Unknown,
            };
        }
    }

    let healths = [node_health, pod_health, system_pod_health];
    if healths.contains(&HealthStatus::Unknown) {
        return HealthStatus::Unknown;
    }
    healths
        .into_iter()
        .min()
        .unwrap_or(HealthStatus::Unknown)
}
