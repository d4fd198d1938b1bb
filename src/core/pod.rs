use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodRecord {
    pub name: String,
    pub conditions: Vec<Condition>,
    pub containers: Vec<ContainerStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ContainerStatus {
    pub name: String,
    pub ready: bool,
    #[serde(rename = "restartCount")]
    pub restart_count: u32,
}

#[derive(Debug, Deserialize)]
struct RawList<T> {
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct RawMetadata {
    name: String,
}

#[derive(Debug, Deserialize)]
struct RawNamespace {
    metadata: RawMetadata,
}

#[derive(Debug, Deserialize)]
struct RawPod {
    metadata: RawMetadata,
    #[serde(default)]
    status: RawPodStatus,
}

// Pending pods may not have conditions or container statuses yet.
#[derive(Debug, Default, Deserialize)]
struct RawPodStatus {
    #[serde(default)]
    conditions: Vec<Condition>,
    #[serde(default, rename = "containerStatuses")]
    container_statuses: Vec<ContainerStatus>,
}

impl From<RawPod> for PodRecord {
    fn from(raw: RawPod) -> Self {
        Self {
            name: raw.metadata.name,
            conditions: raw.status.conditions,
            containers: raw.status.container_statuses,
        }
    }
}

/// Decodes a `PodList` document (`kubectl get pods -o json` or `/api/v1/namespaces/<ns>/pods`).
pub fn decode_pod_list(payload: &str) -> Result<Vec<PodRecord>> {
    let list: RawList<RawPod> =
        serde_json::from_str(payload).context("failed to decode pod list")?;
    Ok(list.items.into_iter().map(PodRecord::from).collect())
}

pub fn decode_namespace_list(payload: &str) -> Result<Vec<String>> {
    let list: RawList<RawNamespace> =
        serde_json::from_str(payload).context("failed to decode namespace list")?;
    Ok(list.items.into_iter().map(|ns| ns.metadata.name).collect())
}
