use serde::{Deserialize, Serialize};

use crate::extract::{NormalizedAction, ResourceRef};

// Field order is alphabetical; serde_json writes keys in declaration order.

#[derive(Debug, Clone, Serialize)]
pub struct ActionRecord {
    pub access_level: String,
    pub action: String,
    pub condition_keys: Vec<String>,
    pub dependent_actions: Vec<String>,
    pub description: String,
    pub permission_only: bool,
    pub resources: Vec<ResourceRef>,
}

impl From<NormalizedAction> for ActionRecord {
    fn from(action: NormalizedAction) -> Self {
        Self {
            access_level: action.access_level,
            action: action.action_name,
            condition_keys: action.condition_keys,
            dependent_actions: action.dependent_actions,
            description: action.description,
            permission_only: action.permission_only,
            resources: action.resources,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceDocument {
    pub actions: Vec<ActionRecord>,
    pub prefix: String,
    pub service: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceIndexEntry {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceIndexManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub index_url: String,
    pub service_count: usize,
    pub services: Vec<ServiceIndexEntry>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    Written,
    Extracted,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRunEntry {
    pub name: String,
    pub url: String,
    pub prefix: Option<String>,
    pub status: ServiceStatus,
    pub action_count: usize,
    pub tables_skipped: usize,
    pub artifact_path: Option<String>,
    pub sha256: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapeCounts {
    pub services_seen: usize,
    pub services_written: usize,
    pub services_failed: usize,
    pub actions_total: usize,
    pub tables_skipped: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub completed_at: String,
    pub index_url: String,
    pub output_dir: String,
    pub counts: ScrapeCounts,
    pub services: Vec<ServiceRunEntry>,
}
