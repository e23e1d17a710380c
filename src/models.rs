use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SCHEMA_VERSION: u32 = 1;
pub const START_DATE_KEY: &str = "startDate";

/// Durable fact that a task was marked done. Only ever stored with `completed = true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCompletionRecord {
    pub id: String,
    pub completed: bool,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingRecord {
    pub key: String,
    pub value: serde_json::Value,
}

/// On-disk document holding both collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default = "schema_version")]
    pub version: u32,
    #[serde(default)]
    pub progress: BTreeMap<String, TaskCompletionRecord>,
    #[serde(default)]
    pub settings: BTreeMap<String, SettingRecord>,
}

impl Default for StoreData {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            progress: BTreeMap::new(),
            settings: BTreeMap::new(),
        }
    }
}

fn schema_version() -> u32 {
    SCHEMA_VERSION
}

#[derive(Debug, Deserialize)]
pub struct ToggleRequest {
    pub task_id: String,
    pub completed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub task_id: String,
    pub completed: bool,
    pub stats: StatsResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub completion_rate: u32,
    pub current_day: u32,
    pub days_left: u32,
    pub progress_percentage: String,
    pub progress_text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StartDateResponse {
    pub start_date: Option<serde_json::Value>,
}
