//! Trigger models

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const RUNTIME_STATE_STARTED: &str = "Started";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerResource {
    #[serde(skip_serializing, default)]
    pub id: Option<String>,
    #[serde(skip_serializing, default)]
    pub name: Option<String>,
    pub properties: Trigger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Trigger {
    ScheduleTrigger(ScheduleTrigger),
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTrigger {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pipelines: Vec<TriggerPipelineReference>,
    /// `Started` or `Stopped`; changed only through start/stop
    #[serde(skip_serializing, default)]
    pub runtime_state: Option<String>,
    pub type_properties: ScheduleTriggerProperties,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerPipelineReference {
    pub pipeline_reference: PipelineReference,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineReference {
    #[serde(rename = "type")]
    pub reference_type: String,
    pub reference_name: String,
}

impl PipelineReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            reference_type: "PipelineReference".to_string(),
            reference_name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScheduleTriggerProperties {
    pub recurrence: ScheduleRecurrence,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRecurrence {
    pub frequency: String,
    pub interval: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<RecurrenceSchedule>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceSchedule {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub minutes: Vec<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hours: Vec<i64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub week_days: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub month_days: Vec<i64>,
}
