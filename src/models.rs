use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Per-person excess above this many hours is flagged as high severity.
pub const EXCESS_HOURS_PER_PERSON_THRESHOLD: f64 = 20.0;

pub const MIN_WEEK: i64 = 1;
pub const MAX_WEEK: i64 = 53;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialType {
    Cu,
    Al,
}

impl MaterialType {
    pub fn code(self) -> &'static str {
        match self {
            MaterialType::Cu => "CU",
            MaterialType::Al => "AL",
        }
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for MaterialType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CU" => Ok(MaterialType::Cu),
            "AL" => Ok(MaterialType::Al),
            other => Err(format!("unknown material type '{other}'")),
        }
    }
}

/// One row per material per week, as returned by the remote store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyRecord {
    pub id: i64,
    pub week_number: i64,
    pub material_type: String,
    pub productivity_target: f64,
    pub production_volume: i64,
    pub hours_need: f64,
    #[serde(rename = "mod")]
    pub mod_count: i64,
    pub hours_person_available: f64,
    pub excess_person_hours: f64,
    pub excess_hours_per_person: f64,
}

impl WeeklyRecord {
    pub fn material(&self) -> Option<MaterialType> {
        self.material_type.parse().ok()
    }

    pub fn is_high_excess(&self) -> bool {
        self.excess_hours_per_person > EXCESS_HOURS_PER_PERSON_THRESHOLD
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDraft {
    pub productivity_target: f64,
    pub production_volume: i64,
    #[serde(rename = "mod")]
    pub mod_count: i64,
}

/// Client-side draft of a week's plan, posted on create and put on update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyModFormData {
    pub week_number: i64,
    pub cu_data: MaterialDraft,
    pub al_data: MaterialDraft,
}

impl WeeklyModFormData {
    pub fn material_mut(&mut self, material: MaterialType) -> &mut MaterialDraft {
        match material {
            MaterialType::Cu => &mut self.cu_data,
            MaterialType::Al => &mut self.al_data,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub production_volume: i64,
    pub hours_need: f64,
    pub mod_count: i64,
    pub hours_person_available: f64,
    pub excess_person_hours: f64,
}

/// Success acknowledgement for create/update. The remote store does not
/// commit to a response shape, so only an optional message is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Acknowledgement {
    pub message: Option<String>,
}

impl Acknowledgement {
    pub fn from_body(body: Option<serde_json::Value>) -> Self {
        let message = match body {
            Some(serde_json::Value::String(text)) => Some(text),
            Some(serde_json::Value::Object(map)) => map
                .get("message")
                .and_then(|value| value.as_str())
                .map(str::to_string),
            _ => None,
        };
        Self { message }
    }
}
