use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::dates::DateLike;

/// Activity tag for a disposal (waste) event
pub const WASTE_ACTIVITY: &str = "expFood";
/// Activity tag for a consumption event
pub const CONSUME_ACTIVITY: &str = "conFood";
/// The only note that turns a consumption into a save on the monthly chart
pub const FULLY_CONSUMED_NOTE: &str = "fully consumed";

/// One logged food activity, as stored in the activity log
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    #[serde(default, deserialize_with = "lenient_type")]
    pub activity_type: String,
    /// Kept loose: the front end sends numbers, numeric strings and junk alike.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Value>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateLike>,
}

impl Activity {
    pub fn is_waste(&self) -> bool {
        self.activity_type == WASTE_ACTIVITY
    }

    pub fn is_consumption(&self) -> bool {
        self.activity_type == CONSUME_ACTIVITY
    }

    /// Consumption annotated exactly "fully consumed"
    pub fn is_full_save(&self) -> bool {
        self.is_consumption() && self.note.as_deref() == Some(FULLY_CONSUMED_NOTE)
    }

    /// Numeric quantity, falling back to 1 for absent, zero or non-numeric values.
    pub fn quantity_or_default(&self) -> f64 {
        let parsed = match &self.quantity {
            Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
            Some(Value::Bool(true)) => 1.0,
            _ => 0.0,
        };

        if parsed == 0.0 || !parsed.is_finite() {
            1.0
        } else {
            parsed
        }
    }

    /// Category label, "Unknown" when absent or empty
    pub fn category_or_unknown(&self) -> &str {
        match self.category.as_deref() {
            Some(cat) if !cat.is_empty() => cat,
            _ => "Unknown",
        }
    }
}

// A mistyped field falls back to its default instead of losing the record.

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_type<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Uuid::parse_str(&s).ok(),
        _ => None,
    })
}

/// Activity input from API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityInput {
    pub activity_type: String,
    #[serde(default)]
    pub quantity: Option<Value>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateLike>,
}

impl ActivityInput {
    /// Stamp the input with a fresh id, defaulting `createdAt` to `now`
    pub fn into_activity(self, now: DateTime<Utc>) -> Activity {
        Activity {
            id: Some(Uuid::new_v4()),
            activity_type: self.activity_type.trim().to_string(),
            quantity: self.quantity,
            category: self.category,
            note: self.note,
            created_at: Some(self.created_at.unwrap_or(DateLike::Native(now))),
        }
    }
}

/// API Response
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub data: Option<Value>,
}

/// Query result
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub query: String,
    pub result_type: String,
    pub data: Value,
}

/// Labels plus one or more equally long numeric series
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: Vec<f64>,
    /// May be shorter than `data`; renderers supply their own fallback.
    #[serde(default)]
    pub background_color: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
}

/// Thick-ring presentation of a single series
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RingChart {
    pub labels: Vec<String>,
    pub data: Vec<f64>,
    pub background_color: Vec<String>,
    pub hover_background_color: Vec<String>,
    pub border_width: u32,
    pub border_radius: u32,
    pub cutout: String,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: String,
    pub value: f64,
    pub percentage: u32,
    pub color: String,
}

/// Label anchor in the ring's coordinate box
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct LabelPosition {
    pub x: f64,
    pub y: f64,
}

/// Everything the waste ring card needs in one payload
#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WasteRing {
    pub ring: RingChart,
    pub top_legend: Vec<LegendEntry>,
    pub legend: Vec<LegendEntry>,
    /// Parallel to `legend`
    pub label_positions: Vec<LabelPosition>,
    pub center_percentage: Option<u32>,
    /// One hover line per ring segment
    pub tooltips: Vec<String>,
}

/// Food item as held in the pantry
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub name: String,
    #[serde(default)]
    pub expiration_date: Option<DateLike>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryRequest {
    pub foods: Vec<FoodItem>,
    #[serde(default)]
    pub threshold_days: Option<i64>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExpiryStatus {
    pub name: String,
    pub expiration_date: String,
    pub days_remaining: Option<i64>,
    pub expired: bool,
    pub expiring_soon: bool,
}
