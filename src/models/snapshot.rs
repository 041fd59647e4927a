//! Extracted weather payload.

use serde::{Deserialize, Serialize};

/// Mis-encoded and correct forms of the Fahrenheit suffix on the current reading.
const DEGREE_ARTIFACTS: &[&str] = &["Â°F", "°F"];

/// Fields as pulled out of the DOM, before normalization.
///
/// Both the chromium extraction script and the static DOM extractor
/// produce this shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshot {
    #[serde(default)]
    pub weather_now_number: Option<String>,
    #[serde(default)]
    pub weather_now_description: Option<String>,
    #[serde(default)]
    pub sun: Option<String>,
    #[serde(default)]
    pub dw_into: Option<String>,
    #[serde(default)]
    pub days_vertical_tabs: Option<String>,
    #[serde(default)]
    pub icon_title: Option<String>,
    #[serde(default)]
    pub icon_html: Option<String>,
    #[serde(default)]
    pub panes: Vec<String>,
    #[serde(default)]
    pub sl_boxes: Vec<SlBox>,
}

/// One label/value pair from the `.sl-box` strip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlBox {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sl_item_txt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sl_item_all_txt: Option<String>,
}

/// Weather data for one city at one point in time.
///
/// Absent DOM elements become absent fields, never errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_now_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_now_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sun: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dw_into: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_vertical_tabs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_html: Option<String>,
    #[serde(default)]
    pub panes: Vec<String>,
    #[serde(default)]
    pub sl_boxes: Vec<SlBox>,
}

impl From<RawSnapshot> for WeatherSnapshot {
    fn from(raw: RawSnapshot) -> Self {
        Self {
            weather_now_number: raw.weather_now_number.map(|n| normalize_reading(&n)),
            weather_now_description: raw.weather_now_description,
            sun: raw.sun,
            dw_into: raw.dw_into,
            days_vertical_tabs: raw.days_vertical_tabs,
            icon_title: raw.icon_title,
            icon_html: raw.icon_html,
            panes: raw.panes,
            sl_boxes: raw.sl_boxes,
        }
    }
}

/// Strip the degree suffix (including its mojibake form) from a reading.
pub fn normalize_reading(reading: &str) -> String {
    let mut value = reading.trim().to_string();
    for artifact in DEGREE_ARTIFACTS {
        value = value.replace(artifact, "");
    }
    value.trim().to_string()
}

/// Trimmed markup with newlines removed, as reported for `*Html` fields.
pub fn flatten_markup(html: &str) -> String {
    html.trim().replace('\n', "")
}
