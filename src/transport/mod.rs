pub mod frame;
pub mod status;
pub mod video;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One fetched `/status` document. Parsed tolerantly: known fields default
/// when absent and unknown fields are ignored, so backend additions never
/// break the monitor.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StatusSnapshot {
    /// Raw controller link flag, before debouncing.
    #[serde(default)]
    pub opcua_connected: bool,
    /// Whether the backend is currently running the detection pipeline.
    #[serde(default)]
    pub detection_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_status: Option<String>, // "active" | "initializing"
    /// Most recent detection document, forwarded verbatim to the panel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_detection: Option<Value>,
}

/// Typed view of the detection payload. The payload itself travels as raw
/// JSON; this view is what the counter display renders from. Counters are
/// backend running totals and are shown as-is, never accumulated here.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DetectionSummary {
    /// Product seen in the frame.
    #[serde(default, rename = "pizza")]
    pub product_present: bool,
    /// Blister insert seen on the product.
    #[serde(default, rename = "blister")]
    pub insert_present: bool,
    #[serde(default, rename = "conf_pizza")]
    pub product_confidence: f64,
    #[serde(default, rename = "conf_blister")]
    pub insert_confidence: f64,
    #[serde(default, rename = "counter_sin_blister")]
    pub missing_insert_total: u64,
    #[serde(default, rename = "counter_con_blister")]
    pub with_insert_total: u64,
    #[serde(default, rename = "counter_total")]
    pub inspected_total: u64,
    #[serde(default, rename = "porcentaje_sin_blister")]
    pub missing_insert_pct: f64,
    #[serde(default, rename = "porcentaje_con_blister")]
    pub with_insert_pct: f64,
    /// Backend wall clock of the detection, as formatted by the station.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl DetectionSummary {
    /// Parse a verbatim payload into the display view. Absent fields
    /// default; a payload that is not a detection object is an error and
    /// the caller keeps whatever it was showing.
    pub fn from_payload(payload: &Value) -> Result<Self> {
        serde_json::from_value(payload.clone()).context("detection payload has an unexpected shape")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snapshot_defaults_when_fields_are_absent() {
        let snapshot: StatusSnapshot = serde_json::from_str("{}").unwrap();
        assert!(!snapshot.opcua_connected);
        assert!(!snapshot.detection_enabled);
        assert!(snapshot.system_status.is_none());
        assert!(snapshot.last_detection.is_none());
    }

    #[test]
    fn snapshot_keeps_the_detection_payload_verbatim() {
        let payload = json!({
            "pizza": true,
            "counter_total": 12,
            "plc_ack": {"bit0": true},
        });
        let document = json!({
            "opcua_connected": true,
            "system_status": "active",
            "last_detection": payload,
        });

        let snapshot: StatusSnapshot = serde_json::from_value(document).unwrap();
        assert!(snapshot.opcua_connected);
        assert_eq!(snapshot.system_status.as_deref(), Some("active"));
        assert_eq!(snapshot.last_detection, Some(payload));
    }

    #[test]
    fn summary_maps_the_station_wire_keys() {
        let payload = json!({
            "pizza": true,
            "blister": false,
            "conf_pizza": 0.97,
            "conf_blister": 0.12,
            "counter_sin_blister": 4,
            "counter_con_blister": 38,
            "counter_total": 42,
            "porcentaje_sin_blister": 9.5,
            "porcentaje_con_blister": 90.5,
            "timestamp": "2024-03-11 14:02:55",
        });

        let summary = DetectionSummary::from_payload(&payload).unwrap();
        assert!(summary.product_present);
        assert!(!summary.insert_present);
        assert_eq!(summary.missing_insert_total, 4);
        assert_eq!(summary.with_insert_total, 38);
        assert_eq!(summary.inspected_total, 42);
        assert_eq!(summary.timestamp.as_deref(), Some("2024-03-11 14:02:55"));
    }

    #[test]
    fn summary_defaults_missing_fields() {
        let summary = DetectionSummary::from_payload(&json!({"counter_total": 7})).unwrap();
        assert_eq!(summary.inspected_total, 7);
        assert_eq!(summary.missing_insert_total, 0);
        assert!(!summary.product_present);
        assert!(summary.timestamp.is_none());
    }

    #[test]
    fn summary_rejects_non_object_payloads() {
        assert!(DetectionSummary::from_payload(&json!("not a detection")).is_err());
        assert!(DetectionSummary::from_payload(&json!([1, 2, 3])).is_err());
    }
}
