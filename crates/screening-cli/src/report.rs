//! Screening report payload

use blink_screening::{ScreeningConfig, ScreeningResult};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// One screening session, ready to hand to storage or a response body
#[derive(Debug, Clone, Serialize)]
pub struct ScreeningReport {
    pub session_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    pub analyzed_at: DateTime<Utc>,
    /// Frame directory the session was read from
    pub source: String,
    pub source_fps: f64,
    pub frames_decoded: u64,
    pub frames_analyzed: u64,
    #[serde(flatten)]
    pub result: ScreeningResult,
    /// Effective processing parameters
    pub config: ScreeningConfig,
}

impl ScreeningReport {
    pub fn new(result: ScreeningResult, config: ScreeningConfig) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            patient_id: None,
            analyzed_at: Utc::now(),
            source: String::new(),
            source_fps: 0.0,
            frames_decoded: 0,
            frames_analyzed: 0,
            result,
            config,
        }
    }

    pub fn to_json(&self, pretty: bool) -> serde_json::Result<String> {
        if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blink_screening::ScreeningLabel;

    fn result() -> ScreeningResult {
        ScreeningResult {
            duration_sec: 30.0,
            blink_count: 4,
            blink_rate_bpm: 8.0,
            mean_ibi_sec: 6.5,
            max_ibi_sec: 11.0,
            max_eye_open_sec: 11.2,
            label: ScreeningLabel::DryEyeRisk,
        }
    }

    #[test]
    fn test_result_fields_are_top_level() {
        let report = ScreeningReport::new(result(), ScreeningConfig::default());
        let json: serde_json::Value = serde_json::from_str(&report.to_json(false).unwrap()).unwrap();

        assert_eq!(json["label"], "Dry Eye Risk");
        assert_eq!(json["blink_count"], 4);
        assert_eq!(json["max_ibi_sec"], 11.0);
        assert_eq!(json["config"]["refractory_ms"], 250);
        assert!(json.get("patient_id").is_none());
        assert!(json["session_id"].as_str().is_some());
    }

    #[test]
    fn test_patient_id_included_when_set() {
        let mut report = ScreeningReport::new(result(), ScreeningConfig::default());
        report.patient_id = Some("P-0042".into());
        let json: serde_json::Value = serde_json::from_str(&report.to_json(true).unwrap()).unwrap();
        assert_eq!(json["patient_id"], "P-0042");
    }
}
