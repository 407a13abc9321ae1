//! Report encoding
//!
//! This module turns computed analytics into the documents returned to
//! callers. Averages are rounded for display here and nowhere else; every
//! rule upstream works on unrounded values. Instance id and timestamp only
//! appear in the optional provenance envelope, so the bare report for a
//! given input is always byte-identical.

use crate::error::AnalyticsError;
use crate::types::{
    AnalyticsReport, Averages, PatientAnalytics, PopulationReport, ProvenancedReport,
    ReportProducer,
};
use crate::{PHENOMIND_VERSION, PRODUCER_NAME};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Display rounding: sleep and mood to one decimal, HRV and steps whole
pub fn round_averages(averages: &Averages) -> Averages {
    Averages {
        sleep: round_to(averages.sleep, 1),
        hrv: round_to(averages.hrv, 0),
        activity: round_to(averages.activity, 0),
        mood: round_to(averages.mood, 1),
    }
}

/// Encoder for analytics report documents
pub struct AnalyticsEncoder {
    instance_id: String,
}

impl Default for AnalyticsEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Build the patient report document
    pub fn encode(&self, analytics: &PatientAnalytics) -> AnalyticsReport {
        AnalyticsReport {
            risk_score: analytics.risk_score.unwrap_or(0.0),
            averages: analytics.averages.as_ref().map(round_averages),
            trends: analytics.trends,
            recommendations: analytics.recommendations.clone(),
            biomarker_drivers: analytics.biomarker_drivers.clone(),
        }
    }

    /// Encode a patient report to compact JSON
    pub fn encode_to_json(&self, analytics: &PatientAnalytics) -> Result<String, AnalyticsError> {
        to_json(&self.encode(analytics), false)
    }

    /// Encode a patient report to pretty JSON
    pub fn encode_to_json_pretty(
        &self,
        analytics: &PatientAnalytics,
    ) -> Result<String, AnalyticsError> {
        to_json(&self.encode(analytics), true)
    }

    /// Encode a population report to JSON
    pub fn encode_population(
        &self,
        report: &PopulationReport,
        pretty: bool,
    ) -> Result<String, AnalyticsError> {
        to_json(report, pretty)
    }

    /// Wrap a patient report with producer metadata and computation time
    pub fn encode_with_provenance(
        &self,
        analytics: &PatientAnalytics,
    ) -> ProvenancedReport<AnalyticsReport> {
        self.wrap(self.encode(analytics))
    }

    /// Wrap any report document in a provenance envelope
    pub fn wrap<T: Serialize>(&self, report: T) -> ProvenancedReport<T> {
        ProvenancedReport {
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: PHENOMIND_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            report,
        }
    }
}

/// Serialize any report document
pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String, AnalyticsError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.map_err(|e| AnalyticsError::EncodingError(e.to_string()))
}
