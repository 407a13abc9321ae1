//! Core types for the Phenomind analytics pipeline
//!
//! This module defines the records that cross the crate boundary: the patient
//! context and biomarker series consumed by the pipeline, the intermediate
//! trend and driver values, and the report documents produced at the end.

use serde::{Deserialize, Serialize};

/// Biomarker channel tracked in a patient's daily series
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sleep,
    Hrv,
    Activity,
    Mood,
}

impl Channel {
    /// All channels in enumeration order
    pub const ALL: [Channel; 4] = [Channel::Sleep, Channel::Hrv, Channel::Activity, Channel::Mood];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Sleep => "sleep",
            Channel::Hrv => "hrv",
            Channel::Activity => "activity",
            Channel::Mood => "mood",
        }
    }
}

/// One day's observation in a patient's biomarker series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Ordered day label (opaque, never parsed as a date)
    pub day: String,
    /// Self-reported mood score
    pub mood: f64,
    /// Sleep duration (hours)
    pub sleep: f64,
    /// Heart rate variability (ms)
    pub hrv: f64,
    /// Daily step count
    pub activity: f64,
}

impl TrendPoint {
    /// Value recorded for a channel
    pub fn value(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Sleep => self.sleep,
            Channel::Hrv => self.hrv,
            Channel::Activity => self.activity,
            Channel::Mood => self.mood,
        }
    }
}

/// Mean of each channel over the current window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Averages {
    pub sleep: f64,
    pub hrv: f64,
    pub activity: f64,
    pub mood: f64,
}

impl Averages {
    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Sleep => self.sleep,
            Channel::Hrv => self.hrv,
            Channel::Activity => self.activity,
            Channel::Mood => self.mood,
        }
    }
}

/// Current-window vs. prior-window comparison for one channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    pub current: f64,
    pub previous: f64,
    pub change: f64,
    pub percent_change: f64,
}

/// Per-channel trend summaries; a channel is absent when history is insufficient
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep: Option<TrendSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hrv: Option<TrendSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activity: Option<TrendSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood: Option<TrendSummary>,
}

impl TrendSet {
    pub fn get(&self, channel: Channel) -> Option<&TrendSummary> {
        match channel {
            Channel::Sleep => self.sleep.as_ref(),
            Channel::Hrv => self.hrv.as_ref(),
            Channel::Activity => self.activity.as_ref(),
            Channel::Mood => self.mood.as_ref(),
        }
    }

    pub fn set(&mut self, channel: Channel, summary: TrendSummary) {
        let slot = match channel {
            Channel::Sleep => &mut self.sleep,
            Channel::Hrv => &mut self.hrv,
            Channel::Activity => &mut self.activity,
            Channel::Mood => &mut self.mood,
        };
        *slot = Some(summary);
    }

    pub fn is_empty(&self) -> bool {
        Channel::ALL.iter().all(|c| self.get(*c).is_none())
    }
}

/// Direction of a biomarker change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increasing,
    Decreasing,
}

impl Direction {
    pub fn of(change: f64) -> Self {
        if change < 0.0 {
            Direction::Decreasing
        } else {
            Direction::Increasing
        }
    }
}

/// A channel identified as driving the patient's risk change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiomarkerDriver {
    /// Display label
    pub factor: String,
    pub channel: Channel,
    /// Normalized importance (0 - 0.85)
    pub importance: f64,
    pub direction: Direction,
    /// Raw change between windows
    pub change: f64,
    /// Absolute percentage change between windows
    pub percent_change: f64,
}

/// Wearable device baselines attached to a patient
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WearableBaselines {
    /// Personal HRV baseline (ms)
    #[serde(default)]
    pub hrv_baseline: Option<f64>,
    /// Daily step goal
    #[serde(default)]
    pub steps_goal: Option<u32>,
    /// Device-reported average daily steps
    #[serde(default)]
    pub steps_avg: Option<f64>,
}

/// Read-only clinical context for one patient
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientContext {
    /// Risk score (0-100)
    #[serde(default)]
    pub risk_score: Option<f64>,
    /// Short diagnosis code (e.g. "MDD", "GAD")
    #[serde(default)]
    pub disorder: String,
    /// Full diagnosis name
    #[serde(default)]
    pub disorder_full: String,
    #[serde(default)]
    pub wearable: Option<WearableBaselines>,
    #[serde(default)]
    pub medications: Vec<String>,
}

/// Recommendation category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationType {
    Risk,
    Sleep,
    Hrv,
    Activity,
    Disorder,
    Mood,
    Medication,
    Positive,
}

/// Recommendation priority; declaration order is the sort rank
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Critical => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }
}

/// A clinical recommendation emitted by the rule engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: RecommendationType,
    pub priority: Priority,
    pub message: String,
    pub reason: String,
    /// Opaque workflow code
    pub action: String,
}

impl Recommendation {
    pub fn new(
        kind: RecommendationType,
        priority: Priority,
        message: impl Into<String>,
        reason: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            priority,
            message: message.into(),
            reason: reason.into(),
            action: action.into(),
        }
    }
}

/// Patient analytics request: context plus chronologically ordered series
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsRequest {
    pub patient: PatientContext,
    #[serde(default)]
    pub series: Vec<TrendPoint>,
}

/// Unrounded result of a single-patient computation
#[derive(Debug, Clone, PartialEq)]
pub struct PatientAnalytics {
    pub risk_score: Option<f64>,
    /// Current-window averages; `None` when the series is empty
    pub averages: Option<Averages>,
    pub trends: TrendSet,
    pub recommendations: Vec<Recommendation>,
    pub biomarker_drivers: Vec<BiomarkerDriver>,
}

/// Encoded single-patient analytics document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub risk_score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub averages: Option<Averages>,
    pub trends: TrendSet,
    pub recommendations: Vec<Recommendation>,
    pub biomarker_drivers: Vec<BiomarkerDriver>,
}

/// Minimal patient record consumed by population analytics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationMember {
    #[serde(default)]
    pub risk_score: Option<f64>,
    #[serde(default)]
    pub disorder_full: String,
}

/// Patient counts per risk band
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub high: usize,
    pub moderate: usize,
    pub low: usize,
}

/// Cohort-level risk summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulationSummary {
    pub total_patients: usize,
    pub risk_distribution: RiskDistribution,
    pub average_risk_score: f64,
    pub high_risk_percentage: f64,
}

/// Risk-band counts for one disorder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisorderBreakdownEntry {
    pub disorder: String,
    pub total_patients: usize,
    pub high_risk: usize,
    pub moderate_risk: usize,
    pub low_risk: usize,
}

/// Descriptive statistics over present risk scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskStatistics {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

/// Complete population analytics document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationReport {
    pub summary: PopulationSummary,
    pub breakdown: Vec<DisorderBreakdownEntry>,
    pub statistics: Option<RiskStatistics>,
}

/// Producer metadata carried by a provenance envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// A report wrapped with producer and computation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvenancedReport<T> {
    pub producer: ReportProducer,
    /// RFC 3339 timestamp of the computation
    pub computed_at_utc: String,
    pub report: T,
}
