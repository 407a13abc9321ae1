//! Analytics configuration
//!
//! Every clinical threshold used by the pipeline lives here as an immutable
//! value handed to the components at construction. All structs deserialize
//! with `#[serde(default)]`, so a JSON document only needs to name the values
//! it overrides.

use crate::error::AnalyticsError;
use serde::{Deserialize, Deserializer, Serialize};

/// Default current-window length in days
pub const DEFAULT_WINDOW_DAYS: usize = 7;

/// Default number of points required before trends are computed
pub const DEFAULT_MIN_TREND_POINTS: usize = 14;

/// Default number of recommendations returned per patient
pub const DEFAULT_MAX_RECOMMENDATIONS: usize = 6;

/// Top-level configuration for a patient or population computation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub trend: TrendConfig,
    pub drivers: DriverConfig,
    pub engine: EngineConfig,
}

impl AnalyticsConfig {
    /// Load configuration from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, AnalyticsError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to pretty JSON
    pub fn to_json(&self) -> Result<String, AnalyticsError> {
        serde_json::to_string_pretty(self).map_err(AnalyticsError::JsonError)
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        let result = self.check();
        if let Err(ref e) = result {
            tracing::warn!(error = %e, "rejected analytics configuration");
        }
        result
    }

    fn check(&self) -> Result<(), AnalyticsError> {
        if self.trend.window_days == 0 {
            return Err(AnalyticsError::InvalidConfig(
                "trend.window_days must be at least 1".to_string(),
            ));
        }
        if self.trend.min_trend_points < self.trend.window_days * 2 {
            return Err(AnalyticsError::InvalidConfig(format!(
                "trend.min_trend_points ({}) must cover two windows of {} days",
                self.trend.min_trend_points, self.trend.window_days
            )));
        }
        if self.engine.max_recommendations == 0 {
            return Err(AnalyticsError::InvalidConfig(
                "engine.max_recommendations must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.drivers.importance_cap) {
            return Err(AnalyticsError::InvalidConfig(format!(
                "drivers.importance_cap ({}) must be within 0-1",
                self.drivers.importance_cap
            )));
        }

        let values = [
            ("drivers.sleep.severe_change", self.drivers.sleep.severe_change),
            ("drivers.sleep.moderate_change", self.drivers.sleep.moderate_change),
            ("drivers.hrv.severe_change", self.drivers.hrv.severe_change),
            ("drivers.hrv.moderate_change", self.drivers.hrv.moderate_change),
            ("drivers.activity.severe_change", self.drivers.activity.severe_change),
            ("drivers.activity.moderate_change", self.drivers.activity.moderate_change),
            ("engine.sleep.critical_hours", self.engine.sleep.critical_hours),
            ("engine.sleep.low_hours", self.engine.sleep.low_hours),
            ("engine.sleep.optimal_min_hours", self.engine.sleep.optimal_min_hours),
            ("engine.sleep.optimal_max_hours", self.engine.sleep.optimal_max_hours),
            ("engine.hrv.severe_ratio", self.engine.hrv.severe_ratio),
            ("engine.hrv.moderate_ratio", self.engine.hrv.moderate_ratio),
            ("engine.activity.severe_ratio", self.engine.activity.severe_ratio),
            ("engine.activity.moderate_ratio", self.engine.activity.moderate_ratio),
            ("engine.activity.hyperactive_ratio", self.engine.activity.hyperactive_ratio),
            ("engine.risk.critical", self.engine.risk.critical),
            ("engine.risk.high", self.engine.risk.high),
            ("engine.risk.moderate", self.engine.risk.moderate),
            ("engine.mood_variability.high_pct", self.engine.mood_variability.high_pct),
            ("engine.mood_variability.moderate_pct", self.engine.mood_variability.moderate_pct),
            (
                "engine.medication.adherence_sleep_pct",
                self.engine.medication.adherence_sleep_pct,
            ),
            (
                "engine.medication.lithium_activity_ratio",
                self.engine.medication.lithium_activity_ratio,
            ),
            ("engine.positive_activity_ratio", self.engine.positive_activity_ratio),
            ("engine.defaults.hrv_baseline_ms", self.engine.defaults.hrv_baseline_ms),
        ];
        let channels = [
            ("drivers.sleep", &self.drivers.sleep),
            ("drivers.hrv", &self.drivers.hrv),
            ("drivers.activity", &self.drivers.activity),
        ];
        let weightings = channels.into_iter().flat_map(|(prefix, w)| {
            [
                ("severe_multiplier", w.severe_multiplier),
                ("moderate_multiplier", w.moderate_multiplier),
                ("fallback_importance", w.fallback_importance),
            ]
            .map(|(field, value)| (format!("{prefix}.{field}"), value))
        });
        let disorder = self
            .engine
            .disorder
            .named_values()
            .map(|(field, value)| (format!("engine.disorder.{field}"), value));

        let named = values
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .chain(weightings)
            .chain(disorder);
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(AnalyticsError::InvalidConfig(format!(
                    "{name} must be a finite non-negative number, got {value}"
                )));
            }
        }

        if self.engine.risk.high > self.engine.risk.critical {
            return Err(AnalyticsError::InvalidConfig(
                "engine.risk.high must not exceed engine.risk.critical".to_string(),
            ));
        }
        Ok(())
    }
}

/// Trend window configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// Length of the current and previous windows (days)
    pub window_days: usize,
    /// Series length required before any trend is reported
    pub min_trend_points: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            window_days: DEFAULT_WINDOW_DAYS,
            min_trend_points: DEFAULT_MIN_TREND_POINTS,
        }
    }
}

/// Severity tiers and emission gate for one driver channel
///
/// Each channel has its own defaults, so a partial override is merged over
/// the defaults of the channel it names (see [`DriverConfig`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChannelWeighting {
    /// |change| above which the severe multiplier applies
    pub severe_change: f64,
    pub severe_multiplier: f64,
    /// |change| above which the moderate multiplier applies
    pub moderate_change: f64,
    pub moderate_multiplier: f64,
    /// The channel emits a driver only when its change is below this value
    pub decline_gate: f64,
    /// Importance used when no weighted change is available
    pub fallback_importance: f64,
}

impl ChannelWeighting {
    pub const SLEEP: Self = Self {
        severe_change: 2.0,
        severe_multiplier: 1.5,
        moderate_change: 1.0,
        moderate_multiplier: 1.2,
        decline_gate: -0.5,
        fallback_importance: 0.38,
    };

    pub const HRV: Self = Self {
        severe_change: 10.0,
        severe_multiplier: 1.4,
        moderate_change: 5.0,
        moderate_multiplier: 1.2,
        decline_gate: -2.0,
        fallback_importance: 0.29,
    };

    pub const ACTIVITY: Self = Self {
        severe_change: 3000.0,
        severe_multiplier: 1.3,
        moderate_change: 1500.0,
        moderate_multiplier: 1.15,
        decline_gate: -500.0,
        fallback_importance: 0.21,
    };

    /// Severity multiplier for an absolute change
    pub fn multiplier(&self, abs_change: f64) -> f64 {
        if abs_change > self.severe_change {
            self.severe_multiplier
        } else if abs_change > self.moderate_change {
            self.moderate_multiplier
        } else {
            1.0
        }
    }
}

/// Fields of a channel weighting present in a JSON override
#[derive(Debug, Default, Deserialize)]
struct ChannelOverride {
    severe_change: Option<f64>,
    severe_multiplier: Option<f64>,
    moderate_change: Option<f64>,
    moderate_multiplier: Option<f64>,
    decline_gate: Option<f64>,
    fallback_importance: Option<f64>,
}

impl ChannelOverride {
    fn merge_over(self, base: ChannelWeighting) -> ChannelWeighting {
        ChannelWeighting {
            severe_change: self.severe_change.unwrap_or(base.severe_change),
            severe_multiplier: self.severe_multiplier.unwrap_or(base.severe_multiplier),
            moderate_change: self.moderate_change.unwrap_or(base.moderate_change),
            moderate_multiplier: self.moderate_multiplier.unwrap_or(base.moderate_multiplier),
            decline_gate: self.decline_gate.unwrap_or(base.decline_gate),
            fallback_importance: self.fallback_importance.unwrap_or(base.fallback_importance),
        }
    }
}

fn sleep_weighting<'de, D: Deserializer<'de>>(d: D) -> Result<ChannelWeighting, D::Error> {
    ChannelOverride::deserialize(d).map(|o| o.merge_over(ChannelWeighting::SLEEP))
}

fn hrv_weighting<'de, D: Deserializer<'de>>(d: D) -> Result<ChannelWeighting, D::Error> {
    ChannelOverride::deserialize(d).map(|o| o.merge_over(ChannelWeighting::HRV))
}

fn activity_weighting<'de, D: Deserializer<'de>>(d: D) -> Result<ChannelWeighting, D::Error> {
    ChannelOverride::deserialize(d).map(|o| o.merge_over(ChannelWeighting::ACTIVITY))
}

/// Driver weighting configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    #[serde(deserialize_with = "sleep_weighting")]
    pub sleep: ChannelWeighting,
    #[serde(deserialize_with = "hrv_weighting")]
    pub hrv: ChannelWeighting,
    #[serde(deserialize_with = "activity_weighting")]
    pub activity: ChannelWeighting,
    /// Upper bound on any single driver's importance
    pub importance_cap: f64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            sleep: ChannelWeighting::SLEEP,
            hrv: ChannelWeighting::HRV,
            activity: ChannelWeighting::ACTIVITY,
            importance_cap: 0.85,
        }
    }
}

/// Sleep thresholds (hours)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SleepThresholds {
    pub critical_hours: f64,
    pub low_hours: f64,
    pub optimal_min_hours: f64,
    pub optimal_max_hours: f64,
}

impl Default for SleepThresholds {
    fn default() -> Self {
        Self {
            critical_hours: 6.0,
            low_hours: 7.0,
            optimal_min_hours: 7.0,
            optimal_max_hours: 9.0,
        }
    }
}

/// HRV thresholds as fractions of the personal baseline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HrvThresholds {
    pub severe_ratio: f64,
    pub moderate_ratio: f64,
}

impl Default for HrvThresholds {
    fn default() -> Self {
        Self {
            severe_ratio: 0.75,
            moderate_ratio: 0.90,
        }
    }
}

/// Activity thresholds as fractions of the step goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityThresholds {
    pub severe_ratio: f64,
    pub moderate_ratio: f64,
    /// Above this fraction of goal a bipolar patient is flagged for mania
    pub hyperactive_ratio: f64,
}

impl Default for ActivityThresholds {
    fn default() -> Self {
        Self {
            severe_ratio: 0.50,
            moderate_ratio: 0.70,
            hyperactive_ratio: 1.30,
        }
    }
}

/// Risk score thresholds (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub critical: f64,
    pub high: f64,
    pub moderate: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            critical: 75.0,
            high: 66.0,
            moderate: 33.0,
        }
    }
}

/// Mood trend variability thresholds (absolute percent change)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoodVariabilityThresholds {
    pub high_pct: f64,
    pub moderate_pct: f64,
}

impl Default for MoodVariabilityThresholds {
    fn default() -> Self {
        Self {
            high_pct: 25.0,
            moderate_pct: 20.0,
        }
    }
}

/// Thresholds used by the disorder-specific rule sets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisorderThresholds {
    pub bipolar_sleep_hours: f64,
    pub bipolar_activity_ratio: f64,
    pub mdd_sleep_hours: f64,
    pub mdd_activity_ratio: f64,
    /// Mood change (points) below which MDD treatment is intensified
    pub mdd_mood_decline: f64,
    pub ptsd_sleep_hours: f64,
    pub ptsd_hrv_ratio: f64,
    pub anxiety_hrv_ratio: f64,
    pub anxiety_sleep_hours: f64,
    pub ocd_risk: f64,
    pub schizophrenia_sleep_min_hours: f64,
    pub schizophrenia_sleep_max_hours: f64,
    pub schizophrenia_activity_ratio: f64,
    pub bpd_risk: f64,
    pub substance_sleep_hours: f64,
    pub substance_activity_ratio: f64,
}

impl DisorderThresholds {
    fn named_values(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("bipolar_sleep_hours", self.bipolar_sleep_hours),
            ("bipolar_activity_ratio", self.bipolar_activity_ratio),
            ("mdd_sleep_hours", self.mdd_sleep_hours),
            ("mdd_activity_ratio", self.mdd_activity_ratio),
            ("ptsd_sleep_hours", self.ptsd_sleep_hours),
            ("ptsd_hrv_ratio", self.ptsd_hrv_ratio),
            ("anxiety_hrv_ratio", self.anxiety_hrv_ratio),
            ("anxiety_sleep_hours", self.anxiety_sleep_hours),
            ("ocd_risk", self.ocd_risk),
            ("schizophrenia_sleep_min_hours", self.schizophrenia_sleep_min_hours),
            ("schizophrenia_sleep_max_hours", self.schizophrenia_sleep_max_hours),
            ("schizophrenia_activity_ratio", self.schizophrenia_activity_ratio),
            ("bpd_risk", self.bpd_risk),
            ("substance_sleep_hours", self.substance_sleep_hours),
            ("substance_activity_ratio", self.substance_activity_ratio),
        ]
        .into_iter()
    }
}

impl Default for DisorderThresholds {
    fn default() -> Self {
        Self {
            bipolar_sleep_hours: 6.5,
            bipolar_activity_ratio: 1.2,
            mdd_sleep_hours: 7.0,
            mdd_activity_ratio: 0.7,
            mdd_mood_decline: -5.0,
            ptsd_sleep_hours: 6.5,
            ptsd_hrv_ratio: 0.85,
            anxiety_hrv_ratio: 0.9,
            anxiety_sleep_hours: 7.0,
            ocd_risk: 55.0,
            schizophrenia_sleep_min_hours: 6.0,
            schizophrenia_sleep_max_hours: 10.0,
            schizophrenia_activity_ratio: 0.6,
            bpd_risk: 60.0,
            substance_sleep_hours: 6.5,
            substance_activity_ratio: 0.7,
        }
    }
}

/// Medication monitoring thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicationThresholds {
    /// Absolute sleep percent change that triggers an adherence check
    pub adherence_sleep_pct: f64,
    pub lithium_activity_ratio: f64,
}

impl Default for MedicationThresholds {
    fn default() -> Self {
        Self {
            adherence_sleep_pct: 15.0,
            lithium_activity_ratio: 1.3,
        }
    }
}

/// Fallback wearable baselines when a device omits a value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WearableDefaults {
    pub hrv_baseline_ms: f64,
    pub steps_goal: u32,
}

impl Default for WearableDefaults {
    fn default() -> Self {
        Self {
            hrv_baseline_ms: 50.0,
            steps_goal: 10_000,
        }
    }
}

/// Recommendation engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sleep: SleepThresholds,
    pub hrv: HrvThresholds,
    pub activity: ActivityThresholds,
    pub risk: RiskThresholds,
    pub mood_variability: MoodVariabilityThresholds,
    pub disorder: DisorderThresholds,
    pub medication: MedicationThresholds,
    /// Fraction of step goal that earns positive reinforcement
    pub positive_activity_ratio: f64,
    pub defaults: WearableDefaults,
    pub max_recommendations: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sleep: SleepThresholds::default(),
            hrv: HrvThresholds::default(),
            activity: ActivityThresholds::default(),
            risk: RiskThresholds::default(),
            mood_variability: MoodVariabilityThresholds::default(),
            disorder: DisorderThresholds::default(),
            medication: MedicationThresholds::default(),
            positive_activity_ratio: 0.9,
            defaults: WearableDefaults::default(),
            max_recommendations: DEFAULT_MAX_RECOMMENDATIONS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AnalyticsConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_overrides_only_named_values() {
        let config = AnalyticsConfig::from_json(
            r#"{ "engine": { "risk": { "critical": 80 }, "max_recommendations": 3 } }"#,
        )
        .unwrap();

        assert_eq!(config.engine.risk.critical, 80.0);
        assert_eq!(config.engine.risk.high, 66.0);
        assert_eq!(config.engine.max_recommendations, 3);
        assert_eq!(config.trend, TrendConfig::default());
        assert_eq!(config.drivers, DriverConfig::default());
    }

    #[test]
    fn test_config_round_trip() {
        let config = AnalyticsConfig::default();
        let json = config.to_json().unwrap();
        let loaded = AnalyticsConfig::from_json(&json).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_rejects_zero_recommendation_cap() {
        let result = AnalyticsConfig::from_json(r#"{ "engine": { "max_recommendations": 0 } }"#);
        assert!(matches!(result, Err(AnalyticsError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_short_trend_gate() {
        let result = AnalyticsConfig::from_json(
            r#"{ "trend": { "window_days": 7, "min_trend_points": 10 } }"#,
        );
        assert!(matches!(result, Err(AnalyticsError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_negative_threshold() {
        let result =
            AnalyticsConfig::from_json(r#"{ "engine": { "sleep": { "low_hours": -1 } } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_partial_channel_override_keeps_channel_defaults() {
        let config = AnalyticsConfig::from_json(
            r#"{
                "drivers": {
                    "sleep": { "decline_gate": -1.0 },
                    "activity": { "severe_multiplier": 2.0 }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.drivers.sleep,
            ChannelWeighting {
                decline_gate: -1.0,
                ..ChannelWeighting::SLEEP
            }
        );
        assert_eq!(config.drivers.hrv, ChannelWeighting::HRV);
        assert_eq!(config.drivers.activity.severe_multiplier, 2.0);
        assert_eq!(config.drivers.activity.severe_change, 3000.0);
    }

    #[test]
    fn test_rejects_negative_weighting_and_disorder_values() {
        let result = AnalyticsConfig::from_json(
            r#"{ "drivers": { "hrv": { "severe_multiplier": -1.4 } } }"#,
        );
        match result {
            Err(AnalyticsError::InvalidConfig(msg)) => {
                assert!(msg.contains("drivers.hrv.severe_multiplier"), "{msg}")
            }
            other => panic!("expected InvalidConfig, got {other:?}"),
        }

        let result =
            AnalyticsConfig::from_json(r#"{ "engine": { "disorder": { "ocd_risk": -55 } } }"#);
        match result {
            Err(AnalyticsError::InvalidConfig(msg)) => {
                assert!(msg.contains("engine.disorder.ocd_risk"), "{msg}")
            }
            other => panic!("expected InvalidConfig, got {other:?}"),
        }

        let result =
            AnalyticsConfig::from_json(r#"{ "engine": { "positive_activity_ratio": -0.9 } }"#);
        assert!(matches!(result, Err(AnalyticsError::InvalidConfig(_))));
    }

    #[test]
    fn test_severity_multiplier_tiers() {
        let sleep = DriverConfig::default().sleep;
        assert_eq!(sleep.multiplier(2.5), 1.5);
        assert_eq!(sleep.multiplier(2.0), 1.2);
        assert_eq!(sleep.multiplier(1.5), 1.2);
        assert_eq!(sleep.multiplier(1.0), 1.0);
        assert_eq!(sleep.multiplier(0.2), 1.0);
    }
}
