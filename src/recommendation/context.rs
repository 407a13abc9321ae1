//! Clinical context for rule evaluation
//!
//! A `ClinicalContext` is built once per request. It classifies the patient's
//! diagnosis, selects the disorder rule set for that category and resolves
//! wearable baselines against configured defaults, so no stage has to repeat
//! that work.

use crate::config::WearableDefaults;
use crate::disorder::DisorderCategory;
use crate::recommendation::disorder_rules::{rules_for, DisorderRules};
use crate::types::{Averages, PatientContext, TrendSet};

/// Wearable baselines with defaults applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedWearable {
    /// Personal HRV baseline (ms)
    pub hrv_baseline: f64,
    /// Daily step goal
    pub steps_goal: u32,
    /// Device-reported average daily steps, when available
    pub steps_avg: Option<f64>,
}

impl ResolvedWearable {
    pub fn steps_goal_f64(&self) -> f64 {
        f64::from(self.steps_goal)
    }
}

/// Patient context with its disorder category and rule set resolved
pub struct ClinicalContext<'a> {
    patient: &'a PatientContext,
    category: DisorderCategory,
    rules: &'static dyn DisorderRules,
    wearable: Option<ResolvedWearable>,
    default_steps_goal: u32,
}

impl<'a> ClinicalContext<'a> {
    pub fn new(patient: &'a PatientContext, defaults: &WearableDefaults) -> Self {
        let category = DisorderCategory::classify(&patient.disorder, &patient.disorder_full);
        let wearable = patient.wearable.as_ref().map(|w| ResolvedWearable {
            hrv_baseline: w.hrv_baseline.unwrap_or(defaults.hrv_baseline_ms),
            steps_goal: w.steps_goal.unwrap_or(defaults.steps_goal),
            steps_avg: w.steps_avg,
        });

        Self {
            patient,
            category,
            rules: rules_for(category),
            wearable,
            default_steps_goal: defaults.steps_goal,
        }
    }

    pub fn patient(&self) -> &PatientContext {
        self.patient
    }

    pub fn category(&self) -> DisorderCategory {
        self.category
    }

    pub fn rules(&self) -> &'static dyn DisorderRules {
        self.rules
    }

    /// Wearable baselines; `None` when no device is attached
    pub fn wearable(&self) -> Option<&ResolvedWearable> {
        self.wearable.as_ref()
    }

    pub fn risk_score(&self) -> Option<f64> {
        self.patient.risk_score
    }

    /// Step goal from the wearable, or the configured default without one
    pub fn steps_goal(&self) -> f64 {
        f64::from(
            self.wearable
                .map(|w| w.steps_goal)
                .unwrap_or(self.default_steps_goal),
        )
    }

    /// Whether any medication entry mentions lithium
    pub fn takes_lithium(&self) -> bool {
        self.patient
            .medications
            .iter()
            .any(|m| m.to_lowercase().contains("lithium"))
    }
}

/// Biomarker values every stage evaluates
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub averages: &'a Averages,
    pub trends: &'a TrendSet,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WearableBaselines;

    #[test]
    fn test_wearable_defaults_applied() {
        let patient = PatientContext {
            wearable: Some(WearableBaselines {
                hrv_baseline: None,
                steps_goal: Some(8000),
                steps_avg: None,
            }),
            ..Default::default()
        };
        let ctx = ClinicalContext::new(&patient, &WearableDefaults::default());

        let wearable = ctx.wearable().unwrap();
        assert_eq!(wearable.hrv_baseline, 50.0);
        assert_eq!(wearable.steps_goal, 8000);
        assert_eq!(ctx.steps_goal(), 8000.0);
    }

    #[test]
    fn test_default_goal_without_wearable() {
        let patient = PatientContext::default();
        let ctx = ClinicalContext::new(&patient, &WearableDefaults::default());

        assert!(ctx.wearable().is_none());
        assert_eq!(ctx.steps_goal(), 10_000.0);
        assert_eq!(ctx.category(), DisorderCategory::Other);
    }

    #[test]
    fn test_lithium_detection() {
        let patient = PatientContext {
            medications: vec!["Lamotrigine 100mg".to_string(), "LITHIUM carbonate".to_string()],
            ..Default::default()
        };
        assert!(ClinicalContext::new(&patient, &WearableDefaults::default()).takes_lithium());

        let patient = PatientContext {
            medications: vec!["Sertraline".to_string()],
            ..Default::default()
        };
        assert!(!ClinicalContext::new(&patient, &WearableDefaults::default()).takes_lithium());
    }
}
