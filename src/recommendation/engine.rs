//! Recommendation engine
//!
//! Runs every stage over one patient's averages and trends, orders the
//! combined output by priority and keeps the most urgent entries.

use crate::config::EngineConfig;
use crate::recommendation::context::{ClinicalContext, RuleInput};
use crate::recommendation::stages::STAGES;
use crate::types::{Averages, PatientContext, Recommendation, TrendSet};

/// Disorder-aware clinical recommendation engine
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationEngine {
    config: EngineConfig,
}

impl RecommendationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Resolve a patient's category, rule set and wearable baselines
    pub fn context<'a>(&self, patient: &'a PatientContext) -> ClinicalContext<'a> {
        ClinicalContext::new(patient, &self.config.defaults)
    }

    /// Generate priority-ordered recommendations for one patient
    pub fn generate(
        &self,
        patient: &PatientContext,
        averages: &Averages,
        trends: &TrendSet,
    ) -> Vec<Recommendation> {
        let ctx = self.context(patient);
        self.generate_for(&ctx, averages, trends)
    }

    /// Generate recommendations for an already resolved context
    pub fn generate_for(
        &self,
        ctx: &ClinicalContext<'_>,
        averages: &Averages,
        trends: &TrendSet,
    ) -> Vec<Recommendation> {
        let input = RuleInput { averages, trends };

        let mut recs: Vec<Recommendation> = STAGES
            .iter()
            .flat_map(|(name, stage)| {
                let out = stage(ctx, &input, &self.config);
                tracing::trace!(stage = *name, emitted = out.len(), "recommendation stage");
                out
            })
            .collect();

        let emitted = recs.len();
        // Stable: equal priorities keep stage order
        recs.sort_by_key(|r| r.priority.rank());
        recs.truncate(self.config.max_recommendations);

        tracing::debug!(
            category = ctx.category().as_str(),
            rules = ctx.rules().name(),
            emitted,
            kept = recs.len(),
            "generated recommendations"
        );
        recs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Priority, RecommendationType, TrendSummary, WearableBaselines};

    fn wearable() -> Option<WearableBaselines> {
        Some(WearableBaselines {
            hrv_baseline: Some(50.0),
            steps_goal: Some(10_000),
            steps_avg: None,
        })
    }

    fn averages(sleep: f64, hrv: f64, activity: f64) -> Averages {
        Averages {
            sleep,
            hrv,
            activity,
            mood: 5.0,
        }
    }

    fn actions(recs: &[Recommendation]) -> Vec<&str> {
        recs.iter().map(|r| r.action.as_str()).collect()
    }

    fn is_priority_sorted(recs: &[Recommendation]) -> bool {
        recs.windows(2).all(|w| w[0].priority.rank() <= w[1].priority.rank())
    }

    #[test]
    fn test_high_risk_yields_single_urgent_evaluation() {
        let patient = PatientContext {
            risk_score: Some(80.0),
            wearable: wearable(),
            ..Default::default()
        };
        let recs = RecommendationEngine::default().generate(
            &patient,
            &averages(7.5, 50.0, 9500.0),
            &TrendSet::default(),
        );

        let risk: Vec<&Recommendation> = recs
            .iter()
            .filter(|r| r.kind == RecommendationType::Risk)
            .collect();
        assert_eq!(risk.len(), 1);
        assert_eq!(risk[0].priority, Priority::Critical);
        assert_eq!(risk[0].action, "urgent_evaluation");
        assert_eq!(recs[0].action, "urgent_evaluation");
    }

    #[test]
    fn test_bipolar_mania_scenario() {
        let patient = PatientContext {
            risk_score: Some(72.0),
            disorder: "BD".to_string(),
            disorder_full: "Bipolar I Disorder".to_string(),
            wearable: wearable(),
            medications: vec!["Lithium 900mg".to_string()],
        };
        let recs = RecommendationEngine::default().generate(
            &patient,
            &averages(5.0, 44.0, 13_500.0),
            &TrendSet::default(),
        );

        assert!(recs.len() <= 6);
        assert!(is_priority_sorted(&recs));
        assert_eq!(
            actions(&recs),
            vec![
                "same_day_followup",
                "bipolar_sleep_crisis",
                "mania_evaluation",
                "mania_monitoring",
                "lithium_level_check",
                "mindfulness_intervention",
            ]
        );
    }

    #[test]
    fn test_bipolar_activity_below_mania_threshold() {
        let patient = PatientContext {
            disorder_full: "Bipolar I Disorder".to_string(),
            wearable: wearable(),
            ..Default::default()
        };
        let recs = RecommendationEngine::default().generate(
            &patient,
            &averages(5.0, 50.0, 12_000.0),
            &TrendSet::default(),
        );

        // 12000 steps clears the early warning (goal x 1.2) but not mania (goal x 1.3)
        assert_eq!(actions(&recs), vec!["bipolar_sleep_crisis", "mania_monitoring"]);
        assert_eq!(recs[0].priority, Priority::Critical);
    }

    #[test]
    fn test_truncates_to_cap_and_keeps_most_urgent() {
        let patient = PatientContext {
            risk_score: Some(90.0),
            disorder_full: "Major Depressive Disorder".to_string(),
            wearable: wearable(),
            ..Default::default()
        };
        let trends = TrendSet {
            sleep: Some(TrendSummary {
                current: 5.0,
                previous: 7.0,
                change: -2.0,
                percent_change: -28.6,
            }),
            mood: Some(TrendSummary {
                current: 3.0,
                previous: 9.0,
                change: -6.0,
                percent_change: -66.7,
            }),
            ..TrendSet::default()
        };
        let recs = RecommendationEngine::default().generate(
            &patient,
            &averages(5.0, 30.0, 2000.0),
            &trends,
        );

        // 7 emitted; the medium adherence check falls off the end
        assert_eq!(recs.len(), 6);
        assert!(is_priority_sorted(&recs));
        assert_eq!(recs[0].action, "urgent_evaluation");
        assert_eq!(recs[1].action, "sleep_intervention");
        assert!(!actions(&recs).contains(&"adherence_check"));
    }

    #[test]
    fn test_custom_recommendation_cap() {
        let config = EngineConfig {
            max_recommendations: 2,
            ..EngineConfig::default()
        };
        let patient = PatientContext {
            risk_score: Some(70.0),
            wearable: wearable(),
            ..Default::default()
        };
        let recs = RecommendationEngine::new(config).generate(
            &patient,
            &averages(5.5, 30.0, 3000.0),
            &TrendSet::default(),
        );

        assert_eq!(actions(&recs), vec!["same_day_followup", "sleep_intervention"]);
    }

    #[test]
    fn test_healthy_patient_gets_positive_only() {
        let patient = PatientContext {
            risk_score: Some(20.0),
            disorder_full: "Generalized Anxiety Disorder".to_string(),
            wearable: wearable(),
            ..Default::default()
        };
        let recs = RecommendationEngine::default().generate(
            &patient,
            &averages(7.8, 55.0, 11_000.0),
            &TrendSet::default(),
        );

        assert_eq!(actions(&recs), vec!["continue_routine"]);
    }

    #[test]
    fn test_without_wearable_only_series_rules_apply() {
        let patient = PatientContext {
            disorder_full: "Schizophrenia".to_string(),
            ..Default::default()
        };
        let recs = RecommendationEngine::default().generate(
            &patient,
            &averages(5.5, 20.0, 2000.0),
            &TrendSet::default(),
        );

        assert_eq!(
            actions(&recs),
            vec![
                "sleep_intervention",
                "psychotic_symptom_monitoring",
                "negative_symptom_assessment",
            ]
        );
    }
}
