//! Recommendation stages
//!
//! Stages run in a fixed order and each returns zero or more recommendations.
//! Stage order matters: after the priority sort, recommendations of equal
//! priority keep the order in which their stages ran.

use crate::config::EngineConfig;
use crate::disorder::DisorderCategory;
use crate::recommendation::context::{ClinicalContext, RuleInput};
use crate::types::{Priority, Recommendation, RecommendationType};

/// Signature shared by every stage
pub type Stage = fn(&ClinicalContext<'_>, &RuleInput<'_>, &EngineConfig) -> Vec<Recommendation>;

/// Stages in evaluation order, with the name used in log fields
pub const STAGES: [(&str, Stage); 7] = [
    ("risk", risk_stage),
    ("sleep", sleep_stage),
    ("hrv", hrv_stage),
    ("activity", activity_stage),
    ("disorder", disorder_stage),
    ("medication", medication_stage),
    ("positive", positive_stage),
];

/// Percentage of a goal reached; 0 for a non-positive goal
fn percent_of(value: f64, goal: f64) -> f64 {
    if goal > 0.0 {
        value / goal * 100.0
    } else {
        0.0
    }
}

pub fn risk_stage(
    ctx: &ClinicalContext<'_>,
    _input: &RuleInput<'_>,
    config: &EngineConfig,
) -> Vec<Recommendation> {
    let Some(risk) = ctx.risk_score() else {
        return Vec::new();
    };

    if risk >= config.risk.critical {
        vec![Recommendation::new(
            RecommendationType::Risk,
            Priority::Critical,
            "URGENT: Schedule immediate psychiatric evaluation",
            format!("Critical risk score ({risk:.0}%) - immediate intervention required"),
            "urgent_evaluation",
        )]
    } else if risk >= config.risk.high {
        vec![Recommendation::new(
            RecommendationType::Risk,
            Priority::Critical,
            "Schedule same-day follow-up visit",
            format!("High risk score ({risk:.0}%) detected"),
            "same_day_followup",
        )]
    } else {
        Vec::new()
    }
}

pub fn sleep_stage(
    ctx: &ClinicalContext<'_>,
    input: &RuleInput<'_>,
    config: &EngineConfig,
) -> Vec<Recommendation> {
    let sleep = input.averages.sleep;
    let category = ctx.category();

    let rec = if sleep < config.sleep.critical_hours {
        match category {
            DisorderCategory::Bipolar => Recommendation::new(
                RecommendationType::Sleep,
                Priority::Critical,
                "URGENT: Address severe sleep deprivation - manic episode risk",
                format!(
                    "Sleep duration ({sleep:.1}h) critically low - major trigger for bipolar episodes"
                ),
                "bipolar_sleep_crisis",
            ),
            DisorderCategory::Ptsd => Recommendation::new(
                RecommendationType::Sleep,
                Priority::High,
                "Increase Prazosin dosage or add sleep medication",
                format!("Severe sleep disruption ({sleep:.1}h) - likely nightmares/hyperarousal"),
                "ptsd_medication_review",
            ),
            _ => Recommendation::new(
                RecommendationType::Sleep,
                Priority::Critical,
                "Immediate sleep intervention required",
                format!("Severe sleep deprivation ({sleep:.1}h) detected"),
                "sleep_intervention",
            ),
        }
    } else if sleep < config.sleep.low_hours {
        match category {
            DisorderCategory::Mdd => Recommendation::new(
                RecommendationType::Sleep,
                Priority::High,
                "Consider CBT-I referral or sleep hygiene intervention",
                format!("Sleep duration ({sleep:.1}h) below optimal - common in depression"),
                "cbti_referral",
            ),
            c if c.is_anxiety_spectrum() => Recommendation::new(
                RecommendationType::Sleep,
                Priority::High,
                "Address anxiety-related sleep disturbance",
                format!("Sleep duration ({sleep:.1}h) suggests anxiety interference"),
                "anxiety_sleep_treatment",
            ),
            _ => Recommendation::new(
                RecommendationType::Sleep,
                Priority::High,
                "Consider sleep-focused CBT-I referral",
                format!("Average sleep duration ({sleep:.1}h) below recommended 7-8 hours"),
                "cbti_referral",
            ),
        }
    } else {
        return Vec::new();
    };

    vec![rec]
}

pub fn hrv_stage(
    ctx: &ClinicalContext<'_>,
    input: &RuleInput<'_>,
    config: &EngineConfig,
) -> Vec<Recommendation> {
    let Some(wearable) = ctx.wearable() else {
        return Vec::new();
    };
    let hrv = input.averages.hrv;
    let baseline = wearable.hrv_baseline;

    let rec = if hrv < baseline * config.hrv.severe_ratio {
        match ctx.category() {
            DisorderCategory::Ptsd => Recommendation::new(
                RecommendationType::Hrv,
                Priority::High,
                "Consider trauma-focused therapy intensification",
                format!(
                    "Very low HRV ({hrv:.0}ms) indicates high sympathetic activation - PTSD symptom exacerbation"
                ),
                "trauma_therapy_intensify",
            ),
            c if c.is_anxiety_spectrum() => Recommendation::new(
                RecommendationType::Hrv,
                Priority::High,
                "Implement HRV biofeedback or relaxation training",
                format!("Low HRV ({hrv:.0}ms) suggests heightened anxiety state"),
                "hrv_biofeedback",
            ),
            _ => Recommendation::new(
                RecommendationType::Hrv,
                Priority::High,
                "Review stress levels and medication timing",
                format!(
                    "HRV ({hrv:.0}ms) significantly below baseline ({baseline:.0}ms) - high stress indicator"
                ),
                "stress_review",
            ),
        }
    } else if hrv < baseline * config.hrv.moderate_ratio {
        Recommendation::new(
            RecommendationType::Hrv,
            Priority::Medium,
            "Monitor stress and consider mindfulness interventions",
            format!("HRV ({hrv:.0}ms) below baseline ({baseline:.0}ms)"),
            "mindfulness_intervention",
        )
    } else {
        return Vec::new();
    };

    vec![rec]
}

pub fn activity_stage(
    ctx: &ClinicalContext<'_>,
    input: &RuleInput<'_>,
    config: &EngineConfig,
) -> Vec<Recommendation> {
    let Some(wearable) = ctx.wearable() else {
        return Vec::new();
    };
    let steps = input.averages.activity;
    let goal = wearable.steps_goal_f64();
    let pct = percent_of(steps, goal);
    let category = ctx.category();

    let rec = if steps < goal * config.activity.severe_ratio {
        match category {
            DisorderCategory::Mdd => Recommendation::new(
                RecommendationType::Activity,
                Priority::High,
                "Behavioral activation therapy recommended",
                format!(
                    "Severe activity reduction ({steps:.0} steps, {pct:.0}% of goal) - key depression indicator"
                ),
                "behavioral_activation",
            ),
            DisorderCategory::Schizophrenia => Recommendation::new(
                RecommendationType::Activity,
                Priority::High,
                "Evaluate for negative symptoms and medication side effects",
                format!(
                    "Very low activity ({steps:.0} steps) may indicate amotivation or sedation"
                ),
                "negative_symptom_eval",
            ),
            _ => Recommendation::new(
                RecommendationType::Activity,
                Priority::High,
                "Urgent: Address severe mobility reduction",
                format!(
                    "Activity level ({steps:.0} steps) critically low - only {pct:.0}% of goal"
                ),
                "mobility_intervention",
            ),
        }
    } else if steps < goal * config.activity.moderate_ratio {
        Recommendation::new(
            RecommendationType::Activity,
            Priority::Medium,
            "Encourage increased physical activity and exercise",
            format!(
                "Activity level ({steps:.0} steps) below goal ({} steps)",
                wearable.steps_goal
            ),
            "activity_increase",
        )
    } else if category == DisorderCategory::Bipolar
        && steps > goal * config.activity.hyperactive_ratio
    {
        Recommendation::new(
            RecommendationType::Activity,
            Priority::Critical,
            "URGENT: Evaluate for manic/hypomanic episode",
            format!(
                "Unusually high activity ({steps:.0} steps, {pct:.0}% of goal) - possible mania"
            ),
            "mania_evaluation",
        )
    } else {
        return Vec::new();
    };

    vec![rec]
}

pub fn disorder_stage(
    ctx: &ClinicalContext<'_>,
    input: &RuleInput<'_>,
    config: &EngineConfig,
) -> Vec<Recommendation> {
    ctx.rules().recommend(ctx, input, config)
}

pub fn medication_stage(
    ctx: &ClinicalContext<'_>,
    input: &RuleInput<'_>,
    config: &EngineConfig,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    if let Some(sleep) = input.trends.sleep {
        if sleep.percent_change.abs() > config.medication.adherence_sleep_pct {
            recs.push(Recommendation::new(
                RecommendationType::Medication,
                Priority::Medium,
                "Verify medication adherence",
                "Sudden biomarker changes may indicate missed doses",
                "adherence_check",
            ));
        }
    }

    if let Some(wearable) = ctx.wearable() {
        let steps = wearable.steps_avg.unwrap_or(input.averages.activity);
        if ctx.takes_lithium()
            && steps > wearable.steps_goal_f64() * config.medication.lithium_activity_ratio
        {
            recs.push(Recommendation::new(
                RecommendationType::Medication,
                Priority::High,
                "Check lithium levels - possible breakthrough mania",
                "Increased activity despite lithium treatment",
                "lithium_level_check",
            ));
        }
    }

    recs
}

pub fn positive_stage(
    ctx: &ClinicalContext<'_>,
    input: &RuleInput<'_>,
    config: &EngineConfig,
) -> Vec<Recommendation> {
    let Some(wearable) = ctx.wearable() else {
        return Vec::new();
    };
    let sleep = input.averages.sleep;
    let healthy_sleep =
        sleep >= config.sleep.optimal_min_hours && sleep <= config.sleep.optimal_max_hours;
    let active =
        input.averages.activity >= wearable.steps_goal_f64() * config.positive_activity_ratio;

    if healthy_sleep && active {
        vec![Recommendation::new(
            RecommendationType::Positive,
            Priority::Low,
            "Excellent sleep and activity patterns - continue current routine",
            "Maintaining healthy behaviors supports mental health stability",
            "continue_routine",
        )]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Averages, PatientContext, TrendSet, TrendSummary, WearableBaselines};

    fn patient(full: &str, risk: Option<f64>) -> PatientContext {
        PatientContext {
            risk_score: risk,
            disorder_full: full.to_string(),
            wearable: Some(WearableBaselines {
                hrv_baseline: Some(60.0),
                steps_goal: Some(10_000),
                steps_avg: None,
            }),
            ..Default::default()
        }
    }

    fn run(stage: Stage, patient: &PatientContext, averages: Averages) -> Vec<Recommendation> {
        run_with_trends(stage, patient, averages, TrendSet::default())
    }

    fn run_with_trends(
        stage: Stage,
        patient: &PatientContext,
        averages: Averages,
        trends: TrendSet,
    ) -> Vec<Recommendation> {
        let config = EngineConfig::default();
        let ctx = ClinicalContext::new(patient, &config.defaults);
        stage(
            &ctx,
            &RuleInput {
                averages: &averages,
                trends: &trends,
            },
            &config,
        )
    }

    fn avg(sleep: f64, hrv: f64, activity: f64) -> Averages {
        Averages {
            sleep,
            hrv,
            activity,
            mood: 5.0,
        }
    }

    #[test]
    fn test_stage_order() {
        let names: Vec<&str> = STAGES.iter().map(|(name, _)| *name).collect();
        assert_eq!(
            names,
            vec!["risk", "sleep", "hrv", "activity", "disorder", "medication", "positive"]
        );
    }

    #[test]
    fn test_risk_tiers() {
        let a = avg(8.0, 60.0, 10_000.0);

        let recs = run(risk_stage, &patient("", Some(80.0)), a);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].priority, Priority::Critical);
        assert_eq!(recs[0].action, "urgent_evaluation");
        assert_eq!(
            recs[0].reason,
            "Critical risk score (80%) - immediate intervention required"
        );

        let recs = run(risk_stage, &patient("", Some(66.0)), a);
        assert_eq!(recs[0].action, "same_day_followup");
        assert_eq!(recs[0].priority, Priority::Critical);

        assert!(run(risk_stage, &patient("", Some(65.9)), a).is_empty());
        assert!(run(risk_stage, &patient("", None), a).is_empty());
    }

    #[test]
    fn test_sleep_variants() {
        let short = avg(5.4, 60.0, 10_000.0);
        let recs = run(sleep_stage, &patient("Bipolar I Disorder", None), short);
        assert_eq!(recs[0].action, "bipolar_sleep_crisis");
        assert_eq!(recs[0].priority, Priority::Critical);
        assert_eq!(
            recs[0].reason,
            "Sleep duration (5.4h) critically low - major trigger for bipolar episodes"
        );

        let recs = run(sleep_stage, &patient("PTSD", None), short);
        assert_eq!(recs[0].action, "ptsd_medication_review");
        assert_eq!(recs[0].priority, Priority::High);

        let recs = run(sleep_stage, &patient("Insomnia", None), short);
        assert_eq!(recs[0].action, "sleep_intervention");
        assert_eq!(recs[0].priority, Priority::Critical);

        let low = avg(6.5, 60.0, 10_000.0);
        let recs = run(sleep_stage, &patient("Panic Disorder", None), low);
        assert_eq!(recs[0].action, "anxiety_sleep_treatment");
        let recs = run(sleep_stage, &patient("Major Depressive Disorder", None), low);
        assert_eq!(
            recs[0].reason,
            "Sleep duration (6.5h) below optimal - common in depression"
        );
        let recs = run(sleep_stage, &patient("", None), low);
        assert_eq!(recs[0].action, "cbti_referral");

        assert!(run(sleep_stage, &patient("", None), avg(7.0, 60.0, 10_000.0)).is_empty());
    }

    #[test]
    fn test_hrv_relative_to_baseline() {
        // Baseline 60: severe below 45, moderate below 54
        let recs = run(hrv_stage, &patient("", None), avg(8.0, 40.0, 10_000.0));
        assert_eq!(recs[0].action, "stress_review");
        assert_eq!(
            recs[0].reason,
            "HRV (40ms) significantly below baseline (60ms) - high stress indicator"
        );

        let recs = run(
            hrv_stage,
            &patient("Generalized Anxiety Disorder", None),
            avg(8.0, 40.0, 10_000.0),
        );
        assert_eq!(recs[0].action, "hrv_biofeedback");

        let recs = run(hrv_stage, &patient("PTSD", None), avg(8.0, 40.0, 10_000.0));
        assert_eq!(recs[0].action, "trauma_therapy_intensify");

        let recs = run(hrv_stage, &patient("", None), avg(8.0, 50.0, 10_000.0));
        assert_eq!(recs[0].action, "mindfulness_intervention");
        assert_eq!(recs[0].priority, Priority::Medium);

        assert!(run(hrv_stage, &patient("", None), avg(8.0, 54.0, 10_000.0)).is_empty());
    }

    #[test]
    fn test_activity_variants() {
        let mdd = patient("Major Depressive Disorder", None);
        let recs = run(activity_stage, &mdd, avg(8.0, 60.0, 3000.0));
        assert_eq!(recs[0].action, "behavioral_activation");
        assert_eq!(
            recs[0].reason,
            "Severe activity reduction (3000 steps, 30% of goal) - key depression indicator"
        );

        let recs = run(activity_stage, &patient("Schizophrenia", None), avg(8.0, 60.0, 3000.0));
        assert_eq!(recs[0].action, "negative_symptom_eval");

        let recs = run(activity_stage, &patient("", None), avg(8.0, 60.0, 3000.0));
        assert_eq!(recs[0].action, "mobility_intervention");

        let recs = run(activity_stage, &patient("", None), avg(8.0, 60.0, 6000.0));
        assert_eq!(recs[0].action, "activity_increase");
        assert_eq!(
            recs[0].reason,
            "Activity level (6000 steps) below goal (10000 steps)"
        );

        let bipolar = patient("Bipolar I Disorder", None);
        let recs = run(activity_stage, &bipolar, avg(8.0, 60.0, 13_500.0));
        assert_eq!(recs[0].action, "mania_evaluation");
        assert_eq!(recs[0].priority, Priority::Critical);

        // Hyperactivity only matters for bipolar patients
        assert!(run(activity_stage, &patient("", None), avg(8.0, 60.0, 13_500.0)).is_empty());
    }

    #[test]
    fn test_wearable_stages_skip_without_device() {
        let p = PatientContext {
            disorder_full: "Bipolar I Disorder".to_string(),
            ..Default::default()
        };
        let a = avg(8.0, 10.0, 20_000.0);
        assert!(run(hrv_stage, &p, a).is_empty());
        assert!(run(activity_stage, &p, a).is_empty());
        assert!(run(positive_stage, &p, a).is_empty());
    }

    #[test]
    fn test_adherence_check_uses_sleep_trend() {
        let trends = TrendSet {
            sleep: Some(TrendSummary {
                current: 6.0,
                previous: 7.5,
                change: -1.5,
                percent_change: -20.0,
            }),
            ..TrendSet::default()
        };
        let p = patient("", None);
        let recs = run_with_trends(medication_stage, &p, avg(6.0, 60.0, 9000.0), trends);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].action, "adherence_check");
    }

    #[test]
    fn test_lithium_prefers_device_average() {
        let mut p = patient("Bipolar I Disorder", None);
        p.medications = vec!["Lithium 900mg".to_string()];

        let recs = run(medication_stage, &p, avg(8.0, 60.0, 14_000.0));
        assert_eq!(recs[0].action, "lithium_level_check");

        if let Some(w) = p.wearable.as_mut() {
            w.steps_avg = Some(9000.0);
        }
        assert!(run(medication_stage, &p, avg(8.0, 60.0, 14_000.0)).is_empty());
    }

    #[test]
    fn test_positive_reinforcement() {
        let recs = run(positive_stage, &patient("", None), avg(7.5, 60.0, 9000.0));
        assert_eq!(recs[0].action, "continue_routine");
        assert_eq!(recs[0].priority, Priority::Low);

        assert!(run(positive_stage, &patient("", None), avg(9.5, 60.0, 9000.0)).is_empty());
        assert!(run(positive_stage, &patient("", None), avg(7.5, 60.0, 8900.0)).is_empty());
    }
}
