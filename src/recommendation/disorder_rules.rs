//! Disorder-specific recommendation rules
//!
//! Each disorder category maps to one rule set. Rule sets are stateless unit
//! structs; the engine resolves the right one once per request through
//! [`rules_for`] and calls it from the disorder stage.

use crate::config::EngineConfig;
use crate::disorder::DisorderCategory;
use crate::recommendation::context::{ClinicalContext, RuleInput};
use crate::types::{Priority, Recommendation, RecommendationType};

/// Rule set evaluated for patients of one disorder category
pub trait DisorderRules: Send + Sync {
    /// Category name used in log fields
    fn name(&self) -> &'static str;

    /// Emit the disorder-specific recommendations for this patient
    fn recommend(
        &self,
        ctx: &ClinicalContext<'_>,
        input: &RuleInput<'_>,
        config: &EngineConfig,
    ) -> Vec<Recommendation>;
}

/// Select the rule set for a disorder category
pub fn rules_for(category: DisorderCategory) -> &'static dyn DisorderRules {
    match category {
        DisorderCategory::Bipolar => &BipolarRules,
        DisorderCategory::Mdd => &MddRules,
        DisorderCategory::Ptsd => &PtsdRules,
        DisorderCategory::Anxiety | DisorderCategory::Panic => &AnxietyRules,
        DisorderCategory::Ocd => &OcdRules,
        DisorderCategory::Schizophrenia => &SchizophreniaRules,
        DisorderCategory::Bpd => &BpdRules,
        DisorderCategory::Substance => &SubstanceRules,
        DisorderCategory::SocialAnxiety
        | DisorderCategory::Adhd
        | DisorderCategory::EatingDisorder
        | DisorderCategory::Other => &NoDisorderRules,
    }
}

fn disorder(
    priority: Priority,
    message: &str,
    reason: impl Into<String>,
    action: &str,
) -> Recommendation {
    Recommendation::new(RecommendationType::Disorder, priority, message, reason, action)
}

fn mood(
    priority: Priority,
    message: &str,
    reason: impl Into<String>,
    action: &str,
) -> Recommendation {
    Recommendation::new(RecommendationType::Mood, priority, message, reason, action)
}

// ============================================================================
// Mood disorders
// ============================================================================

/// Bipolar disorder: early mania warning signs and mood variability
pub struct BipolarRules;

impl DisorderRules for BipolarRules {
    fn name(&self) -> &'static str {
        "bipolar"
    }

    fn recommend(
        &self,
        ctx: &ClinicalContext<'_>,
        input: &RuleInput<'_>,
        config: &EngineConfig,
    ) -> Vec<Recommendation> {
        let t = &config.disorder;
        let mut recs = Vec::new();

        if input.averages.sleep < t.bipolar_sleep_hours
            || input.averages.activity > ctx.steps_goal() * t.bipolar_activity_ratio
        {
            recs.push(disorder(
                Priority::High,
                "Monitor for manic/hypomanic symptoms",
                "Sleep reduction and/or activity increase - early manic warning signs",
                "mania_monitoring",
            ));
        }

        if let Some(trend) = input.trends.mood {
            if trend.percent_change.abs() > config.mood_variability.moderate_pct {
                recs.push(mood(
                    Priority::High,
                    "Mood stabilizer review recommended",
                    format!(
                        "Significant mood variability ({:.0}% change)",
                        trend.percent_change.abs()
                    ),
                    "mood_stabilizer_review",
                ));
            }
        }

        recs
    }
}

/// Major depressive disorder: treatment response
pub struct MddRules;

impl DisorderRules for MddRules {
    fn name(&self) -> &'static str {
        "mdd"
    }

    fn recommend(
        &self,
        ctx: &ClinicalContext<'_>,
        input: &RuleInput<'_>,
        config: &EngineConfig,
    ) -> Vec<Recommendation> {
        let t = &config.disorder;
        let mut recs = Vec::new();

        if input.averages.sleep < t.mdd_sleep_hours
            && input.averages.activity < ctx.steps_goal() * t.mdd_activity_ratio
        {
            recs.push(disorder(
                Priority::High,
                "Consider antidepressant adjustment or augmentation",
                "Combined sleep and activity decline - treatment response concerns",
                "medication_adjustment",
            ));
        }

        if let Some(trend) = input.trends.mood {
            if trend.change < t.mdd_mood_decline {
                recs.push(mood(
                    Priority::High,
                    "Increase therapy frequency or consider medication change",
                    "Mood declining despite treatment",
                    "treatment_intensification",
                ));
            }
        }

        recs
    }
}

/// Borderline personality disorder: safety and emotion regulation
pub struct BpdRules;

impl DisorderRules for BpdRules {
    fn name(&self) -> &'static str {
        "bpd"
    }

    fn recommend(
        &self,
        ctx: &ClinicalContext<'_>,
        input: &RuleInput<'_>,
        config: &EngineConfig,
    ) -> Vec<Recommendation> {
        let mut recs = Vec::new();

        if ctx.risk_score().is_some_and(|risk| risk > config.disorder.bpd_risk) {
            recs.push(disorder(
                Priority::High,
                "Check for self-harm ideation and DBT skills use",
                "Elevated risk in BPD - safety assessment needed",
                "safety_assessment",
            ));
        }

        if let Some(trend) = input.trends.mood {
            if trend.percent_change.abs() > config.mood_variability.high_pct {
                recs.push(mood(
                    Priority::Medium,
                    "Review emotion regulation DBT skills",
                    "High mood variability - core BPD symptom",
                    "dbt_skills_review",
                ));
            }
        }

        recs
    }
}

// ============================================================================
// Trauma and anxiety
// ============================================================================

/// Post-traumatic stress disorder: nightmares and hyperarousal
pub struct PtsdRules;

impl DisorderRules for PtsdRules {
    fn name(&self) -> &'static str {
        "ptsd"
    }

    fn recommend(
        &self,
        ctx: &ClinicalContext<'_>,
        input: &RuleInput<'_>,
        config: &EngineConfig,
    ) -> Vec<Recommendation> {
        let t = &config.disorder;
        let mut recs = Vec::new();

        if input.averages.sleep < t.ptsd_sleep_hours {
            recs.push(disorder(
                Priority::High,
                "Review nightmare frequency and Prazosin effectiveness",
                "Poor sleep common with PTSD nightmares",
                "nightmare_treatment_review",
            ));
        }

        if let Some(wearable) = ctx.wearable() {
            if input.averages.hrv < wearable.hrv_baseline * t.ptsd_hrv_ratio {
                recs.push(disorder(
                    Priority::Medium,
                    "Consider EMDR or prolonged exposure therapy",
                    "Low HRV suggests high hyperarousal - trauma processing may help",
                    "trauma_therapy",
                ));
            }
        }

        recs
    }
}

/// Generalized anxiety and panic disorders
pub struct AnxietyRules;

impl DisorderRules for AnxietyRules {
    fn name(&self) -> &'static str {
        "anxiety"
    }

    fn recommend(
        &self,
        ctx: &ClinicalContext<'_>,
        input: &RuleInput<'_>,
        config: &EngineConfig,
    ) -> Vec<Recommendation> {
        let t = &config.disorder;
        let mut recs = Vec::new();

        if let Some(wearable) = ctx.wearable() {
            if input.averages.hrv < wearable.hrv_baseline * t.anxiety_hrv_ratio {
                recs.push(disorder(
                    Priority::Medium,
                    "Teach diaphragmatic breathing and HRV biofeedback",
                    "Low HRV indicates autonomic dysregulation common in anxiety",
                    "breathing_training",
                ));
            }
        }

        if input.averages.sleep < t.anxiety_sleep_hours {
            recs.push(disorder(
                Priority::Medium,
                "Address sleep anxiety with CBT techniques",
                "Sleep disturbance perpetuates anxiety cycle",
                "cbt_sleep_anxiety",
            ));
        }

        recs
    }
}

/// Obsessive-compulsive disorder
pub struct OcdRules;

impl DisorderRules for OcdRules {
    fn name(&self) -> &'static str {
        "ocd"
    }

    fn recommend(
        &self,
        ctx: &ClinicalContext<'_>,
        _input: &RuleInput<'_>,
        config: &EngineConfig,
    ) -> Vec<Recommendation> {
        if ctx.risk_score().is_some_and(|risk| risk > config.disorder.ocd_risk) {
            vec![disorder(
                Priority::High,
                "Intensify ERP (Exposure Response Prevention) therapy",
                "Elevated risk suggests symptom exacerbation",
                "erp_intensify",
            )]
        } else {
            Vec::new()
        }
    }
}

// ============================================================================
// Psychosis and substance use
// ============================================================================

pub struct SchizophreniaRules;

impl DisorderRules for SchizophreniaRules {
    fn name(&self) -> &'static str {
        "schizophrenia"
    }

    fn recommend(
        &self,
        ctx: &ClinicalContext<'_>,
        input: &RuleInput<'_>,
        config: &EngineConfig,
    ) -> Vec<Recommendation> {
        let t = &config.disorder;
        let sleep = input.averages.sleep;
        let mut recs = Vec::new();

        if sleep < t.schizophrenia_sleep_min_hours || sleep > t.schizophrenia_sleep_max_hours {
            recs.push(disorder(
                Priority::High,
                "Monitor for psychotic symptom changes",
                "Sleep irregularity can trigger symptom relapse",
                "psychotic_symptom_monitoring",
            ));
        }

        if input.averages.activity < ctx.steps_goal() * t.schizophrenia_activity_ratio {
            recs.push(disorder(
                Priority::Medium,
                "Assess for negative symptoms and medication side effects",
                "Low activity may indicate amotivation or sedation",
                "negative_symptom_assessment",
            ));
        }

        recs
    }
}

pub struct SubstanceRules;

impl DisorderRules for SubstanceRules {
    fn name(&self) -> &'static str {
        "substance"
    }

    fn recommend(
        &self,
        ctx: &ClinicalContext<'_>,
        input: &RuleInput<'_>,
        config: &EngineConfig,
    ) -> Vec<Recommendation> {
        let t = &config.disorder;
        let mut recs = Vec::new();

        if input.averages.sleep < t.substance_sleep_hours {
            recs.push(disorder(
                Priority::High,
                "Screen for substance use relapse",
                "Poor sleep is both trigger and sign of relapse",
                "relapse_screening",
            ));
        }

        if input.averages.activity < ctx.steps_goal() * t.substance_activity_ratio {
            recs.push(disorder(
                Priority::Medium,
                "Encourage support group attendance and structured activities",
                "Low activity increases relapse risk - need structure",
                "structure_intervention",
            ));
        }

        recs
    }
}

/// Categories without a dedicated rule set
pub struct NoDisorderRules;

impl DisorderRules for NoDisorderRules {
    fn name(&self) -> &'static str {
        "none"
    }

    fn recommend(
        &self,
        _ctx: &ClinicalContext<'_>,
        _input: &RuleInput<'_>,
        _config: &EngineConfig,
    ) -> Vec<Recommendation> {
        Vec::new()
    }
}
