//! Clinical recommendation generation
//!
//! Recommendations come from a fixed sequence of stages (risk, sleep, HRV,
//! activity, disorder, medication, positive reinforcement). The disorder stage
//! delegates to a per-category rule set chosen once when the patient's
//! [`ClinicalContext`] is built.

pub mod context;
pub mod disorder_rules;
pub mod engine;
pub mod stages;

pub use context::{ClinicalContext, ResolvedWearable, RuleInput};
pub use disorder_rules::{rules_for, DisorderRules};
pub use engine::RecommendationEngine;
