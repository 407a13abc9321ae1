//! Phenomind Analytics - Biomarker analytics for psychiatric patient monitoring
//!
//! Phenomind turns a patient's daily biomarker series (sleep, HRV, activity,
//! mood) into clinical decision support through a deterministic pipeline:
//! trend analysis → driver weighting → disorder-aware recommendations →
//! report encoding. A separate aggregator summarizes risk across a cohort.
//!
//! ## Modules
//!
//! - **Patient analytics**: trends, ranked biomarker drivers and prioritized
//!   recommendations for one patient
//! - **Population analytics**: risk distribution, per-disorder breakdown and
//!   descriptive statistics for a cohort

pub mod config;
pub mod disorder;
pub mod drivers;
pub mod encoder;
pub mod error;
pub mod pipeline;
pub mod population;
pub mod recommendation;
pub mod trend;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::AnalyticsConfig;
pub use disorder::DisorderCategory;
pub use drivers::DriverWeighter;
pub use encoder::AnalyticsEncoder;
pub use error::AnalyticsError;
pub use pipeline::{patient_analytics, population_analytics, AnalyticsProcessor};
pub use population::PopulationAggregator;
pub use recommendation::RecommendationEngine;
pub use trend::TrendAnalyzer;

/// Library version embedded in provenance envelopes
pub const PHENOMIND_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for provenance envelopes
pub const PRODUCER_NAME: &str = "phenomind-analytics";
