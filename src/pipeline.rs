//! Pipeline orchestration
//!
//! This module provides the public API for Phenomind Analytics.
//! It wires trend analysis, driver weighting and recommendation generation
//! together for one patient, and population aggregation for a cohort.

use crate::config::AnalyticsConfig;
use crate::drivers::DriverWeighter;
use crate::encoder::AnalyticsEncoder;
use crate::error::AnalyticsError;
use crate::population::PopulationAggregator;
use crate::recommendation::RecommendationEngine;
use crate::trend::TrendAnalyzer;
use crate::types::{
    AnalyticsRequest, PatientAnalytics, PatientContext, PopulationMember, PopulationReport,
    TrendPoint, TrendSet,
};

/// Compute patient analytics from a JSON request.
///
/// # Arguments
/// * `request_json` - `{ "patient": {...}, "series": [...] }`
///
/// # Returns
/// Compact JSON analytics report
///
/// # Example
/// ```ignore
/// let report = patient_analytics(request_json)?;
/// ```
pub fn patient_analytics(request_json: String) -> Result<String, AnalyticsError> {
    AnalyticsProcessor::new().process_patient(&request_json)
}

/// Compute population analytics from a JSON array of patient records.
///
/// # Arguments
/// * `members_json` - `[ { "riskScore": ..., "disorderFull": ... } ]`
///
/// # Returns
/// Compact JSON population report
pub fn population_analytics(members_json: String) -> Result<String, AnalyticsError> {
    AnalyticsProcessor::new().process_population(&members_json)
}

/// Reusable processor holding one validated configuration.
///
/// All components are immutable after construction, so a processor can be
/// shared across threads by reference.
pub struct AnalyticsProcessor {
    config: AnalyticsConfig,
    analyzer: TrendAnalyzer,
    weighter: DriverWeighter,
    engine: RecommendationEngine,
    aggregator: PopulationAggregator,
    encoder: AnalyticsEncoder,
}

impl Default for AnalyticsProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticsProcessor {
    /// Create a processor with default thresholds
    pub fn new() -> Self {
        Self::build(AnalyticsConfig::default())
    }

    /// Create a processor with custom thresholds
    pub fn with_config(config: AnalyticsConfig) -> Result<Self, AnalyticsError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    /// Create a processor from a (possibly partial) JSON configuration
    pub fn from_config_json(json: &str) -> Result<Self, AnalyticsError> {
        AnalyticsConfig::from_json(json).map(Self::build)
    }

    fn build(config: AnalyticsConfig) -> Self {
        Self {
            analyzer: TrendAnalyzer::new(config.trend),
            weighter: DriverWeighter::new(config.drivers),
            engine: RecommendationEngine::new(config.engine),
            aggregator: PopulationAggregator::new(config.engine.risk),
            encoder: AnalyticsEncoder::new(),
            config,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn encoder(&self) -> &AnalyticsEncoder {
        &self.encoder
    }

    /// Compute unrounded analytics for one patient
    pub fn analyze(&self, patient: &PatientContext, series: &[TrendPoint]) -> PatientAnalytics {
        let ctx = self.engine.context(patient);
        let span = tracing::debug_span!(
            "patient_analytics",
            points = series.len(),
            category = ctx.category().as_str()
        );
        let _guard = span.enter();

        if series.is_empty() {
            tracing::debug!("empty series, skipping analysis");
            return PatientAnalytics {
                risk_score: patient.risk_score,
                averages: None,
                trends: TrendSet::default(),
                recommendations: Vec::new(),
                biomarker_drivers: Vec::new(),
            };
        }

        let analysis = self.analyzer.analyze(series);
        let drivers = self.weighter.weigh(&analysis.trends);
        let recommendations = self
            .engine
            .generate_for(&ctx, &analysis.averages, &analysis.trends);

        tracing::debug!(
            trends = !analysis.trends.is_empty(),
            drivers = drivers.len(),
            recommendations = recommendations.len(),
            "patient analytics computed"
        );

        PatientAnalytics {
            risk_score: patient.risk_score,
            averages: Some(analysis.averages),
            trends: analysis.trends,
            recommendations,
            biomarker_drivers: drivers,
        }
    }

    /// Compute analytics for a parsed request
    pub fn analyze_request(
        &self,
        request: &AnalyticsRequest,
    ) -> Result<PatientAnalytics, AnalyticsError> {
        validate_patient(&request.patient)?;
        Ok(self.analyze(&request.patient, &request.series))
    }

    /// Parse a JSON request and return the compact JSON report
    pub fn process_patient(&self, request_json: &str) -> Result<String, AnalyticsError> {
        let analytics = self.parse_and_analyze(request_json)?;
        self.encoder.encode_to_json(&analytics)
    }

    /// Parse a JSON request and return the report in a provenance envelope
    pub fn process_patient_with_provenance(
        &self,
        request_json: &str,
        pretty: bool,
    ) -> Result<String, AnalyticsError> {
        let analytics = self.parse_and_analyze(request_json)?;
        let envelope = self.encoder.encode_with_provenance(&analytics);
        crate::encoder::to_json(&envelope, pretty)
    }

    fn parse_and_analyze(&self, request_json: &str) -> Result<PatientAnalytics, AnalyticsError> {
        let request: AnalyticsRequest = serde_json::from_str(request_json)?;
        self.analyze_request(&request)
    }

    /// Aggregate cohort statistics
    pub fn population(&self, members: &[PopulationMember]) -> PopulationReport {
        self.aggregator.report(members)
    }

    /// Validate patient records, then aggregate them
    pub fn population_request(
        &self,
        members: &[PopulationMember],
    ) -> Result<PopulationReport, AnalyticsError> {
        for member in members {
            validate_risk_score(member.risk_score)?;
        }
        Ok(self.population(members))
    }

    /// Parse a JSON array of patient records and return the compact JSON report
    pub fn process_population(&self, members_json: &str) -> Result<String, AnalyticsError> {
        let members: Vec<PopulationMember> = serde_json::from_str(members_json)?;
        let report = self.population_request(&members)?;
        self.encoder.encode_population(&report, false)
    }
}

fn validate_patient(patient: &PatientContext) -> Result<(), AnalyticsError> {
    validate_risk_score(patient.risk_score)
}

fn validate_risk_score(score: Option<f64>) -> Result<(), AnalyticsError> {
    match score {
        Some(s) if !(0.0..=100.0).contains(&s) => Err(AnalyticsError::InvalidInput(format!(
            "riskScore must be within 0-100, got {s}"
        ))),
        _ => Ok(()),
    }
}
