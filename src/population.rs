//! Population analytics
//!
//! Cohort-level risk summaries over a set of patient records. Risk bands use
//! the engine's risk thresholds: high at or above `risk.high`, moderate at or
//! above `risk.moderate`, low below it. Patients without a risk score count
//! towards totals only.

use crate::config::RiskThresholds;
use crate::encoder::round_to;
use crate::types::{
    DisorderBreakdownEntry, PopulationMember, PopulationReport, PopulationSummary,
    RiskDistribution, RiskStatistics,
};

/// Risk band of a single score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBand {
    High,
    Moderate,
    Low,
}

/// Aggregator for cohort statistics
#[derive(Debug, Clone, Copy, Default)]
pub struct PopulationAggregator {
    thresholds: RiskThresholds,
}

impl PopulationAggregator {
    pub fn new(thresholds: RiskThresholds) -> Self {
        Self { thresholds }
    }

    pub fn band(&self, score: f64) -> RiskBand {
        if score >= self.thresholds.high {
            RiskBand::High
        } else if score >= self.thresholds.moderate {
            RiskBand::Moderate
        } else {
            RiskBand::Low
        }
    }

    /// Risk distribution and averages across the cohort
    pub fn summarize(&self, members: &[PopulationMember]) -> PopulationSummary {
        let total = members.len();
        if total == 0 {
            return PopulationSummary::default();
        }

        let mut distribution = RiskDistribution::default();
        for score in members.iter().filter_map(|m| m.risk_score) {
            match self.band(score) {
                RiskBand::High => distribution.high += 1,
                RiskBand::Moderate => distribution.moderate += 1,
                RiskBand::Low => distribution.low += 1,
            }
        }

        let scores: Vec<f64> = members.iter().filter_map(|m| m.risk_score).collect();
        let average = mean(&scores).unwrap_or(0.0);

        PopulationSummary {
            total_patients: total,
            risk_distribution: distribution,
            average_risk_score: round_to(average, 1),
            high_risk_percentage: round_to(distribution.high as f64 / total as f64 * 100.0, 1),
        }
    }

    /// Per-disorder band counts, ordered by first appearance
    pub fn breakdown(&self, members: &[PopulationMember]) -> Vec<DisorderBreakdownEntry> {
        let mut entries: Vec<DisorderBreakdownEntry> = Vec::new();

        for member in members {
            let index = match entries
                .iter()
                .position(|e| e.disorder == member.disorder_full)
            {
                Some(i) => i,
                None => {
                    entries.push(DisorderBreakdownEntry {
                        disorder: member.disorder_full.clone(),
                        total_patients: 0,
                        high_risk: 0,
                        moderate_risk: 0,
                        low_risk: 0,
                    });
                    entries.len() - 1
                }
            };

            let entry = &mut entries[index];
            entry.total_patients += 1;
            if let Some(score) = member.risk_score {
                match self.band(score) {
                    RiskBand::High => entry.high_risk += 1,
                    RiskBand::Moderate => entry.moderate_risk += 1,
                    RiskBand::Low => entry.low_risk += 1,
                }
            }
        }

        entries
    }

    /// Descriptive statistics over present scores; `None` without any
    pub fn risk_statistics(&self, members: &[PopulationMember]) -> Option<RiskStatistics> {
        let mut scores: Vec<f64> = members.iter().filter_map(|m| m.risk_score).collect();
        let mean = mean(&scores)?;
        scores.sort_by(f64::total_cmp);

        let n = scores.len();
        let median = if n % 2 == 0 {
            (scores[n / 2 - 1] + scores[n / 2]) / 2.0
        } else {
            scores[n / 2]
        };
        let std_dev = if n > 1 {
            let ss: f64 = scores.iter().map(|s| (s - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        } else {
            0.0
        };

        Some(RiskStatistics {
            min: round_to(scores[0], 1),
            max: round_to(scores[n - 1], 1),
            mean: round_to(mean, 1),
            median: round_to(median, 1),
            std_dev: round_to(std_dev, 1),
        })
    }

    /// Summary, breakdown and statistics in one document
    pub fn report(&self, members: &[PopulationMember]) -> PopulationReport {
        let report = PopulationReport {
            summary: self.summarize(members),
            breakdown: self.breakdown(members),
            statistics: self.risk_statistics(members),
        };
        tracing::debug!(
            patients = report.summary.total_patients,
            disorders = report.breakdown.len(),
            high = report.summary.risk_distribution.high,
            "aggregated population"
        );
        report
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
