//! Biomarker driver weighting
//!
//! Ranks the channels whose decline is driving a patient's risk change. Each
//! declining channel is weighted by its absolute percent change, boosted by a
//! severity multiplier for clinically large absolute changes, and normalized
//! against the other declining channels:
//!
//! ```text
//! weighted_c   = |percent_change_c| * severity_c(|change_c|)
//! importance_c = min(weighted_c / sum(weighted), cap)
//! ```
//!
//! Mood is tracked in trends but never produces a driver.

use crate::config::{ChannelWeighting, DriverConfig};
use crate::encoder::round_to;
use crate::types::{BiomarkerDriver, Channel, Direction, TrendSet, TrendSummary};
use std::cmp::Ordering;

/// Channels eligible to drive risk, in tie-break order
const DRIVER_CHANNELS: [Channel; 3] = [Channel::Sleep, Channel::Hrv, Channel::Activity];

/// Weighter producing ranked biomarker drivers from trend summaries
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverWeighter {
    config: DriverConfig,
}

struct Candidate<'a> {
    channel: Channel,
    summary: &'a TrendSummary,
    weighted: f64,
    fallback: f64,
}

impl DriverWeighter {
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    /// Rank the declining channels by severity-weighted importance
    pub fn weigh(&self, trends: &TrendSet) -> Vec<BiomarkerDriver> {
        let candidates: Vec<Candidate> = DRIVER_CHANNELS
            .iter()
            .filter_map(|&channel| {
                let summary = trends.get(channel)?;
                let weighting = self.weighting(channel)?;
                if summary.change < weighting.decline_gate {
                    let severity = weighting.multiplier(summary.change.abs());
                    tracing::trace!(
                        channel = channel.as_str(),
                        change = summary.change,
                        severity,
                        "declining channel"
                    );
                    Some(Candidate {
                        channel,
                        summary,
                        weighted: summary.percent_change.abs() * severity,
                        fallback: weighting.fallback_importance,
                    })
                } else {
                    None
                }
            })
            .collect();

        let total: f64 = candidates.iter().map(|c| c.weighted).sum();
        let dynamic = total > 0.0;
        if !dynamic && !candidates.is_empty() {
            tracing::debug!(
                qualifying = candidates.len(),
                "no weighted change available, using static driver weights"
            );
        }

        let cap = self.config.importance_cap;
        let mut drivers: Vec<BiomarkerDriver> = candidates
            .into_iter()
            .map(|c| {
                let importance = if dynamic {
                    c.weighted / total
                } else {
                    c.fallback
                };
                BiomarkerDriver {
                    factor: factor_label(c.channel).to_string(),
                    channel: c.channel,
                    importance: round_to(importance.clamp(0.0, cap), 2),
                    direction: Direction::of(c.summary.change),
                    change: c.summary.change,
                    percent_change: c.summary.percent_change.abs(),
                }
            })
            .collect();

        // Stable sort keeps sleep, hrv, activity order among equal importances
        drivers.sort_by(|a, b| {
            b.importance
                .partial_cmp(&a.importance)
                .unwrap_or(Ordering::Equal)
        });
        drivers
    }

    fn weighting(&self, channel: Channel) -> Option<&ChannelWeighting> {
        match channel {
            Channel::Sleep => Some(&self.config.sleep),
            Channel::Hrv => Some(&self.config.hrv),
            Channel::Activity => Some(&self.config.activity),
            Channel::Mood => None,
        }
    }
}

/// Display label for a driver channel
pub fn factor_label(channel: Channel) -> &'static str {
    match channel {
        Channel::Sleep => "Sleep irregularity",
        Channel::Hrv => "HRV ↓",
        Channel::Activity => "Mobility ↓",
        Channel::Mood => "Mood",
    }
}
