//! Trend analysis
//!
//! This module compares the most recent window of a patient's biomarker series
//! against the window immediately before it. The current window always yields
//! averages; trends are only reported once the series covers the full
//! comparison span.

use crate::config::TrendConfig;
use crate::types::{Averages, Channel, TrendPoint, TrendSet, TrendSummary};

/// Averages and trends derived from one patient's series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendAnalysis {
    /// Mean of each channel over the current window
    pub averages: Averages,
    /// Per-channel comparison against the previous window
    pub trends: TrendSet,
}

/// Analyzer for current vs. previous window comparisons
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendAnalyzer {
    config: TrendConfig,
}

impl TrendAnalyzer {
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    /// Analyze a chronologically ordered series
    pub fn analyze(&self, series: &[TrendPoint]) -> TrendAnalysis {
        let window = self.config.window_days;
        let n = series.len();

        let split = n.saturating_sub(window);
        let current = &series[split..];
        let averages = Averages {
            sleep: window_mean(current, Channel::Sleep),
            hrv: window_mean(current, Channel::Hrv),
            activity: window_mean(current, Channel::Activity),
            mood: window_mean(current, Channel::Mood),
        };

        let mut trends = TrendSet::default();
        if n >= self.config.min_trend_points {
            let previous = &series[split.saturating_sub(window)..split];
            for channel in Channel::ALL {
                let summary = summarize(averages.get(channel), window_mean(previous, channel));
                trends.set(channel, summary);
            }
        }

        TrendAnalysis { averages, trends }
    }
}

/// Build a trend summary from current and previous window means
pub fn summarize(current: f64, previous: f64) -> TrendSummary {
    let change = current - previous;
    TrendSummary {
        current,
        previous,
        change,
        percent_change: percent_change(change, previous),
    }
}

/// Percentage change relative to `previous`; 0 when the base is not positive
fn percent_change(change: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        change / previous * 100.0
    } else {
        0.0
    }
}

/// Mean of a channel over a window; an empty window averages to 0
fn window_mean(points: &[TrendPoint], channel: Channel) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let sum: f64 = points.iter().map(|p| p.value(channel)).sum();
    sum / points.len() as f64
}
