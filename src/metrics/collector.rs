//! Metrics collection and registry.

use crate::booth::LoopStats;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of loop state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Whether the capture loop is still running.
    pub running: bool,
    /// Completed loop iterations.
    pub ticks: u64,
    /// Frames shown in the preview.
    pub preview_frames: u64,
    /// Captures written to storage.
    pub captures: u64,
    /// Captures dropped.
    pub capture_failures: u64,
    /// Events acted upon.
    pub events_dispatched: u64,
    /// Events discarded after shutdown.
    pub events_discarded: u64,
}

impl MetricsSnapshot {
    /// Creates a snapshot from loop counters.
    pub fn from_stats(stats: &LoopStats, running: bool) -> Self {
        Self {
            running,
            ticks: stats.ticks,
            preview_frames: stats.preview_frames,
            captures: stats.captures_saved,
            capture_failures: stats.capture_failures,
            events_dispatched: stats.events_dispatched,
            events_discarded: stats.events_discarded,
        }
    }
}

/// Prometheus metrics registry for the booth.
///
/// All handles are atomics, so the registry can be shared between the loop
/// thread and the exporter behind an `Arc`.
pub struct MetricsRegistry {
    registry: Registry,

    running: IntGauge,
    ticks_total: IntCounter,
    preview_frames_total: IntCounter,
    captures_total: IntCounter,
    capture_failures_total: IntCounter,
    events_dispatched_total: IntCounter,
    events_discarded_total: IntCounter,
}

impl MetricsRegistry {
    /// Creates and registers all booth metrics.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let running = IntGauge::new(
            "photobooth_running",
            "Whether the capture loop is running (1) or stopped (0)",
        )?;
        let ticks_total = IntCounter::new(
            "photobooth_ticks_total",
            "Total capture loop iterations",
        )?;
        let preview_frames_total = IntCounter::new(
            "photobooth_preview_frames_total",
            "Total camera frames shown in the preview",
        )?;
        let captures_total = IntCounter::new(
            "photobooth_captures_total",
            "Total captures written to storage",
        )?;
        let capture_failures_total = IntCounter::new(
            "photobooth_capture_failures_total",
            "Total captures dropped because of camera or storage failures",
        )?;
        let events_dispatched_total = IntCounter::new(
            "photobooth_events_dispatched_total",
            "Total capture and quit events handled",
        )?;
        let events_discarded_total = IntCounter::new(
            "photobooth_events_discarded_total",
            "Total events discarded after shutdown began",
        )?;

        registry.register(Box::new(running.clone()))?;
        registry.register(Box::new(ticks_total.clone()))?;
        registry.register(Box::new(preview_frames_total.clone()))?;
        registry.register(Box::new(captures_total.clone()))?;
        registry.register(Box::new(capture_failures_total.clone()))?;
        registry.register(Box::new(events_dispatched_total.clone()))?;
        registry.register(Box::new(events_discarded_total.clone()))?;

        Ok(Self {
            registry,
            running,
            ticks_total,
            preview_frames_total,
            captures_total,
            capture_failures_total,
            events_dispatched_total,
            events_discarded_total,
        })
    }

    /// Updates all metrics from a snapshot of loop state.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.running.set(if snapshot.running { 1 } else { 0 });

        // Counters only move forward; add the difference.
        advance(&self.ticks_total, snapshot.ticks);
        advance(&self.preview_frames_total, snapshot.preview_frames);
        advance(&self.captures_total, snapshot.captures);
        advance(&self.capture_failures_total, snapshot.capture_failures);
        advance(&self.events_dispatched_total, snapshot.events_dispatched);
        advance(&self.events_discarded_total, snapshot.events_discarded);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = MetricsRegistry::new();
        assert!(registry.is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();

        let snapshot = MetricsSnapshot {
            running: true,
            ticks: 120,
            preview_frames: 118,
            captures: 2,
            capture_failures: 1,
            events_dispatched: 3,
            events_discarded: 0,
        };
        registry.update(&snapshot);

        let output = registry.encode().unwrap();
        assert!(output.contains("photobooth_running 1"));
        assert!(output.contains("photobooth_ticks_total 120"));
        assert!(output.contains("photobooth_captures_total 2"));
        assert!(output.contains("photobooth_capture_failures_total 1"));
    }

    #[test]
    fn test_counters_never_decrease() {
        let registry = MetricsRegistry::new().unwrap();
        registry.update(&MetricsSnapshot {
            ticks: 10,
            ..Default::default()
        });
        registry.update(&MetricsSnapshot {
            ticks: 4,
            ..Default::default()
        });

        let output = registry.encode().unwrap();
        assert!(output.contains("photobooth_ticks_total 10"));
        assert!(output.contains("photobooth_running 0"));
    }
}
