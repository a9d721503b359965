//! Prometheus metrics exporter for the capture loop.
//!
//! # Metrics Exposed
//!
//! - `photobooth_running` - 1 while the capture loop runs, 0 after teardown
//! - `photobooth_ticks_total` - Loop iterations
//! - `photobooth_preview_frames_total` - Camera frames shown in the preview
//! - `photobooth_captures_total` - Captures written to storage
//! - `photobooth_capture_failures_total` - Captures dropped
//! - `photobooth_events_dispatched_total` - Capture and quit events handled
//! - `photobooth_events_discarded_total` - Events thrown away after quit
//!
//! The HTTP exporter is behind the `metrics` feature.

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, ServerError};
