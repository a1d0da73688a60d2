//! Observability: in-process metrics rendered for Prometheus scrapes.

pub mod metrics;

pub use metrics::{CounterVec, HistogramVec, MeterMetrics};
