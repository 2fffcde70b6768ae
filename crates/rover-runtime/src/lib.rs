//! `rover-runtime` – hosts the perception pipeline in a control loop.
//!
//! # Modules
//!
//! - [`perception_loop`] – [`PerceptionLoop`][perception_loop::PerceptionLoop]:
//!   captures a frame each tick, runs it through the
//!   [`PerceptionPipeline`][rover_perception::PerceptionPipeline], folds the
//!   evidence into a [`SharedWorldGrid`][perception_loop::SharedWorldGrid],
//!   and publishes a [`NavigationSummary`][rover_types::NavigationSummary]
//!   for the motion planner.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]:
//!   initialises the global `tracing` subscriber with an optional OTLP span
//!   exporter.  Set `OTEL_EXPORTER_OTLP_ENDPOINT` to enable live trace export
//!   to Jaeger, Grafana Tempo, or any OTLP-compatible collector.

pub mod perception_loop;
pub mod telemetry;

pub use perception_loop::{LoopStats, PerceptionLoop, SharedWorldGrid, tick_period};
pub use telemetry::{init_tracing, TracerProviderGuard};
