//! `rover-perception` – camera-to-map perception front-end.
//!
//! Turns one forward camera frame plus the observer's pose into evidence for
//! a persistent world map (navigable terrain, obstacles, target object) and a
//! polar summary of navigable directions for the motion planner.
//!
//! # Modules
//!
//! - [`image`] – [`RgbImage`][image::RgbImage] and
//!   [`BinaryMask`][image::BinaryMask] frame containers.
//! - [`rectify`] – [`PerspectiveRectifier`][rectify::PerspectiveRectifier]:
//!   four-point homography warp into a top-down view.
//! - [`classify`] – per-channel color threshold predicates for the three
//!   terrain classes.
//! - [`frames`] – image → observer-centred Cartesian → polar conversions.
//! - [`projector`] – [`WorldProjector`][projector::WorldProjector]: rotate,
//!   scale, translate and clip observer points into world-grid indices.
//! - [`world_grid`] – [`WorldGrid`][world_grid::WorldGrid]: three-channel
//!   evidence accumulator.
//! - [`config`] – [`PerceptionConfig`][config::PerceptionConfig]: every
//!   calibration and threshold constant in one place.
//! - [`pipeline`] – [`PerceptionPipeline`][pipeline::PerceptionPipeline]:
//!   per-frame orchestration.

pub mod classify;
pub mod config;
pub mod frames;
pub mod image;
pub mod pipeline;
pub mod projector;
pub mod rectify;
pub mod world_grid;

pub use config::PerceptionConfig;
pub use pipeline::{FrameOutput, PerceptionPipeline, TargetDetection};
pub use world_grid::{Channel, WorldGrid};
