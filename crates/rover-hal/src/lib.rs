//! `rover-hal` – image-capture hardware abstraction.
//!
//! # Modules
//!
//! - [`camera`] – the [`Camera`][camera::Camera] driver trait and the raw
//!   [`CameraFrame`][camera::CameraFrame] it yields.
//! - [`sim`] – [`SimCamera`][sim::SimCamera], a deterministic synthetic
//!   terrain camera for CI and demos, and
//!   [`ReplayCamera`][sim::ReplayCamera] for scripted frame sequences.

pub mod camera;
pub mod sim;

pub use camera::{Camera, CameraFrame};
