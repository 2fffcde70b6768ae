//! Calibration and classification constants for [`PerceptionPipeline`].
//!
//! Every constant the pipeline uses lives in [`PerceptionConfig`], so tests
//! and hosts can substitute synthetic values without touching pipeline
//! logic.  The defaults are calibrated for a 320×160 forward camera.
//!
//! [`PerceptionPipeline`]: crate::pipeline::PerceptionPipeline

use rover_types::RoverError;
use serde::{Deserialize, Serialize};

use crate::classify::{
    ChannelThresholds, NAVIGABLE_THRESHOLDS, OBSTACLE_BAND, ObstacleBand, TARGET_THRESHOLDS,
};
use crate::rectify::Quad;

/// Default camera frame width (pixels).
pub const FRAME_WIDTH: usize = 320;
/// Default camera frame height (pixels).
pub const FRAME_HEIGHT: usize = 160;

/// Ground quad in the raw frame: bottom-left, bottom-right, top-right,
/// top-left.
pub const SOURCE_QUAD: Quad = [[14.0, 140.0], [301.0, 140.0], [200.0, 96.0], [118.0, 96.0]];

/// Half the side of the destination square (pixels).  One destination
/// square covers one world cell.
pub const DST_HALF_SIZE: f64 = 5.0;

/// Gap between the destination square and the bottom edge of the frame; the
/// camera cannot see the ground directly under the observer.
pub const BOTTOM_OFFSET: f64 = 6.0;

/// World grid side length (cells).
pub const WORLD_SIZE: usize = 200;

/// Rectified pixels per world cell.
pub const WORLD_SCALE: f64 = 2.0 * DST_HALF_SIZE;

/// Intensity written to the visualization buffer for a set mask cell.
pub const VISION_INTENSITY: u8 = 128;

/// Complete configuration of a perception pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerceptionConfig {
    /// Expected frame width; other widths are rejected.
    pub frame_width: usize,
    /// Expected frame height; other heights are rejected.
    pub frame_height: usize,
    pub source_quad: Quad,
    /// Explicit destination quad.  When absent it is derived from the frame
    /// size; see [`PerceptionConfig::dest_quad`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dest_quad: Option<Quad>,
    pub nav_thresholds: ChannelThresholds,
    pub target_thresholds: ChannelThresholds,
    pub obstacle_band: ObstacleBand,
    pub grid_size: usize,
    /// Rectified pixels per world cell.
    pub scale: f64,
    pub vision_intensity: u8,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self::for_frame(FRAME_WIDTH, FRAME_HEIGHT)
    }
}

impl PerceptionConfig {
    /// Defaults for a `width × height` frame, with the destination square
    /// placed at the bottom-centre of the frame.
    pub fn for_frame(width: usize, height: usize) -> Self {
        Self {
            frame_width: width,
            frame_height: height,
            source_quad: SOURCE_QUAD,
            dest_quad: None,
            nav_thresholds: NAVIGABLE_THRESHOLDS,
            target_thresholds: TARGET_THRESHOLDS,
            obstacle_band: OBSTACLE_BAND,
            grid_size: WORLD_SIZE,
            scale: WORLD_SCALE,
            vision_intensity: VISION_INTENSITY,
        }
    }

    /// Destination quad used for rectification: the explicit one if set,
    /// otherwise a [`DST_HALF_SIZE`] square [`BOTTOM_OFFSET`] pixels above
    /// the bottom centre of the configured frame.
    pub fn dest_quad(&self) -> Quad {
        self.dest_quad.unwrap_or_else(|| {
            dest_quad_for(self.frame_width, self.frame_height, DST_HALF_SIZE, BOTTOM_OFFSET)
        })
    }

    /// Check the structural invariants the pipeline relies on.
    ///
    /// Quad degeneracy is checked separately when the rectifier is built.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::Config`] describing the first violation found.
    pub fn validate(&self) -> Result<(), RoverError> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(RoverError::Config(format!(
                "frame dimensions must be nonzero, got {}x{}",
                self.frame_width, self.frame_height
            )));
        }
        if self.grid_size == 0 {
            return Err(RoverError::Config("grid_size must be at least 1".to_string()));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(RoverError::Config(format!(
                "scale must be finite and positive, got {}",
                self.scale
            )));
        }
        let dest = self.dest_quad();
        let quads = self.source_quad.iter().chain(&dest);
        if quads.flatten().any(|c| !c.is_finite()) {
            return Err(RoverError::Config("quad corners must be finite".to_string()));
        }
        let (lo, hi) = (self.obstacle_band.low, self.obstacle_band.high);
        if lo.r > hi.r || lo.g > hi.g || lo.b > hi.b {
            return Err(RoverError::Config(format!(
                "obstacle band low {lo:?} exceeds high {hi:?}"
            )));
        }
        Ok(())
    }
}

/// Destination square of side `2 * half_size`, horizontally centred and
/// `bottom_offset` pixels above the bottom edge.  Same winding as
/// [`SOURCE_QUAD`].
pub fn dest_quad_for(width: usize, height: usize, half_size: f64, bottom_offset: f64) -> Quad {
    let cx = width as f64 / 2.0;
    let bottom = height as f64 - bottom_offset;
    let top = height as f64 - 2.0 * half_size - bottom_offset;
    [
        [cx - half_size, bottom],
        [cx + half_size, bottom],
        [cx + half_size, top],
        [cx - half_size, top],
    ]
}
