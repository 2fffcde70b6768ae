//! Simulated cameras for headless runs and CI without physical hardware.
//!
//! [`SimCamera`] renders a fixed synthetic terrain scene: dark rock walls
//! above a horizon row, bright sand below it, and an optional yellow target
//! patch.  [`ReplayCamera`] plays back a scripted list of frames.
//!
//! # Example
//!
//! ```rust
//! use rover_hal::camera::Camera;
//! use rover_hal::sim::SimCamera;
//!
//! let mut cam = SimCamera::new("front_rgb", 320, 160)
//!     .with_horizon(90)
//!     .with_target(100, 200, 6);
//!
//! let frame = cam.capture().unwrap();
//! assert_eq!(frame.data.len(), 320 * 160 * 3);
//! ```

use std::collections::VecDeque;

use rover_types::RoverError;
use tracing::debug;

use crate::camera::{Camera, CameraFrame};

/// Bright sand: passes the default navigable thresholds.
pub const GROUND_RGB: [u8; 3] = [205, 190, 175];
/// Dark rock: inside the default obstacle band.
pub const ROCK_RGB: [u8; 3] = [85, 70, 60];
/// Yellow sample: passes the default target thresholds.
pub const TARGET_RGB: [u8; 3] = [220, 190, 40];

// ────────────────────────────────────────────────────────────────────────────
// SimCamera
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TargetPatch {
    row: u32,
    col: u32,
    size: u32,
}

/// Synthetic terrain camera.  Every capture returns the same frame.
#[derive(Debug, Clone)]
pub struct SimCamera {
    id: String,
    width: u32,
    height: u32,
    horizon: u32,
    target: Option<TargetPatch>,
    frames_captured: u64,
}

impl SimCamera {
    /// A camera whose horizon sits at mid-frame, with no target.
    pub fn new(id: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
            horizon: height / 2,
            target: None,
            frames_captured: 0,
        }
    }

    /// Rows above `row` are rock, rows at or below are ground.
    pub fn with_horizon(mut self, row: u32) -> Self {
        self.horizon = row.min(self.height);
        self
    }

    /// Paint a `size × size` target patch with its top-left corner at
    /// `(row, col)`, clipped to the frame.
    pub fn with_target(mut self, row: u32, col: u32, size: u32) -> Self {
        self.target = Some(TargetPatch { row, col, size });
        self
    }

    pub fn frames_captured(&self) -> u64 {
        self.frames_captured
    }

    fn render(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for row in 0..self.height {
            for col in 0..self.width {
                let in_target = self.target.is_some_and(|t| {
                    (t.row..t.row.saturating_add(t.size)).contains(&row)
                        && (t.col..t.col.saturating_add(t.size)).contains(&col)
                });
                let px = if in_target {
                    TARGET_RGB
                } else if row < self.horizon {
                    ROCK_RGB
                } else {
                    GROUND_RGB
                };
                data.extend_from_slice(&px);
            }
        }
        data
    }
}

impl Camera for SimCamera {
    fn id(&self) -> &str {
        &self.id
    }

    fn capture(&mut self) -> Result<CameraFrame, RoverError> {
        self.frames_captured += 1;
        debug!(camera = %self.id, frame = self.frames_captured, "sim capture");
        Ok(CameraFrame {
            width: self.width,
            height: self.height,
            data: self.render(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ReplayCamera
// ────────────────────────────────────────────────────────────────────────────

/// Plays back a fixed sequence of frames.
///
/// Once the sequence is exhausted, a looping camera starts over and a
/// non-looping one reports [`RoverError::HardwareFault`].
#[derive(Debug, Clone)]
pub struct ReplayCamera {
    id: String,
    frames: VecDeque<CameraFrame>,
    looping: bool,
}

impl ReplayCamera {
    pub fn new(id: impl Into<String>, frames: impl IntoIterator<Item = CameraFrame>) -> Self {
        Self {
            id: id.into(),
            frames: frames.into_iter().collect(),
            looping: false,
        }
    }

    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl Camera for ReplayCamera {
    fn id(&self) -> &str {
        &self.id
    }

    fn capture(&mut self) -> Result<CameraFrame, RoverError> {
        let frame = self.frames.pop_front().ok_or_else(|| RoverError::HardwareFault {
            component: self.id.clone(),
            details: "replay sequence exhausted".to_string(),
        })?;
        if self.looping {
            self.frames.push_back(frame.clone());
        }
        Ok(frame)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
