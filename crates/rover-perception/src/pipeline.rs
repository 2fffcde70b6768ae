//! [`PerceptionPipeline`] – per-frame orchestration.
//!
//! Each call to [`PerceptionPipeline::process`]:
//!
//! 1. **Rectify** the raw frame into a top-down view.
//! 2. **Classify** navigable terrain on the rectified view, and target /
//!    obstacle signatures on the raw frame.
//! 3. **Transform** each mask into observer coordinates.
//! 4. **Project** observer points into world-grid indices under the pose.
//! 5. **Accumulate** one count per detected pixel in the matching
//!    [`WorldGrid`] channel.
//! 6. **Summarise** navigable terrain as polar (distance, bearing) pairs.
//! 7. **Paint** the three masks into the caller's visualization buffer.
//!
//! All preconditions are checked before any state is touched, so a rejected
//! frame leaves the grid and the buffer exactly as they were.
//!
//! # Example
//!
//! ```rust
//! use rover_perception::config::PerceptionConfig;
//! use rover_perception::image::RgbImage;
//! use rover_perception::pipeline::PerceptionPipeline;
//! use rover_perception::world_grid::{Channel, WorldGrid};
//! use rover_types::Pose;
//!
//! let config = PerceptionConfig::default();
//! let pipeline = PerceptionPipeline::new(config.clone()).unwrap();
//!
//! let mut grid = WorldGrid::new(config.grid_size);
//! let mut vision = RgbImage::new(config.frame_width, config.frame_height);
//! let frame = RgbImage::filled(config.frame_width, config.frame_height, [90, 90, 90]);
//!
//! let out = pipeline
//!     .process(&frame, &Pose::new(100.0, 100.0, 0.0), &mut grid, &mut vision)
//!     .unwrap();
//! assert!(out.navigable.is_empty());
//! assert!(grid.total(Channel::Obstacle) > 0);
//! ```

use rover_types::{Pose, RoverError};
use tracing::{debug, instrument};

use crate::classify::{navigable_mask, obstacle_mask, target_mask};
use crate::config::PerceptionConfig;
use crate::frames::{PolarPoints, to_observer_frame, to_polar};
use crate::image::{BinaryMask, RgbImage};
use crate::projector::{GridIndices, WorldProjector};
use crate::rectify::PerspectiveRectifier;
use crate::world_grid::{Channel, WorldGrid};

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// World cells and raw mask of the target seen in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetDetection {
    pub cells: GridIndices,
    pub mask: BinaryMask,
}

impl TargetDetection {
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Pixels classified per class in one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub navigable: usize,
    pub obstacle: usize,
    pub target: usize,
}

/// Everything one frame produces besides the grid / buffer mutations.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutput {
    /// Navigable terrain in polar form, for the motion planner.
    pub navigable: PolarPoints,
    pub target: TargetDetection,
    pub counts: ClassCounts,
}

// ────────────────────────────────────────────────────────────────────────────
// PerceptionPipeline
// ────────────────────────────────────────────────────────────────────────────

/// Stateless per-frame perception.  The only cross-frame state, the
/// [`WorldGrid`], is owned by the caller and passed in on every call.
#[derive(Debug, Clone)]
pub struct PerceptionPipeline {
    config: PerceptionConfig,
    rectifier: PerspectiveRectifier,
    projector: WorldProjector,
}

impl PerceptionPipeline {
    /// Validate `config` and solve the rectification geometry.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::Config`] for invalid constants and
    /// [`RoverError::DegenerateCalibration`] for degenerate quads.
    pub fn new(config: PerceptionConfig) -> Result<Self, RoverError> {
        config.validate()?;
        let rectifier = PerspectiveRectifier::new(config.source_quad, config.dest_quad())?;
        let projector = WorldProjector::new(config.grid_size, config.scale);
        Ok(Self {
            config,
            rectifier,
            projector,
        })
    }

    pub fn config(&self) -> &PerceptionConfig {
        &self.config
    }

    /// Run one frame through the pipeline.
    ///
    /// `vision` must have the frame's dimensions; its channels are
    /// overwritten with obstacle (R), target (G) and navigable (B) masks
    /// scaled by the configured intensity.
    ///
    /// # Errors
    ///
    /// - [`RoverError::InvalidImage`] if `image` or `vision` do not match the
    ///   configured frame size.
    /// - [`RoverError::InvalidPose`] if `pose` is not finite.
    /// - [`RoverError::Config`] if `grid` does not match the configured size.
    #[instrument(skip_all, fields(x = pose.x, y = pose.y, yaw_deg = pose.yaw_deg))]
    pub fn process(
        &self,
        image: &RgbImage,
        pose: &Pose,
        grid: &mut WorldGrid,
        vision: &mut RgbImage,
    ) -> Result<FrameOutput, RoverError> {
        self.check_preconditions(image, pose, grid, vision)?;

        let rectified = self.rectifier.rectify(image);
        let navigable = navigable_mask(&rectified, self.config.nav_thresholds);
        let target = target_mask(image, self.config.target_thresholds);
        let obstacle = obstacle_mask(image, self.config.obstacle_band);

        let counts = ClassCounts {
            navigable: navigable.count(),
            obstacle: obstacle.count(),
            target: target.count(),
        };
        debug!(
            navigable = counts.navigable,
            obstacle = counts.obstacle,
            target = counts.target,
            "classified frame"
        );

        let nav_points = to_observer_frame(&navigable);
        let nav_cells = self.projector.project(&nav_points, pose);
        let target_cells = self.projector.project(&to_observer_frame(&target), pose);
        let obstacle_cells = self.projector.project(&to_observer_frame(&obstacle), pose);

        grid.accumulate(Channel::Obstacle, &obstacle_cells);
        grid.accumulate(Channel::Target, &target_cells);
        grid.accumulate(Channel::Navigable, &nav_cells);

        paint_vision(vision, [&obstacle, &target, &navigable], self.config.vision_intensity);

        Ok(FrameOutput {
            navigable: to_polar(&nav_points),
            target: TargetDetection {
                cells: target_cells,
                mask: target,
            },
            counts,
        })
    }

    fn check_preconditions(
        &self,
        image: &RgbImage,
        pose: &Pose,
        grid: &WorldGrid,
        vision: &RgbImage,
    ) -> Result<(), RoverError> {
        let expected = (self.config.frame_width, self.config.frame_height);
        for (name, img) in [("frame", image), ("vision buffer", vision)] {
            if (img.width(), img.height()) != expected {
                return Err(RoverError::InvalidImage(format!(
                    "{name} is {}x{}, expected {}x{}",
                    img.width(),
                    img.height(),
                    expected.0,
                    expected.1
                )));
            }
        }
        pose.validate()?;
        if grid.size() != self.config.grid_size {
            return Err(RoverError::Config(format!(
                "world grid is {0}x{0}, pipeline projects into {1}x{1}",
                grid.size(),
                self.config.grid_size
            )));
        }
        Ok(())
    }
}

/// Overwrite `vision` so channel `i` holds `masks[i] * intensity`.
fn paint_vision(vision: &mut RgbImage, masks: [&BinaryMask; 3], intensity: u8) {
    for row in 0..vision.height() {
        for col in 0..vision.width() {
            let px = masks.map(|m| m.get(row, col) * intensity);
            vision.set_pixel(row, col, px);
        }
    }
}
