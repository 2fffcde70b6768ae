//! [`PerceptionLoop`] – drives the perception pipeline from a camera.
//!
//! Each tick captures one frame, runs it through [`PerceptionPipeline`] at
//! the current pose, folds the detections into the shared [`WorldGrid`] and
//! returns a [`NavigationSummary`] for the motion planner.
//!
//! A frame that fails (camera fault, wrong dimensions, bad pose) is counted
//! as skipped and leaves the grid untouched; the loop keeps running.
//!
//! # Example
//!
//! ```rust
//! use rover_hal::sim::SimCamera;
//! use rover_perception::PerceptionConfig;
//! use rover_runtime::PerceptionLoop;
//! use rover_types::Pose;
//!
//! let camera = SimCamera::new("front_rgb", 320, 160).with_horizon(90);
//! let mut perception = PerceptionLoop::new(PerceptionConfig::default(), Box::new(camera)).unwrap();
//! let summary = perception.tick(Pose::new(100.0, 100.0, 0.0)).unwrap();
//! assert!(!summary.nav_dists.is_empty());
//! ```

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use std::time::Duration;

use chrono::Utc;
use rover_hal::Camera;
use rover_perception::image::RgbImage;
use rover_perception::{FrameOutput, PerceptionConfig, PerceptionPipeline, WorldGrid};
use rover_types::{NavigationSummary, Pose, RoverError};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// World grid shared between the loop and any reader (planner, UI).
pub type SharedWorldGrid = Arc<Mutex<WorldGrid>>;

/// Frame counters since the loop was built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    pub frames_processed: u64,
    pub frames_skipped: u64,
}

pub struct PerceptionLoop {
    pipeline: PerceptionPipeline,
    camera: Box<dyn Camera>,
    grid: SharedWorldGrid,
    vision: RgbImage,
    stats: LoopStats,
}

impl PerceptionLoop {
    /// Build the pipeline and a fresh grid sized from `config`.
    ///
    /// # Errors
    ///
    /// Propagates configuration and calibration errors from
    /// [`PerceptionPipeline::new`].
    pub fn new(config: PerceptionConfig, camera: Box<dyn Camera>) -> Result<Self, RoverError> {
        let grid = Arc::new(Mutex::new(WorldGrid::new(config.grid_size)));
        let vision = RgbImage::new(config.frame_width, config.frame_height);
        let pipeline = PerceptionPipeline::new(config)?;
        Ok(Self {
            pipeline,
            camera,
            grid,
            vision,
            stats: LoopStats::default(),
        })
    }

    /// Accumulate into an existing grid instead of a fresh one.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::Config`] if the grid size does not match the
    /// pipeline configuration.
    pub fn with_grid(mut self, grid: SharedWorldGrid) -> Result<Self, RoverError> {
        let size = lock_grid(&grid).size();
        let expected = self.pipeline.config().grid_size;
        if size != expected {
            return Err(RoverError::Config(format!(
                "shared grid is {size} cells wide, expected {expected}"
            )));
        }
        self.grid = grid;
        Ok(self)
    }

    /// Handle to the shared grid.
    pub fn grid(&self) -> SharedWorldGrid {
        Arc::clone(&self.grid)
    }

    /// Visualization buffer of the last processed frame.
    pub fn vision(&self) -> &RgbImage {
        &self.vision
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Capture and process one frame at `pose`.
    ///
    /// # Errors
    ///
    /// Returns the camera or pipeline error for a skipped frame.  The grid
    /// and vision buffer are unchanged in that case.
    #[instrument(skip_all, fields(camera = %self.camera.id()))]
    pub fn tick(&mut self, pose: Pose) -> Result<NavigationSummary, RoverError> {
        match self.process_frame(&pose) {
            Ok(output) => {
                self.stats.frames_processed += 1;
                Ok(NavigationSummary {
                    frame_id: Uuid::new_v4(),
                    timestamp: Utc::now(),
                    nav_dists: output.navigable.dist,
                    nav_angles: output.navigable.angle,
                    target_pixels: output.counts.target,
                })
            }
            Err(e) => {
                self.stats.frames_skipped += 1;
                warn!(error = %e, skipped = self.stats.frames_skipped, "frame skipped");
                Err(e)
            }
        }
    }

    fn process_frame(&mut self, pose: &Pose) -> Result<FrameOutput, RoverError> {
        let frame = self.camera.capture()?;
        let image = RgbImage::from_rgb24(frame.width as usize, frame.height as usize, frame.data)?;
        let mut grid = lock_grid(&self.grid);
        self.pipeline.process(&image, pose, &mut grid, &mut self.vision)
    }

    /// Tick at `tick_hz` until `shutdown` is set or `max_ticks` ticks have
    /// run.  The pose is read from `poses` at every tick and each successful
    /// summary is published on `summaries`.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::Config`] if `tick_hz` has no usable period
    /// (see [`tick_period`]).  Per-frame failures never end the loop.
    pub async fn run(
        &mut self,
        poses: watch::Receiver<Pose>,
        summaries: watch::Sender<Option<NavigationSummary>>,
        shutdown: Arc<AtomicBool>,
        tick_hz: f64,
        max_ticks: Option<u64>,
    ) -> Result<LoopStats, RoverError> {
        let mut ticker = tokio::time::interval(tick_period(tick_hz)?);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut ticks = 0u64;
        while !shutdown.load(Ordering::SeqCst) {
            if max_ticks.is_some_and(|max| ticks >= max) {
                break;
            }
            ticker.tick().await;
            let pose = *poses.borrow();
            if let Ok(summary) = self.tick(pose) {
                summaries.send_replace(Some(summary));
            }
            ticks += 1;
        }

        info!(
            processed = self.stats.frames_processed,
            skipped = self.stats.frames_skipped,
            "perception loop stopped"
        );
        Ok(self.stats)
    }
}

/// Interval period for a loop running at `tick_hz`.
///
/// # Errors
///
/// Returns [`RoverError::Config`] unless the rate is finite, positive, and
/// yields a nonzero period that fits in a [`Duration`].
pub fn tick_period(tick_hz: f64) -> Result<Duration, RoverError> {
    let invalid = || RoverError::Config(format!("tick_hz {tick_hz} has no usable tick period"));
    if !tick_hz.is_finite() || tick_hz <= 0.0 {
        return Err(invalid());
    }
    match Duration::try_from_secs_f64(1.0 / tick_hz) {
        Ok(period) if !period.is_zero() => Ok(period),
        _ => Err(invalid()),
    }
}

/// A panic while holding the lock cannot leave the counters half-written in
/// a way that matters, so a poisoned grid is still usable.
fn lock_grid(grid: &SharedWorldGrid) -> std::sync::MutexGuard<'_, WorldGrid> {
    grid.lock().unwrap_or_else(|e| e.into_inner())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
