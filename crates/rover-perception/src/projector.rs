//! Observer frame → world grid projection.
//!
//! Points are rotated by the observer's heading, divided by the
//! pixels-per-cell scale, translated by the observer's world position,
//! truncated toward zero and finally clipped into `[0, size − 1]` on each axis
//! independently.  Off-map detections are folded onto the nearest edge cell
//! rather than dropped.

use rover_types::Pose;

use crate::frames::ObserverPoints;

/// Parallel world-grid column (`x`) and row (`y`) indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridIndices {
    pub x: Vec<usize>,
    pub y: Vec<usize>,
}

impl GridIndices {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

/// Projects observer-centred points into a square world grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldProjector {
    grid_size: usize,
    scale: f64,
}

impl WorldProjector {
    /// `scale` is observer-frame units per world cell.
    pub fn new(grid_size: usize, scale: f64) -> Self {
        Self { grid_size, scale }
    }

    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Project every point under `pose`.
    pub fn project(&self, points: &ObserverPoints, pose: &Pose) -> GridIndices {
        let yaw = pose.yaw_deg * std::f64::consts::PI / 180.0;
        let (sin, cos) = yaw.sin_cos();
        let (x, y) = points
            .iter()
            .map(|(px, py)| {
                let wx = (px * cos - py * sin) / self.scale + pose.x;
                let wy = (px * sin + py * cos) / self.scale + pose.y;
                (self.clip(wx), self.clip(wy))
            })
            .unzip();
        GridIndices { x, y }
    }

    /// Truncate toward zero, then clamp into the grid.  NaN maps to 0.
    fn clip(&self, v: f64) -> usize {
        let max = self.grid_size.saturating_sub(1) as i64;
        (v.trunc() as i64).clamp(0, max) as usize
    }
}
