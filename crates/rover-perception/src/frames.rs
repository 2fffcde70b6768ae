//! Coordinate frame conversions.
//!
//! Three frames appear in the pipeline:
//!
//! - **image** – `(row, col)` with row 0 at the top of the frame.
//! - **observer** – Cartesian, origin at the bottom-centre of the frame.
//!   `+x` points forward (up the image), `+y` points to the observer's left.
//! - **polar** – `(distance, bearing)` in the observer frame, bearing in
//!   radians measured from `+x` toward `+y`, range `(−π, π]`.
//!
//! # Example
//!
//! ```rust
//! use rover_perception::frames::{to_observer_frame, to_polar};
//! use rover_perception::image::BinaryMask;
//!
//! let mut mask = BinaryMask::new(10, 10);
//! mask.set(0, 0, true);
//!
//! let pts = to_observer_frame(&mask);
//! assert_eq!((pts.x[0], pts.y[0]), (10.0, 10.0));
//!
//! let polar = to_polar(&pts);
//! assert!((polar.angle[0] - std::f64::consts::FRAC_PI_4).abs() < 1e-12);
//! ```

use std::f64::consts::PI;

use crate::image::BinaryMask;

/// Observer-centred Cartesian points, one entry per classified pixel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObserverPoints {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl ObserverPoints {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

/// Polar description of observer points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolarPoints {
    pub dist: Vec<f64>,
    pub angle: Vec<f64>,
}

impl PolarPoints {
    pub fn len(&self) -> usize {
        self.dist.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dist.is_empty()
    }
}

/// Convert every set cell of `mask` into observer coordinates.
///
/// `x = rows − row` and `y = −(col − rows)`.  The lateral offset is taken
/// relative to the row count, not half the width; world projection depends on
/// exactly this frame.
pub fn to_observer_frame(mask: &BinaryMask) -> ObserverPoints {
    let rows = mask.height() as f64;
    let (x, y) = mask
        .set_cells()
        .map(|(row, col)| ((rows - row as f64).abs(), -(col as f64 - rows)))
        .unzip();
    ObserverPoints { x, y }
}

/// Cartesian → polar.
pub fn to_polar(points: &ObserverPoints) -> PolarPoints {
    let (dist, angle) = points
        .iter()
        .map(|(x, y)| ((x * x + y * y).sqrt(), bearing(x, y)))
        .unzip();
    PolarPoints { dist, angle }
}

/// `atan2` folded into `(−π, π]`: a point straight behind on the negative-zero
/// side of the axis reports `+π` like its positive-zero twin.
fn bearing(x: f64, y: f64) -> f64 {
    let a = y.atan2(x);
    if a == -PI { PI } else { a }
}

/// Polar → Cartesian.
pub fn from_polar(polar: &PolarPoints) -> ObserverPoints {
    let (x, y) = polar
        .dist
        .iter()
        .zip(&polar.angle)
        .map(|(d, a)| (d * a.cos(), d * a.sin()))
        .unzip();
    ObserverPoints { x, y }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    fn mask_with(width: usize, height: usize, cells: &[(usize, usize)]) -> BinaryMask {
        let mut mask = BinaryMask::new(width, height);
        for &(r, c) in cells {
            mask.set(r, c, true);
        }
        mask
    }

    // ── Mask → observer ─────────────────────────────────────────────────────

    #[test]
    fn top_left_pixel_of_square_frame() {
        let pts = to_observer_frame(&mask_with(10, 10, &[(0, 0)]));
        assert_eq!(pts.x, vec![10.0]);
        assert_eq!(pts.y, vec![10.0]);
    }

    #[test]
    fn lateral_offset_uses_row_count() {
        // Non-square frame: y is zero at col == rows, whatever the width.
        let pts = to_observer_frame(&mask_with(30, 10, &[(9, 10), (9, 25)]));
        assert_eq!(pts.x, vec![1.0, 1.0]);
        assert_eq!(pts.y, vec![0.0, -15.0]);
    }

    #[test]
    fn points_follow_row_major_order() {
        let pts = to_observer_frame(&mask_with(4, 4, &[(3, 1), (0, 2), (0, 1)]));
        assert_eq!(pts.x, vec![4.0, 4.0, 1.0]);
        assert_eq!(pts.y, vec![3.0, 2.0, 3.0]);
    }

    #[test]
    fn empty_mask_yields_empty_points() {
        let pts = to_observer_frame(&BinaryMask::new(5, 5));
        assert!(pts.is_empty());
        assert!(to_polar(&pts).is_empty());
    }

    // ── Polar ───────────────────────────────────────────────────────────────

    #[test]
    fn polar_of_axis_points() {
        let pts = ObserverPoints {
            x: vec![3.0, 0.0, -2.0],
            y: vec![0.0, 4.0, 0.0],
        };
        let polar = to_polar(&pts);
        assert!((polar.dist[0] - 3.0).abs() < 1e-12);
        assert!(polar.angle[0].abs() < 1e-12);
        assert!((polar.dist[1] - 4.0).abs() < 1e-12);
        assert!((polar.angle[1] - FRAC_PI_2).abs() < 1e-12);
        // Directly behind lands on +π, never −π.
        assert!((polar.angle[2] - PI).abs() < 1e-12);
    }

    #[test]
    fn negative_zero_behind_stays_in_range() {
        let pts = ObserverPoints {
            x: vec![-2.0, -2.0],
            y: vec![-0.0, 0.0],
        };
        let polar = to_polar(&pts);
        assert_eq!(polar.angle, vec![PI, PI]);
        assert!((polar.dist[0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn bearing_is_positive_to_the_left() {
        let pts = to_observer_frame(&mask_with(20, 10, &[(0, 0), (0, 19)]));
        let polar = to_polar(&pts);
        assert!((polar.angle[0] - FRAC_PI_4).abs() < 1e-12);
        assert!(polar.angle[1] < 0.0);
    }

    #[test]
    fn single_pixel_roundtrip_through_polar() {
        for &(r, c) in &[(0, 0), (5, 3), (9, 9), (2, 17)] {
            let pts = to_observer_frame(&mask_with(20, 10, &[(r, c)]));
            let back = from_polar(&to_polar(&pts));
            assert!((back.x[0] - pts.x[0]).abs() < 1e-9, "x mismatch for ({r}, {c})");
            assert!((back.y[0] - pts.y[0]).abs() < 1e-9, "y mismatch for ({r}, {c})");
        }
    }
}
