//! Perspective rectification.
//!
//! Maps a quadrilateral of the forward-facing camera frame onto a top-down
//! rectangle using a projective transform solved from four point
//! correspondences.  Warping uses inverse mapping: every output pixel is
//! projected back into the source frame and sampled bilinearly, with samples
//! outside the source treated as black.
//!
//! Quadrilateral corners are `[x, y]` pairs in image space (`x` = column,
//! `y` = row) and must share one winding order between source and
//! destination, e.g. bottom-left, bottom-right, top-right, top-left.
//!
//! # Example
//!
//! ```rust
//! use rover_perception::image::RgbImage;
//! use rover_perception::rectify::PerspectiveRectifier;
//!
//! let quad = [[0.0, 9.0], [9.0, 9.0], [9.0, 0.0], [0.0, 0.0]];
//! let rectifier = PerspectiveRectifier::new(quad, quad).unwrap();
//!
//! let img = RgbImage::filled(10, 10, [50, 60, 70]);
//! assert_eq!(rectifier.rectify(&img), img);
//! ```

use nalgebra::{Matrix3, SMatrix, SVector, Vector3};
use rover_types::RoverError;

use crate::image::{CHANNELS, RgbImage};

/// Four image-space corners, `[x, y]` each.
pub type Quad = [[f64; 2]; 4];

/// Minimum |w| for a projected point to be considered finite.
const W_EPS: f64 = 1e-12;

/// Twice the triangle area below which three corners count as collinear.
const COLLINEAR_EPS: f64 = 1e-9;

// ────────────────────────────────────────────────────────────────────────────
// Homography
// ────────────────────────────────────────────────────────────────────────────

/// A 3×3 projective transform normalised so that `h33 = 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    matrix: Matrix3<f64>,
}

impl Homography {
    /// Solve the homography mapping each `from[i]` onto `to[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::DegenerateCalibration`] if three corners of either
    /// quad are collinear or the linear system is singular.
    pub fn from_correspondences(from: &Quad, to: &Quad) -> Result<Self, RoverError> {
        ensure_non_degenerate("source", from)?;
        ensure_non_degenerate("destination", to)?;

        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();
        for (i, (p, q)) in from.iter().zip(to).enumerate() {
            let (x, y) = (p[0], p[1]);
            let (u, v) = (q[0], q[1]);
            let r = 2 * i;
            a.row_mut(r)
                .copy_from_slice(&[x, y, 1.0, 0.0, 0.0, 0.0, -x * u, -y * u]);
            a.row_mut(r + 1)
                .copy_from_slice(&[0.0, 0.0, 0.0, x, y, 1.0, -x * v, -y * v]);
            b[r] = u;
            b[r + 1] = v;
        }

        let h = a.lu().solve(&b).ok_or_else(|| {
            RoverError::DegenerateCalibration("perspective system is singular".to_string())
        })?;
        if h.iter().any(|c| !c.is_finite()) {
            return Err(RoverError::DegenerateCalibration(
                "perspective solution is not finite".to_string(),
            ));
        }

        Ok(Self {
            matrix: Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0),
        })
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Project `(x, y)`.  Returns `None` when the point maps to infinity.
    pub fn apply(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let v = self.matrix * Vector3::new(x, y, 1.0);
        let w = v[2];
        if !w.is_finite() || w.abs() <= W_EPS {
            return None;
        }
        let (px, py) = (v[0] / w, v[1] / w);
        (px.is_finite() && py.is_finite()).then_some((px, py))
    }
}

fn ensure_non_degenerate(which: &str, quad: &Quad) -> Result<(), RoverError> {
    for i in 0..4 {
        let [a, b, c] = [quad[i], quad[(i + 1) % 4], quad[(i + 2) % 4]];
        let cross = (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0]);
        if !cross.is_finite() || cross.abs() < COLLINEAR_EPS {
            return Err(RoverError::DegenerateCalibration(format!(
                "{which} quad has collinear corners {a:?}, {b:?}, {c:?}"
            )));
        }
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// PerspectiveRectifier
// ────────────────────────────────────────────────────────────────────────────

/// Warps frames so that `source` quad content fills the `destination` quad.
///
/// Built once from calibration constants; [`PerspectiveRectifier::rectify`]
/// is then infallible.
#[derive(Debug, Clone)]
pub struct PerspectiveRectifier {
    /// Maps output pixels back into the source frame.
    inverse: Homography,
}

impl PerspectiveRectifier {
    /// # Errors
    ///
    /// Returns [`RoverError::DegenerateCalibration`] for degenerate quads.
    pub fn new(source: Quad, destination: Quad) -> Result<Self, RoverError> {
        let inverse = Homography::from_correspondences(&destination, &source)?;
        Ok(Self { inverse })
    }

    /// Produce the rectified view, same dimensions as `image`.
    pub fn rectify(&self, image: &RgbImage) -> RgbImage {
        let mut out = RgbImage::new(image.width(), image.height());
        for row in 0..image.height() {
            for col in 0..image.width() {
                if let Some((sx, sy)) = self.inverse.apply(col as f64, row as f64) {
                    out.set_pixel(row, col, sample_bilinear(image, sx, sy));
                }
            }
        }
        out
    }
}

/// Bilinear sample with a constant black border.
fn sample_bilinear(image: &RgbImage, x: f64, y: f64) -> [u8; 3] {
    let (x0, y0) = (x.floor(), y.floor());
    let (fx, fy) = (x - x0, y - y0);
    // Anything this far out has no in-frame neighbour.
    if x0 < -1.0 || y0 < -1.0 || x0 > image.width() as f64 || y0 > image.height() as f64 {
        return [0; 3];
    }
    let (c0, r0) = (x0 as isize, y0 as isize);

    let mut px = [0u8; 3];
    for (ch, slot) in px.iter_mut().enumerate().take(CHANNELS) {
        let at = |r: isize, c: isize| f64::from(image.channel_at(r, c, ch).unwrap_or(0));
        let top = at(r0, c0) * (1.0 - fx) + at(r0, c0 + 1) * fx;
        let bottom = at(r0 + 1, c0) * (1.0 - fx) + at(r0 + 1, c0 + 1) * fx;
        let value = top * (1.0 - fy) + bottom * fy;
        *slot = value.round().clamp(0.0, 255.0) as u8;
    }
    px
}
