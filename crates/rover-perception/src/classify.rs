//! Color classification.
//!
//! Each class is a conjunction of three per-channel comparisons evaluated
//! independently on every pixel:
//!
//! | Class | Predicate |
//! |---|---|
//! | navigable | `R > t.r && G > t.g && B > t.b` |
//! | target    | `R > t.r && G > t.g && B < t.b` |
//! | obstacle  | `low <= C < high` for every channel `C` |

use serde::{Deserialize, Serialize};

use crate::image::{BinaryMask, RgbImage};

/// Default navigable-terrain thresholds: bright, fairly uniform ground.
pub const NAVIGABLE_THRESHOLDS: ChannelThresholds = ChannelThresholds::new(160, 160, 160);

/// Default target thresholds: a yellow object against bluish-grey terrain.
pub const TARGET_THRESHOLDS: ChannelThresholds = ChannelThresholds::new(160, 160, 140);

/// Default obstacle band: dark but not black.
pub const OBSTACLE_BAND: ObstacleBand = ObstacleBand {
    low: ChannelThresholds::new(1, 1, 1),
    high: ChannelThresholds::new(130, 140, 140),
};

/// One threshold per RGB channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelThresholds {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ChannelThresholds {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Closed-open per-channel band `[low, high)`.
///
/// Blue's upper bound is independent of green's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleBand {
    pub low: ChannelThresholds,
    pub high: ChannelThresholds,
}

/// Pixels strictly brighter than `t` in all three channels.
pub fn navigable_mask(image: &RgbImage, t: ChannelThresholds) -> BinaryMask {
    BinaryMask::from_predicate(image, |[r, g, b]| r > t.r && g > t.g && b > t.b)
}

/// Pixels with strong red and green but weak blue.
pub fn target_mask(image: &RgbImage, t: ChannelThresholds) -> BinaryMask {
    BinaryMask::from_predicate(image, |[r, g, b]| r > t.r && g > t.g && b < t.b)
}

/// Pixels inside `band` on every channel.
pub fn obstacle_mask(image: &RgbImage, band: ObstacleBand) -> BinaryMask {
    let (lo, hi) = (band.low, band.high);
    let below = BinaryMask::from_predicate(image, |[r, g, b]| r < hi.r && g < hi.g && b < hi.b);
    let above = BinaryMask::from_predicate(image, |[r, g, b]| r >= lo.r && g >= lo.g && b >= lo.b);
    below.and(&above)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(rgb: [u8; 3]) -> RgbImage {
        RgbImage::filled(1, 1, rgb)
    }

    #[test]
    fn single_bright_pixel_in_dark_frame() {
        let mut img = RgbImage::new(10, 10);
        img.set_pixel(0, 0, [200, 200, 200]);
        let mask = navigable_mask(&img, NAVIGABLE_THRESHOLDS);
        assert_eq!(mask.count(), 1);
        assert_eq!(mask.get(0, 0), 1);
    }

    #[test]
    fn navigable_comparison_is_strict() {
        assert_eq!(navigable_mask(&single([160, 200, 200]), NAVIGABLE_THRESHOLDS).count(), 0);
        assert_eq!(navigable_mask(&single([161, 161, 161]), NAVIGABLE_THRESHOLDS).count(), 1);
    }

    #[test]
    fn raising_navigable_threshold_never_adds_pixels() {
        let mut img = RgbImage::new(16, 16);
        for r in 0..16 {
            for c in 0..16 {
                img.set_pixel(r, c, [(r * 16) as u8, (c * 16) as u8, ((r * c) % 256) as u8]);
            }
        }
        let base = navigable_mask(&img, ChannelThresholds::new(100, 100, 100));
        for raised in [
            ChannelThresholds::new(150, 100, 100),
            ChannelThresholds::new(100, 150, 100),
            ChannelThresholds::new(100, 100, 150),
        ] {
            let stricter = navigable_mask(&img, raised);
            assert!(stricter.count() <= base.count());
            for (r, c) in stricter.set_cells() {
                assert_eq!(base.get(r, c), 1, "({r}, {c}) appeared after raising");
            }
        }
    }

    #[test]
    fn target_isolates_yellow() {
        assert_eq!(target_mask(&single([220, 200, 30]), TARGET_THRESHOLDS).count(), 1);
        // Bright grey ground is not a target.
        assert_eq!(target_mask(&single([200, 200, 200]), TARGET_THRESHOLDS).count(), 0);
        // Blue exactly at threshold fails the strict "below".
        assert_eq!(target_mask(&single([200, 200, 140]), TARGET_THRESHOLDS).count(), 0);
    }

    #[test]
    fn obstacle_band_is_closed_open() {
        assert_eq!(obstacle_mask(&single([1, 1, 1]), OBSTACLE_BAND).count(), 1);
        assert_eq!(obstacle_mask(&single([0, 50, 50]), OBSTACLE_BAND).count(), 0);
        assert_eq!(obstacle_mask(&single([129, 139, 139]), OBSTACLE_BAND).count(), 1);
        assert_eq!(obstacle_mask(&single([130, 50, 50]), OBSTACLE_BAND).count(), 0);
        assert_eq!(obstacle_mask(&single([50, 50, 140]), OBSTACLE_BAND).count(), 0);
    }

    #[test]
    fn obstacle_blue_high_is_independent_of_green() {
        let band = ObstacleBand {
            low: ChannelThresholds::new(1, 1, 1),
            high: ChannelThresholds::new(130, 140, 100),
        };
        assert_eq!(obstacle_mask(&single([50, 120, 120]), band).count(), 0);
        assert_eq!(obstacle_mask(&single([50, 120, 90]), band).count(), 1);
    }

    #[test]
    fn black_frame_matches_nothing() {
        let img = RgbImage::new(8, 8);
        assert!(navigable_mask(&img, NAVIGABLE_THRESHOLDS).is_empty());
        assert!(target_mask(&img, TARGET_THRESHOLDS).is_empty());
        assert!(obstacle_mask(&img, OBSTACLE_BAND).is_empty());
    }
}
