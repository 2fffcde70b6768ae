//! Frame containers: [`RgbImage`] for camera pixels and [`BinaryMask`] for
//! per-class classification results.
//!
//! Both are row-major and indexed `(row, col)`, with row 0 at the top of the
//! frame.

use rover_types::RoverError;

/// Number of channels per pixel (R, G, B).
pub const CHANNELS: usize = 3;

// ────────────────────────────────────────────────────────────────────────────
// RgbImage
// ────────────────────────────────────────────────────────────────────────────

/// An 8-bit RGB image stored as packed RGB24.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl RgbImage {
    /// An all-black image.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height * CHANNELS],
        }
    }

    /// Wrap a packed RGB24 buffer.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::InvalidImage`] if either dimension is zero or the
    /// buffer length is not `width * height * 3`.
    pub fn from_rgb24(width: usize, height: usize, data: Vec<u8>) -> Result<Self, RoverError> {
        if width == 0 || height == 0 {
            return Err(RoverError::InvalidImage(format!(
                "zero-sized frame {width}x{height}"
            )));
        }
        let expected = width
            .checked_mul(height)
            .and_then(|px| px.checked_mul(CHANNELS))
            .ok_or_else(|| {
                RoverError::InvalidImage(format!("frame size {width}x{height} overflows"))
            })?;
        if data.len() != expected {
            return Err(RoverError::InvalidImage(format!(
                "buffer holds {} bytes, {width}x{height} RGB24 needs {expected}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// An image where every pixel has the same value.
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let mut img = Self::new(width, height);
        for px in img.data.chunks_exact_mut(CHANNELS) {
            px.copy_from_slice(&rgb);
        }
        img
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw packed RGB24 bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Pixel at `(row, col)`.  Panics when out of bounds.
    pub fn pixel(&self, row: usize, col: usize) -> [u8; 3] {
        let i = self.offset(row, col);
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    pub fn set_pixel(&mut self, row: usize, col: usize, rgb: [u8; 3]) {
        let i = self.offset(row, col);
        self.data[i..i + CHANNELS].copy_from_slice(&rgb);
    }

    /// Single channel sample, or `None` outside the frame.
    pub(crate) fn channel_at(&self, row: isize, col: isize, channel: usize) -> Option<u8> {
        if row < 0 || col < 0 || row as usize >= self.height || col as usize >= self.width {
            return None;
        }
        Some(self.data[self.offset(row as usize, col as usize) + channel])
    }

    /// Iterate pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.data.chunks_exact(CHANNELS).map(|p| [p[0], p[1], p[2]])
    }

    fn offset(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.height && col < self.width,
            "pixel ({row}, {col}) outside {}x{} image",
            self.width,
            self.height
        );
        (row * self.width + col) * CHANNELS
    }
}

// ────────────────────────────────────────────────────────────────────────────
// BinaryMask
// ────────────────────────────────────────────────────────────────────────────

/// A single-channel mask whose cells are either 0 or 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl BinaryMask {
    /// An empty (all-zero) mask.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    /// Build a mask by evaluating `predicate` on every pixel of `image`.
    pub fn from_predicate(image: &RgbImage, predicate: impl Fn([u8; 3]) -> bool) -> Self {
        let cells = image.pixels().map(|px| u8::from(predicate(px))).collect();
        Self {
            width: image.width(),
            height: image.height(),
            cells,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row * self.width + col]
    }

    pub fn set(&mut self, row: usize, col: usize, on: bool) {
        self.cells[row * self.width + col] = u8::from(on);
    }

    /// Cell-wise logical AND.  Both masks must share dimensions.
    pub fn and(&self, other: &BinaryMask) -> BinaryMask {
        debug_assert_eq!((self.width, self.height), (other.width, other.height));
        let cells = self
            .cells
            .iter()
            .zip(&other.cells)
            .map(|(a, b)| a & b)
            .collect();
        Self {
            width: self.width,
            height: self.height,
            cells,
        }
    }

    /// Number of set cells.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// `(row, col)` of every set cell in row-major order.
    pub fn set_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| **c != 0)
            .map(move |(i, _)| (i / width, i % width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgb24_rejects_wrong_length() {
        let err = RgbImage::from_rgb24(2, 2, vec![0; 11]).unwrap_err();
        assert!(matches!(err, RoverError::InvalidImage(_)));
    }

    #[test]
    fn from_rgb24_rejects_zero_dimension() {
        assert!(RgbImage::from_rgb24(0, 4, vec![]).is_err());
    }

    #[test]
    fn from_rgb24_rejects_overflowing_dimensions() {
        let err = RgbImage::from_rgb24(usize::MAX, 2, vec![0; 6]).unwrap_err();
        assert!(matches!(err, RoverError::InvalidImage(_)));
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn pixel_roundtrip() {
        let mut img = RgbImage::new(4, 3);
        img.set_pixel(2, 3, [1, 2, 3]);
        assert_eq!(img.pixel(2, 3), [1, 2, 3]);
        assert_eq!(img.pixel(0, 0), [0, 0, 0]);
        assert_eq!(img.as_bytes()[(2 * 4 + 3) * 3 + 1], 2);
    }

    #[test]
    fn channel_at_outside_is_none() {
        let img = RgbImage::filled(2, 2, [9, 9, 9]);
        assert_eq!(img.channel_at(-1, 0, 0), None);
        assert_eq!(img.channel_at(0, 2, 0), None);
        assert_eq!(img.channel_at(1, 1, 2), Some(9));
    }

    #[test]
    fn mask_set_cells_are_row_major() {
        let mut mask = BinaryMask::new(3, 2);
        mask.set(1, 0, true);
        mask.set(0, 2, true);
        let cells: Vec<_> = mask.set_cells().collect();
        assert_eq!(cells, vec![(0, 2), (1, 0)]);
        assert_eq!(mask.count(), 2);
    }

    #[test]
    fn mask_and_intersects() {
        let mut a = BinaryMask::new(2, 1);
        let mut b = BinaryMask::new(2, 1);
        a.set(0, 0, true);
        a.set(0, 1, true);
        b.set(0, 1, true);
        let c = a.and(&b);
        assert_eq!(c.get(0, 0), 0);
        assert_eq!(c.get(0, 1), 1);
    }
}
