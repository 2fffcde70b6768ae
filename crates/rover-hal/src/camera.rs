//! Generic `Camera` trait and supporting types for image-capture hardware.

use rover_types::RoverError;

/// A raw RGB24 frame returned by a camera driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Packed RGB24 pixel data, row-major, top row first.
    pub data: Vec<u8>,
}

/// A forward-facing camera.
pub trait Camera: Send {
    /// Stable identifier for this camera, e.g. `"front_rgb"`.
    fn id(&self) -> &str;

    /// Capture and return the next available frame.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::HardwareFault`] if the frame cannot be captured
    /// (e.g. the device is disconnected or the buffer is unavailable).
    fn capture(&mut self) -> Result<CameraFrame, RoverError>;
}

impl CameraFrame {
    /// Bytes a well-formed RGB24 frame of this size must hold.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::InvalidImage`] if the reported dimensions
    /// overflow `usize`.
    pub fn expected_len(&self) -> Result<usize, RoverError> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|px| px.checked_mul(3))
            .ok_or_else(|| {
                RoverError::InvalidImage(format!(
                    "frame size {}x{} overflows",
                    self.width, self.height
                ))
            })
    }
}
