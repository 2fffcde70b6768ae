use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Observer pose in the world frame.
///
/// `x` / `y` are expressed in world-grid cell units.  `yaw_deg` is the heading
/// in **degrees**, measured counter-clockwise from the world +X axis: a
/// positive yaw turns the observer's forward axis from world +X toward
/// world +Y.  Every projection in `rover-perception` assumes this convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub yaw_deg: f64,
}

impl Pose {
    pub fn new(x: f64, y: f64, yaw_deg: f64) -> Self {
        Self { x, y, yaw_deg }
    }

    /// Reject poses carrying NaN or infinite components.
    ///
    /// # Errors
    ///
    /// Returns [`RoverError::InvalidPose`] naming the offending field.
    pub fn validate(&self) -> Result<(), RoverError> {
        for (name, value) in [("x", self.x), ("y", self.y), ("yaw_deg", self.yaw_deg)] {
            if !value.is_finite() {
                return Err(RoverError::InvalidPose(format!("{name} is not finite ({value})")));
            }
        }
        Ok(())
    }
}

/// Per-frame description of navigable terrain handed to the motion planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationSummary {
    pub frame_id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Distance to each navigable pixel in the rectified view (pixels).
    pub nav_dists: Vec<f64>,
    /// Bearing of each navigable pixel, radians, positive to the left.
    pub nav_angles: Vec<f64>,
    /// Number of target pixels classified in this frame.
    pub target_pixels: usize,
}

impl NavigationSummary {
    /// Mean bearing of the navigable pixels, or `None` when nothing was
    /// navigable.
    pub fn mean_bearing(&self) -> Option<f64> {
        if self.nav_angles.is_empty() {
            return None;
        }
        Some(self.nav_angles.iter().sum::<f64>() / self.nav_angles.len() as f64)
    }
}

/// Global error type spanning precondition violations, calibration faults,
/// and camera failures.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RoverError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Invalid pose: {0}")]
    InvalidPose(String),

    #[error("Degenerate calibration: {0}")]
    DegenerateCalibration(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_validate_accepts_finite() {
        assert!(Pose::new(100.0, 100.0, 270.0).validate().is_ok());
    }

    #[test]
    fn pose_validate_rejects_nan_yaw() {
        let err = Pose::new(0.0, 0.0, f64::NAN).validate().unwrap_err();
        assert!(matches!(err, RoverError::InvalidPose(_)));
        assert!(err.to_string().contains("yaw_deg"));
    }

    #[test]
    fn pose_validate_rejects_infinite_position() {
        let err = Pose::new(f64::INFINITY, 0.0, 0.0).validate().unwrap_err();
        assert!(err.to_string().contains("x is not finite"));
    }

    #[test]
    fn mean_bearing_of_empty_summary_is_none() {
        let summary = NavigationSummary {
            frame_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            nav_dists: vec![],
            nav_angles: vec![],
            target_pixels: 0,
        };
        assert!(summary.mean_bearing().is_none());
    }

    #[test]
    fn mean_bearing_averages_angles() {
        let summary = NavigationSummary {
            frame_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            nav_dists: vec![1.0, 1.0],
            nav_angles: vec![0.2, -0.6],
            target_pixels: 0,
        };
        assert!((summary.mean_bearing().unwrap() - (-0.2)).abs() < 1e-12);
    }

    #[test]
    fn navigation_summary_roundtrip() {
        let summary = NavigationSummary {
            frame_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            nav_dists: vec![10.0],
            nav_angles: vec![0.5],
            target_pixels: 3,
        };
        let json = serde_json::to_string(&summary).unwrap();
        let back: NavigationSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(summary.frame_id, back.frame_id);
        assert_eq!(back.target_pixels, 3);
    }

    #[test]
    fn rover_error_display() {
        let err = RoverError::HardwareFault {
            component: "front_rgb".to_string(),
            details: "buffer underrun".to_string(),
        };
        assert!(err.to_string().contains("front_rgb"));

        let err2 = RoverError::DegenerateCalibration("collinear".to_string());
        assert!(err2.to_string().contains("Degenerate calibration"));
    }
}
