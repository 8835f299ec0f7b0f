// detection/mod.rs
pub mod vehicle_detector;

pub use vehicle_detector::{Detection, DetectionsJsonDetector, SimulatedDetector};

use crate::error::DetectionError;

/// Turns one image from a feed into the number of vehicles it shows.
///
/// Implementations may be slow and synchronous; callers run them off the async runtime.
pub trait VehicleDetector: Send + Sync {
    fn detect(&self, image: &[u8]) -> Result<u32, DetectionError>;
}
