use crate::detection::VehicleDetector;
use crate::error::DetectionError;
use crate::global_variables::VEHICLE_CLASSES;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

/// One bounding box reported by an object-detection model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class: u32,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub bbox: [f32; 4],
}

/// Counts vehicles in the JSON output of an external COCO-trained model,
/// e.g. `[{"class": 2, "confidence": 0.91, "bbox": [x1, y1, x2, y2]}, ...]`.
#[derive(Debug, Clone)]
pub struct DetectionsJsonDetector {
    vehicle_classes: Vec<u32>,
}

impl DetectionsJsonDetector {
    pub fn new() -> Self {
        Self {
            vehicle_classes: VEHICLE_CLASSES.to_vec(),
        }
    }

    pub fn with_classes(vehicle_classes: Vec<u32>) -> Self {
        Self { vehicle_classes }
    }

    pub fn count(&self, detections: &[Detection]) -> u32 {
        detections
            .iter()
            .filter(|d| self.vehicle_classes.contains(&d.class))
            .count() as u32
    }
}

impl Default for DetectionsJsonDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl VehicleDetector for DetectionsJsonDetector {
    fn detect(&self, image: &[u8]) -> Result<u32, DetectionError> {
        let detections: Vec<Detection> = serde_json::from_slice(image)?;
        Ok(self.count(&detections))
    }
}

/// Stand-in for a real model: reports a random count for every image.
pub struct SimulatedDetector {
    rng: Mutex<StdRng>,
    max_vehicles: u32,
}

impl SimulatedDetector {
    pub fn new(seed: u64, max_vehicles: u32) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            max_vehicles,
        }
    }
}

impl VehicleDetector for SimulatedDetector {
    fn detect(&self, _image: &[u8]) -> Result<u32, DetectionError> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(rng.random_range(0..=self.max_vehicles))
    }
}
