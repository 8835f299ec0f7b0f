use crate::global_variables::{
    BASE_GREEN_SECS, GREEN_SECS_PER_VEHICLE, INTER_PASS_PAUSE_MILLIS, MAX_GREEN_SECS, TICK_MILLIS,
    YELLOW_TO_GREEN_SECS, YELLOW_TO_RED_SECS,
};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

/// Timing policy of the scheduler. Missing fields in a config file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub tick_millis: u64,
    pub inter_pass_pause_millis: u64,
    pub yellow_to_green_secs: u32,
    pub yellow_to_red_secs: u32,
    pub base_green_secs: u32,
    pub green_secs_per_vehicle: u32,
    pub max_green_secs: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_millis: TICK_MILLIS,
            inter_pass_pause_millis: INTER_PASS_PAUSE_MILLIS,
            yellow_to_green_secs: YELLOW_TO_GREEN_SECS,
            yellow_to_red_secs: YELLOW_TO_RED_SECS,
            base_green_secs: BASE_GREEN_SECS,
            green_secs_per_vehicle: GREEN_SECS_PER_VEHICLE,
            max_green_secs: MAX_GREEN_SECS,
        }
    }
}

impl SchedulerConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        Ok(config)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    pub fn inter_pass_pause(&self) -> Duration {
        Duration::from_millis(self.inter_pass_pause_millis)
    }

    /// Total seconds a road keeps right-of-way once yellow-to-green ends:
    /// base time plus a fixed allowance per vehicle, capped.
    pub fn green_total(&self, vehicle_count: u32) -> u32 {
        let extra = self.green_secs_per_vehicle.saturating_mul(vehicle_count);
        self.base_green_secs
            .saturating_add(extra)
            .min(self.max_green_secs)
    }

    /// Green sub-phase length. The trailing yellow is carved out of the total
    /// unless that would leave nothing, in which case the whole total is green.
    pub fn green_duration(&self, green_total: u32) -> u32 {
        if green_total <= self.yellow_to_red_secs {
            green_total
        } else {
            green_total - self.yellow_to_red_secs
        }
    }
}
