// Scheduler pacing
pub const TICK_MILLIS: u64 = 1000;
pub const INTER_PASS_PAUSE_MILLIS: u64 = 1000;

// Phase lengths (seconds)
pub const YELLOW_TO_GREEN_SECS: u32 = 3;
pub const YELLOW_TO_RED_SECS: u32 = 5;

// Green time policy: base + per vehicle, capped
pub const BASE_GREEN_SECS: u32 = 10;
pub const GREEN_SECS_PER_VEHICLE: u32 = 2;
pub const MAX_GREEN_SECS: u32 = 60;

// Road count used when none is configured
pub const DEFAULT_ROAD_COUNT: usize = 3;

// COCO class ids counted as vehicles: car, motorcycle, bus, truck
pub const VEHICLE_CLASSES: [u32; 4] = [2, 3, 5, 7];

// Monitoring output
pub const STATUS_HISTORY_CSV: &str = "signal_status.csv";
