// src/shared_data.rs

use crate::error::SignalError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Identifier of a monitored road. Roads are numbered `1..=n` when configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoadId(pub u32);

impl fmt::Display for RoadId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for RoadId {
    fn from(id: u32) -> Self {
        RoadId(id)
    }
}

// Anything that is not a road number can never have been registered.
impl FromStr for RoadId {
    type Err = SignalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(RoadId)
            .map_err(|_| SignalError::UnknownRoad(s.trim().to_string()))
    }
}

/// A road and the last vehicle count observed on its feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Road {
    pub id: RoadId,
    pub vehicle_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Red,
    YellowToGreen,
    Green,
    YellowToRed,
}

/// The lamp a phase lights up on the monitor display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightColour {
    Red,
    Yellow,
    Green,
}

impl Phase {
    pub fn colour(self) -> LightColour {
        match self {
            Phase::Red => LightColour::Red,
            Phase::YellowToGreen | Phase::YellowToRed => LightColour::Yellow,
            Phase::Green => LightColour::Green,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Phase::Red => "RED",
            Phase::YellowToGreen => "YELLOW_TO_GREEN",
            Phase::Green => "GREEN",
            Phase::YellowToRed => "YELLOW_TO_RED",
        };
        f.write_str(name)
    }
}

impl fmt::Display for LightColour {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            LightColour::Red => "red",
            LightColour::Yellow => "yellow",
            LightColour::Green => "green",
        };
        f.write_str(name)
    }
}

/// Phase of one road's signal and the seconds left before it turns red.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalState {
    pub phase: Phase,
    pub remaining: u32,
}

impl SignalState {
    pub const RED: SignalState = SignalState {
        phase: Phase::Red,
        remaining: 0,
    };

    pub fn new(phase: Phase, remaining: u32) -> Self {
        Self { phase, remaining }
    }

    pub fn is_red(&self) -> bool {
        self.phase == Phase::Red
    }
}

impl Default for SignalState {
    fn default() -> Self {
        SignalState::RED
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadStatus {
    pub road: RoadId,
    pub phase: Phase,
    pub colour: LightColour,
    pub remaining: u32,
    pub vehicle_count: u32,
}

/// Point-in-time view of every road's signal and count, safe to hand to pollers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub running: bool,
    pub roads: Vec<RoadStatus>,
}

impl StatusSnapshot {
    pub fn road(&self, id: RoadId) -> Option<&RoadStatus> {
        self.roads.iter().find(|status| status.road == id)
    }

    /// The road currently holding right-of-way, if any.
    pub fn active_road(&self) -> Option<RoadId> {
        self.roads
            .iter()
            .find(|status| status.phase != Phase::Red)
            .map(|status| status.road)
    }

    pub fn non_red_count(&self) -> usize {
        self.roads
            .iter()
            .filter(|status| status.phase != Phase::Red)
            .count()
    }

    /// Polling payload: lamp colour, timer and count keyed by road id.
    pub fn to_json(&self) -> Value {
        let mut status = Map::new();
        let mut timers = Map::new();
        let mut counts = Map::new();
        for road in &self.roads {
            let key = road.road.to_string();
            status.insert(key.clone(), json!(road.colour));
            timers.insert(key.clone(), json!(road.remaining));
            counts.insert(key, json!(road.vehicle_count));
        }
        json!({
            "running": self.running,
            "status": status,
            "timers": timers,
            "counts": counts,
            "roads": self.roads,
        })
    }
}

/// Seconds since the Unix epoch.
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
