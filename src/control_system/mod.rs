// control_system/mod.rs
pub mod config;
pub mod control_facade;
pub mod road_registry;
pub mod scheduler;
pub mod signal_state;

use crate::shared_data::{RoadStatus, SignalState, StatusSnapshot};
use road_registry::RoadRegistry;
use signal_state::SignalBoard;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Counts and signals live behind one lock so a poller never sees one without the other.
#[derive(Debug, Default)]
pub struct TrafficState {
    pub registry: RoadRegistry,
    pub signals: SignalBoard,
}

impl TrafficState {
    pub fn snapshot(&self, running: bool) -> StatusSnapshot {
        let roads = self
            .registry
            .snapshot()
            .into_iter()
            .map(|road| {
                let signal = self.signals.get(road.id).unwrap_or(SignalState::RED);
                RoadStatus {
                    road: road.id,
                    phase: signal.phase,
                    colour: signal.phase.colour(),
                    remaining: signal.remaining,
                    vehicle_count: road.vehicle_count,
                }
            })
            .collect();
        StatusSnapshot { running, roads }
    }
}

pub type SharedTraffic = Arc<Mutex<TrafficState>>;

// Every critical section leaves the maps consistent, so a poisoned lock is still usable.
pub(crate) fn lock_traffic(traffic: &SharedTraffic) -> MutexGuard<'_, TrafficState> {
    traffic.lock().unwrap_or_else(PoisonError::into_inner)
}
