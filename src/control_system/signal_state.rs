use crate::shared_data::{RoadId, SignalState};
use std::collections::HashMap;
use thiserror::Error;

/// A road the scheduler tried to drive has no signal. Indicates a defect, not a bad request.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no signal registered for road {0}")]
pub struct MissingSignal(pub RoadId);

/// Signal state of every road. Only the scheduler writes to it while lights run.
#[derive(Debug, Default, Clone)]
pub struct SignalBoard {
    signals: HashMap<RoadId, SignalState>,
}

impl SignalBoard {
    pub fn new() -> Self {
        Self::default()
    }

    // Adds a red signal for every road that does not have one yet.
    pub fn ensure<I: IntoIterator<Item = RoadId>>(&mut self, roads: I) {
        for road in roads {
            self.signals.entry(road).or_default();
        }
    }

    pub fn get(&self, road: RoadId) -> Option<SignalState> {
        self.signals.get(&road).copied()
    }

    pub fn set(&mut self, road: RoadId, state: SignalState) -> Result<(), MissingSignal> {
        let signal = self.signals.get_mut(&road).ok_or(MissingSignal(road))?;
        *signal = state;
        Ok(())
    }

    /// Turns every road except `active` red, leaving `active` as it is.
    pub fn force_others_red(&mut self, active: RoadId) -> Result<(), MissingSignal> {
        if !self.signals.contains_key(&active) {
            return Err(MissingSignal(active));
        }
        for (road, signal) in self.signals.iter_mut() {
            if *road != active {
                *signal = SignalState::RED;
            }
        }
        Ok(())
    }

    pub fn force_all_red(&mut self) {
        for signal in self.signals.values_mut() {
            *signal = SignalState::RED;
        }
    }

    pub fn non_red_count(&self) -> usize {
        self.signals.values().filter(|signal| !signal.is_red()).count()
    }
}
