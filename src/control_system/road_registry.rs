use crate::error::SignalError;
use crate::shared_data::{Road, RoadId};

/// Known roads and the last vehicle count reported for each, in registration order.
#[derive(Debug, Default, Clone)]
pub struct RoadRegistry {
    roads: Vec<Road>,
}

impl RoadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates roads `1..=n` with a zero count the first time it is called.
    /// Later calls leave the existing roads and their counts untouched.
    /// Returns whether roads were created.
    pub fn ensure_roads(&mut self, n: usize) -> bool {
        if !self.roads.is_empty() {
            return false;
        }
        self.roads = (1..=n as u32)
            .map(|id| Road {
                id: RoadId(id),
                vehicle_count: 0,
            })
            .collect();
        true
    }

    pub fn set_count(&mut self, id: RoadId, count: u32) -> Result<(), SignalError> {
        let road = self
            .roads
            .iter_mut()
            .find(|road| road.id == id)
            .ok_or_else(|| SignalError::UnknownRoad(id.to_string()))?;
        road.vehicle_count = count;
        Ok(())
    }

    pub fn count(&self, id: RoadId) -> Option<u32> {
        self.roads
            .iter()
            .find(|road| road.id == id)
            .map(|road| road.vehicle_count)
    }

    pub fn contains(&self, id: RoadId) -> bool {
        self.roads.iter().any(|road| road.id == id)
    }

    pub fn ids(&self) -> impl Iterator<Item = RoadId> + '_ {
        self.roads.iter().map(|road| road.id)
    }

    pub fn len(&self) -> usize {
        self.roads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roads.is_empty()
    }

    /// Owned copy of every road; never a view into the live registry.
    pub fn snapshot(&self) -> Vec<Road> {
        self.roads.clone()
    }

    /// Roads by descending count. The sort is stable, so ties keep registration order.
    pub fn ranked(&self) -> Vec<Road> {
        let mut ranked = self.snapshot();
        ranked.sort_by(|a, b| b.vehicle_count.cmp(&a.vehicle_count));
        ranked
    }
}
