use crate::shared_data::{current_timestamp, LightColour, Phase, StatusSnapshot};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub timestamp: u64,
    pub road: u32,
    pub phase: Phase,
    pub colour: LightColour,
    pub remaining: u32,
    pub vehicle_count: u32,
}

/// Appends status snapshots to a CSV file, one row per road.
#[derive(Debug, Clone)]
pub struct StatusRecorder {
    path: PathBuf,
}

impl StatusRecorder {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of rows written.
    pub fn record(&self, snapshot: &StatusSnapshot) -> Result<usize, Box<dyn Error>> {
        let timestamp = current_timestamp();
        let records: Vec<StatusRecord> = snapshot
            .roads
            .iter()
            .map(|road| StatusRecord {
                timestamp,
                road: road.road.0,
                phase: road.phase,
                colour: road.colour,
                remaining: road.remaining,
                vehicle_count: road.vehicle_count,
            })
            .collect();
        append_to_csv(&self.path, &records)?;
        Ok(records.len())
    }

    pub fn read_records(&self) -> Result<Vec<StatusRecord>, Box<dyn Error>> {
        let file = File::open(&self.path)?;
        let mut rdr = csv::Reader::from_reader(file);
        let mut records = Vec::new();
        for result in rdr.deserialize() {
            let record: StatusRecord = result?;
            records.push(record);
        }
        Ok(records)
    }
}

// Headers are written only when the file is created.
fn append_to_csv<T: Serialize>(path: &Path, records: &[T]) -> Result<(), Box<dyn Error>> {
    let file_exists = path.exists();
    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_data::{RoadId, RoadStatus};
    use std::fs;

    fn temp_csv(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "signal_scheduler_{}_{}.csv",
            name,
            std::process::id()
        ));
        let _ = fs::remove_file(&path);
        path
    }

    fn snapshot(remaining: u32) -> StatusSnapshot {
        StatusSnapshot {
            running: true,
            roads: vec![
                RoadStatus {
                    road: RoadId(1),
                    phase: Phase::YellowToRed,
                    colour: LightColour::Yellow,
                    remaining,
                    vehicle_count: 6,
                },
                RoadStatus {
                    road: RoadId(2),
                    phase: Phase::Red,
                    colour: LightColour::Red,
                    remaining: 0,
                    vehicle_count: 0,
                },
            ],
        }
    }

    #[test]
    fn appends_rows_under_one_header() {
        let path = temp_csv("append");
        let recorder = StatusRecorder::new(&path);
        assert_eq!(recorder.record(&snapshot(4)).unwrap(), 2);
        assert_eq!(recorder.record(&snapshot(3)).unwrap(), 2);

        let records = recorder.read_records().unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].phase, Phase::YellowToRed);
        assert_eq!(records[0].colour, LightColour::Yellow);
        assert_eq!(records[0].remaining, 4);
        assert_eq!(records[2].remaining, 3);
        assert_eq!(records[3].road, 2);

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.matches("timestamp").count(), 1);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn reading_a_missing_file_fails() {
        let recorder = StatusRecorder::new(temp_csv("missing"));
        assert!(recorder.read_records().is_err());
    }
}
