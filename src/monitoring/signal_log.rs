use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::path::Path;

use crate::intersection::{LightState, RoadId, TransitionPhase};
use crate::shared_data::{current_timestamp, SignalSnapshot};

/// One CSV row: a flattened snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalLogRecord {
    pub timestamp: u64,
    pub time: u64,
    pub task_id: u8,
    pub mode: String,
    pub active_road: String,
    pub r1: String,
    pub r2: String,
    pub r3: String,
    pub r4: String,
    pub transition_phase: String,
    pub controls_locked: bool,
}

impl SignalLogRecord {
    pub fn from_snapshot(snapshot: &SignalSnapshot, timestamp: u64) -> Self {
        let color = |road: RoadId| snapshot.color_of(road).to_string();
        Self {
            timestamp,
            time: snapshot.time,
            task_id: snapshot.task_id,
            mode: snapshot.mode.to_string(),
            active_road: snapshot.active_road.to_string(),
            r1: color(RoadId::R1),
            r2: color(RoadId::R2),
            r3: color(RoadId::R3),
            r4: color(RoadId::R4),
            transition_phase: snapshot.transition_phase.to_string(),
            controls_locked: snapshot.controls_locked,
        }
    }

    fn colors(&self) -> [(RoadId, &str); 4] {
        [
            (RoadId::R1, self.r1.as_str()),
            (RoadId::R2, self.r2.as_str()),
            (RoadId::R3, self.r3.as_str()),
            (RoadId::R4, self.r4.as_str()),
        ]
    }
}

// Generic helper to append a record to a CSV file. Headers go in only when the
// file is new.
fn log_to_csv<T: Serialize>(path: &Path, record: &T) -> Result<(), Box<dyn Error>> {
    let file_exists = path.exists();
    let file = OpenOptions::new().append(true).create(true).open(path)?;
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);
    wtr.serialize(record)?;
    wtr.flush()?;
    Ok(())
}

pub fn append_snapshot(path: impl AsRef<Path>, snapshot: &SignalSnapshot) -> Result<(), Box<dyn Error>> {
    let record = SignalLogRecord::from_snapshot(snapshot, current_timestamp());
    log_to_csv(path.as_ref(), &record)
}

/// Appends and reports failures to the log instead of the caller.
pub fn log_snapshot(path: impl AsRef<Path>, snapshot: &SignalSnapshot) {
    let path = path.as_ref();
    if let Err(e) = append_snapshot(path, snapshot) {
        warn!("Error logging signal snapshot to {:?}: {}", path, e);
    }
}

pub fn read_signal_log(path: impl AsRef<Path>) -> Result<Vec<SignalLogRecord>, Box<dyn Error>> {
    let file = File::open(path)?;
    let mut rdr = csv::Reader::from_reader(file);
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: SignalLogRecord = result?;
        records.push(record);
    }
    Ok(records)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub total_rows: usize,
    pub rows_per_mode: BTreeMap<String, usize>,
    pub green_rows_per_road: BTreeMap<String, usize>,
    /// Handovers seen entering yellow.
    pub transitions_started: usize,
}

impl ReportSummary {
    pub fn from_records(records: &[SignalLogRecord]) -> Self {
        let mut summary = ReportSummary {
            total_rows: records.len(),
            ..Default::default()
        };
        let yellow = TransitionPhase::Yellow.to_string();
        let green = LightState::Green.to_string();
        let mut previous_phase: Option<&str> = None;

        for record in records {
            *summary.rows_per_mode.entry(record.mode.clone()).or_insert(0) += 1;
            for (road, color) in record.colors() {
                if color == green {
                    *summary.green_rows_per_road.entry(road.to_string()).or_insert(0) += 1;
                }
            }
            if record.transition_phase == yellow && previous_phase != Some(yellow.as_str()) {
                summary.transitions_started += 1;
            }
            previous_phase = Some(record.transition_phase.as_str());
        }
        summary
    }
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Report Summary:")?;
        writeln!(f, "Snapshots: {} records", self.total_rows)?;
        writeln!(f, "Transitions started: {}", self.transitions_started)?;
        for (mode, count) in &self.rows_per_mode {
            writeln!(f, "Mode {}: {} records", mode, count)?;
        }
        for (road, count) in &self.green_rows_per_road {
            writeln!(f, "{} green: {} records", road, count)?;
        }
        Ok(())
    }
}

pub fn generate_report_summary(path: impl AsRef<Path>) -> Result<ReportSummary, Box<dyn Error>> {
    let records = read_signal_log(path)?;
    Ok(ReportSummary::from_records(&records))
}
