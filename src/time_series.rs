use std::collections::BTreeMap;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

/// One sample of the live figures, keyed by whole elapsed seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPoint {
    pub elapsed_secs: u64,
    pub wpm: u32,
    pub accuracy: u32,
    pub errors: usize,
}

impl DataPoint {
    pub fn new(elapsed_secs: u64, wpm: u32, accuracy: u32, errors: usize) -> Self {
        Self {
            elapsed_secs,
            wpm,
            accuracy,
            errors,
        }
    }
}

impl From<DataPoint> for (f64, f64) {
    fn from(p: DataPoint) -> Self {
        (p.elapsed_secs as f64, p.wpm as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    Floor,
    Ceil,
}

impl Rounding {
    pub fn bucket(self, elapsed_secs: f64) -> u64 {
        if !elapsed_secs.is_finite() || elapsed_secs <= 0.0 {
            return 0;
        }
        match self {
            Rounding::Floor => elapsed_secs.floor() as u64,
            Rounding::Ceil => elapsed_secs.ceil() as u64,
        }
    }
}

/// What caused a sample to be taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleTrigger {
    Tick,
    Keystroke,
    Rotation,
    Completion,
}

impl SampleTrigger {
    /// Periodic ticks round down; event-driven samples round up.
    pub fn rounding(self) -> Rounding {
        match self {
            SampleTrigger::Tick => Rounding::Floor,
            SampleTrigger::Keystroke | SampleTrigger::Rotation | SampleTrigger::Completion => {
                Rounding::Ceil
            }
        }
    }
}

/// Tick period for a session: quicker sampling for short tests.
pub fn sample_interval(time_limit_secs: Option<u64>) -> Duration {
    match time_limit_secs {
        Some(limit) if limit <= 15 => Duration::from_millis(250),
        _ => Duration::from_millis(1000),
    }
}

/// Upserts samples into integer-second buckets, last write wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleRecorder {
    points: BTreeMap<u64, DataPoint>,
    sealed: bool,
}

impl SampleRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bucket written to, or `None` once sealed.
    pub fn record(
        &mut self,
        trigger: SampleTrigger,
        elapsed_secs: f64,
        wpm: u32,
        accuracy: u32,
        errors: usize,
    ) -> Option<u64> {
        if self.sealed {
            return None;
        }

        let bucket = trigger.rounding().bucket(elapsed_secs);
        let point = DataPoint::new(bucket, wpm, accuracy, errors);
        if let Some(previous) = self.points.insert(bucket, point) {
            debug!("{trigger:?} sample replaced bucket {bucket} (was {} wpm)", previous.wpm);
        }
        Some(bucket)
    }

    /// Stop accepting samples.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&DataPoint> {
        self.points.values().next_back()
    }

    /// Points in ascending bucket order.
    pub fn series(&self) -> Vec<DataPoint> {
        self.points.values().copied().collect()
    }
}
