//! Local log of finished sessions, one CSV row each.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::controller::SessionResult;
use crate::error::{Error, Result};
use crate::session::Mode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub date: DateTime<Local>,
    pub mode: Mode,
    pub word_count: usize,
    pub quote_count: usize,
    /// Empty for untimed runs.
    pub time_limit_secs: Option<u64>,
    pub elapsed_secs: f64,
    pub wpm: u32,
    pub accuracy: u32,
    pub errors: usize,
    pub chars: usize,
}

impl ResultRecord {
    pub fn from_result(result: &SessionResult, date: DateTime<Local>) -> Self {
        Self {
            date,
            mode: result.mode,
            word_count: result.word_count,
            quote_count: result.quote_count,
            time_limit_secs: result.time_limit_secs,
            elapsed_secs: (result.elapsed_secs * 100.0).round() / 100.0,
            wpm: result.final_wpm,
            accuracy: result.final_accuracy,
            errors: result.errors,
            chars: result.total_chars_typed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResultLog {
    path: PathBuf,
}

impl ResultLog {
    /// `results.csv` in the state directory.
    pub fn open_default() -> Result<Self> {
        AppDirs::results_path()
            .map(Self::with_path)
            .ok_or(Error::NoAppDir)
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &ResultRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // A fresh file gets a header row
        let needs_header = !self.path.exists();
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        writer.serialize(record)?;
        writer.flush()?;
        Ok(())
    }

    pub fn records(&self) -> Result<Vec<ResultRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path)?;
        let records = reader.deserialize().collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn record(wpm: u32, time_limit_secs: Option<u64>) -> ResultRecord {
        ResultRecord {
            date: Local.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap(),
            mode: Mode::QuoteRotation,
            word_count: 25,
            quote_count: 3,
            time_limit_secs,
            elapsed_secs: 30.0,
            wpm,
            accuracy: 96,
            errors: 4,
            chars: 310,
        }
    }

    #[test]
    fn append_and_read_back() {
        let dir = tempdir().unwrap();
        let log = ResultLog::with_path(dir.path().join("state").join("results.csv"));

        log.append(&record(62, Some(30))).unwrap();
        log.append(&record(70, None)).unwrap();

        let records = log.records().unwrap();
        assert_eq!(records, vec![record(62, Some(30)), record(70, None)]);
    }

    #[test]
    fn header_written_once() {
        let dir = tempdir().unwrap();
        let log = ResultLog::with_path(dir.path().join("results.csv"));
        log.append(&record(50, Some(15))).unwrap();
        log.append(&record(55, Some(15))).unwrap();

        let text = fs::read_to_string(log.path()).unwrap();
        assert_eq!(text.lines().filter(|l| l.starts_with("date,")).count(), 1);
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn missing_file_reads_empty() {
        let dir = tempdir().unwrap();
        let log = ResultLog::with_path(dir.path().join("results.csv"));
        assert!(log.records().unwrap().is_empty());
    }

    #[test]
    fn record_from_result_rounds_elapsed() {
        let result = SessionResult {
            mode: Mode::WordList,
            word_count: 50,
            quote_count: 3,
            time_limit_secs: None,
            final_wpm: 48,
            final_accuracy: 91,
            errors: 7,
            total_chars_typed: 280,
            elapsed_secs: 12.3456,
            consistency: Some(3.2),
            series: vec![],
        };
        let date = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let rec = ResultRecord::from_result(&result, date);

        assert_eq!(rec.elapsed_secs, 12.35);
        assert_eq!(rec.wpm, 48);
        assert_eq!(rec.chars, 280);
        assert_eq!(rec.time_limit_secs, None);
    }
}
