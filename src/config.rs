use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::controller::{TestConfig, DEFAULT_TIME_LIMIT_SECS, DEFAULT_WORD_COUNT};
use crate::error::Result;
use crate::session::{Mode, DEFAULT_QUOTE_WINDOW};
use crate::theme::{Theme, DEFAULT_THEME};

pub const WORD_COUNT_CHOICES: [usize; 4] = [25, 50, 75, 100];
pub const QUOTE_COUNT_CHOICES: [usize; 4] = [3, 6, 9, 12];
/// `None` is the untimed run.
pub const TIME_LIMIT_CHOICES: [Option<u64>; 5] = [Some(15), Some(30), Some(45), Some(60), None];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub mode: Mode,
    pub word_count: usize,
    pub quote_count: usize,
    pub time_limit_secs: Option<u64>,
    pub theme: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: Mode::WordList,
            word_count: DEFAULT_WORD_COUNT,
            quote_count: DEFAULT_QUOTE_WINDOW,
            time_limit_secs: Some(DEFAULT_TIME_LIMIT_SECS),
            theme: DEFAULT_THEME.to_string(),
        }
    }
}

impl Config {
    pub fn test_config(&self) -> TestConfig {
        TestConfig {
            mode: self.mode,
            word_count: self.word_count,
            quote_count: self.quote_count,
            time_limit_secs: self.time_limit_secs,
        }
    }

    pub fn theme(&self) -> Theme {
        Theme::by_name(&self.theme)
    }

    pub fn cycle_mode(&mut self) -> Mode {
        self.mode = self.mode.next();
        self.mode
    }

    pub fn cycle_word_count(&mut self) -> usize {
        self.word_count = next_choice(&WORD_COUNT_CHOICES, self.word_count);
        self.word_count
    }

    pub fn cycle_quote_count(&mut self) -> usize {
        self.quote_count = next_choice(&QUOTE_COUNT_CHOICES, self.quote_count);
        self.quote_count
    }

    pub fn cycle_time_limit(&mut self) -> Option<u64> {
        self.time_limit_secs = next_choice(&TIME_LIMIT_CHOICES, self.time_limit_secs);
        self.time_limit_secs
    }

    pub fn cycle_theme(&mut self) -> Theme {
        let next = self.theme().next();
        self.theme = next.name.to_string();
        next
    }
}

/// The choice after `current`, wrapping around. Values off the list (free
/// integers from the command line) restart at the first choice.
pub fn next_choice<T: PartialEq + Copy>(choices: &[T], current: T) -> T {
    match choices.iter().position(|c| *c == current) {
        Some(idx) => choices[(idx + 1) % choices.len()],
        None => choices[0],
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("clackr_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("ignoring unreadable config {}: {e}", self.path.display());
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
