// Library surface for headless/integration tests and reuse.
// Terminal and rendering types stay in main.rs.
pub mod app_dirs;
pub mod config;
pub mod content;
pub mod controller;
pub mod error;
pub mod history;
pub mod logging;
pub mod metrics;
pub mod runtime;
pub mod session;
pub mod theme;
pub mod time_series;

pub use error::{Error, Result};
