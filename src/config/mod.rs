//! Configuration loading and management for the shift guard.
//!
//! This module loads the fraud check thresholds and the score table from
//! YAML files. [`GuardConfig::default`] yields the same values without
//! touching disk.
//!
//! # Example
//!
//! ```no_run
//! use shift_guard::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Max speed: {} km/h", config.policy().max_speed_kmh);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{GuardConfig, PolicyConfig, ScoreTable};
