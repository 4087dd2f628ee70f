//! Configuration types
//!
//! Burner thresholds and timings, panel wiring, and the `panel.toml` parser.

pub mod hardware;
pub mod parse;
pub mod types;

pub use hardware::*;
pub use parse::{parse_config, ControllerConfig, ParseError};
pub use types::*;
