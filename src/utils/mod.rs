//! Shared utilities for the debate engine.

pub mod json;
pub mod logging;

pub use json::{extract_json_object, parse_json_object};
pub use logging::init_logging;
