//! YAML cassettes: recorded port traffic replayed in tests.

pub mod format;
pub mod recorder;
pub mod replayer;
