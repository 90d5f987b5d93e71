//! Configuration and logging setup.

pub mod config;
pub mod logging;
