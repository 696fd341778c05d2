//! Shared utilities

pub mod logging;
pub mod time;
