//! Utility modules: build info, JSON persistence, logging setup.

pub mod build_info;
pub mod logging;
pub mod persistence;
