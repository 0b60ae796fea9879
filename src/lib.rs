//! Banana Runner - Terminal Endless Runner Library
//!
//! This module exposes the game logic for testing and external use.

// Allow dead code in library - some functions are only used by the binary
#![allow(dead_code)]

pub mod accounts;
pub mod challenges;
pub mod config;
pub mod core;
pub mod input;
pub mod progression;
pub mod runner;
pub mod scene;
pub mod simulator;
pub mod sync;
pub mod ui;
pub mod utils;
