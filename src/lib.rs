//! beadscope - terminal dashboard for beads issue trees
//!
//! This library crate exposes internal modules for integration testing.

pub mod config;
pub mod data;
pub mod integrations;
pub mod tree;
pub mod tui;
pub mod util;
