//! Plotstead library crate: re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is the actual game entry point.
//! This library crate exposes the same modules so that `tests/` integration
//! tests can drive the town, shop and assembly puzzle without a window or GPU.

pub mod shared;
pub mod prefs;
pub mod data;
pub mod input;
pub mod tween;
pub mod economy;
pub mod plots;
pub mod scenes;
pub mod puzzle;
pub mod npcs;
pub mod ui;
