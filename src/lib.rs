//! Interactive chess session controller: gesture handling, move intent,
//! clocks, undo/redo and game-over sequencing on top of a rules engine.
//!
//! The `gui` feature adds a gpui front end.

pub mod config;
pub mod domain;
pub mod error;
pub mod models;

#[cfg(feature = "gui")]
pub mod app;
#[cfg(feature = "gui")]
pub mod ui;
