// src/lib.rs

#[macro_use]
pub mod macros;

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod log;
pub mod specs;

pub mod browser;
pub mod excel;
pub mod file;
pub mod pipeline;
pub mod progress;
pub mod report;
pub mod rollover;

pub use error::{Error, Result};
