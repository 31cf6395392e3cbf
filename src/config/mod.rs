// src/config/mod.rs
pub mod consts;
pub mod options;
pub mod settings;

pub use options::{AppOptions, BrowserOptions, Credentials, PathOptions, PortalOptions, Timeouts, Waits};
