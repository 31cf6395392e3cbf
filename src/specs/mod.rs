// src/specs/mod.rs
//! # Report “specs” module
//!
//! This module hosts the **file-specific reading rules** for the portal's CSV
//! exports. Each spec focuses on a single export and encodes *where the
//! numbers live in the file* and *how to pull them out when the layout drifts*.
//!
//! ## What lives here
//! - **Pure text parsing** of already-downloaded exports.
//! - **Layout contracts** (field indices, header markers) with guards that fail
//!   loudly when the portal changes shape.
//! - **Drift tolerance** where the portal is known to wobble (advertiser rows
//!   whose agency column moves right).
//!
//! ## What does **not** live here
//! - **Downloading**: `browser::protocol` drives the portal.
//! - **Workbook writes**: `excel::transcribe` decides which cell gets what.
//!
//! ## Typical call chain
//! ```text
//! pipeline::transcribe → specs::totals::extract_totals
//!                      → specs::advertiser::read_advertiser_csv
//!                      ↘ excel::Workbook::set_value
//! ```
//!
//! ## Current specs
//! - `totals`: GROSS/NET from the `[total]` row of a campaign export.
//! - `advertiser`: advertiser rows after the last header line, agency-name
//!   recovery, metric columns.
//!
//! In short: **`specs` knows how to read the exports.** Other layers decide
//! when to download them and where their numbers go.
pub mod advertiser;
pub mod totals;

pub use advertiser::{AdvertiserRow, AdvertiserSheet, read_advertiser_csv};
pub use totals::{CampaignKind, TotalsRecord, extract_totals};
