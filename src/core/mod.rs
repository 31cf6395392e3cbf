// src/core/mod.rs

pub mod dates;
pub mod encoding;

pub use dates::{DateRange, format_date_for_site, parse_date_range};
pub use encoding::{TextEncoding, detect_encoding};
