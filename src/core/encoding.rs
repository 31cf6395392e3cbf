// src/core/encoding.rs
//! Which text encoding a downloaded report is in.
//!
//! The portal has shipped Shift_JIS, cp932 and UTF-8 (with and without BOM)
//! over time. Detection is a probe, not a proof: the first candidate that
//! decodes the head of the file without error wins.
use std::{fmt, fs::File, io::Read, path::Path};

use encoding_rs::{SHIFT_JIS, UTF_8};

/// Bytes read for the probe.
pub const PROBE_BYTES: usize = 8192;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextEncoding {
    /// JIS X 0208 only, no Windows extensions.
    ShiftJis,
    /// Windows-31J: Shift_JIS plus NEC/IBM extension rows.
    Cp932,
    /// UTF-8 with an optional BOM that is stripped.
    Utf8Sig,
    Utf8,
}

/// Probe order.
pub const CANDIDATES: [TextEncoding; 4] = [
    TextEncoding::ShiftJis,
    TextEncoding::Cp932,
    TextEncoding::Utf8Sig,
    TextEncoding::Utf8,
];

impl TextEncoding {
    pub fn name(self) -> &'static str {
        match self {
            TextEncoding::ShiftJis => "shift_jis",
            TextEncoding::Cp932 => "cp932",
            TextEncoding::Utf8Sig => "utf-8-sig",
            TextEncoding::Utf8 => "utf-8",
        }
    }

    /// Whether `probe` decodes cleanly. A multi-byte sequence cut off by the
    /// end of the probe is not an error.
    pub fn accepts(self, probe: &[u8]) -> bool {
        match self {
            TextEncoding::ShiftJis => decodes_cleanly(SHIFT_JIS, probe) && is_strict_shift_jis(probe),
            TextEncoding::Cp932 => decodes_cleanly(SHIFT_JIS, probe),
            TextEncoding::Utf8Sig | TextEncoding::Utf8 => decodes_cleanly(UTF_8, probe),
        }
    }

    /// Decode a whole file. Malformed sequences become U+FFFD and are logged,
    /// not raised.
    pub fn decode(self, bytes: &[u8]) -> String {
        let (text, had_errors) = match self {
            TextEncoding::ShiftJis | TextEncoding::Cp932 => {
                let (cow, had_errors) = SHIFT_JIS.decode_without_bom_handling(bytes);
                (cow.into_owned(), had_errors)
            }
            TextEncoding::Utf8Sig => {
                let body = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
                let (cow, had_errors) = UTF_8.decode_without_bom_handling(body);
                (cow.into_owned(), had_errors)
            }
            TextEncoding::Utf8 => {
                let (cow, had_errors) = UTF_8.decode_without_bom_handling(bytes);
                (cow.into_owned(), had_errors)
            }
        };
        if had_errors {
            logw!("{} decode replaced malformed bytes", self.name());
        }
        text
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn decodes_cleanly(enc: &'static encoding_rs::Encoding, probe: &[u8]) -> bool {
    let mut decoder = enc.new_decoder_without_bom_handling();
    let cap = decoder
        .max_utf8_buffer_length_without_replacement(probe.len())
        .unwrap_or(probe.len() * 3);
    let mut out = String::with_capacity(cap);
    let (result, _read) = decoder.decode_to_string_without_replacement(probe, &mut out, false);
    matches!(result, encoding_rs::DecoderResult::InputEmpty)
}

/// Rejects lead bytes outside JIS X 0208: NEC row 13 (0x87), and everything
/// past row 84 (0xEB..), which covers the NEC-selected IBM rows, the
/// user-defined area and the IBM extensions that only cp932 knows.
fn is_strict_shift_jis(bytes: &[u8]) -> bool {
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            0x00..=0x7F | 0xA1..=0xDF => i += 1,
            0x87 => return false,
            0x81..=0x9F | 0xE0..=0xEA => i += 2,
            _ => return false,
        }
    }
    true
}

/// First candidate that reads the head of `path` cleanly.
/// Falls back to Shift_JIS, including when the file cannot be read at all.
pub fn detect_encoding(path: &Path) -> TextEncoding {
    let mut probe = Vec::with_capacity(PROBE_BYTES);
    let read = File::open(path).and_then(|f| f.take(PROBE_BYTES as u64).read_to_end(&mut probe));
    if let Err(e) = read {
        logw!("encoding probe could not read {}: {e}", path.display());
        return TextEncoding::ShiftJis;
    }
    detect_encoding_bytes(&probe)
}

pub fn detect_encoding_bytes(probe: &[u8]) -> TextEncoding {
    CANDIDATES
        .into_iter()
        .find(|enc| enc.accepts(probe))
        .unwrap_or(TextEncoding::ShiftJis)
}

/// Read and decode a whole report file under its detected encoding.
pub fn read_to_string_detected(path: &Path) -> crate::Result<(String, TextEncoding)> {
    let encoding = detect_encoding(path);
    let bytes = std::fs::read(path)?;
    Ok((encoding.decode(&bytes), encoding))
}
