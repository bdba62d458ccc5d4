//! Text encoding for thermal printers
//!
//! Receipt text is built as UTF-8. Printers whose firmware only knows a
//! single-byte code page get the Latin-1 (Windows-1252) mapping instead.
//! This module provides utilities for:
//! - Column widths for layout (one column per character)
//! - Truncating/padding strings to a column width
//! - Encoding a formatted payload while preserving ESC/POS commands

use tracing::instrument;

/// Byte encoding expected by the printer firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Utf8,
    Latin1,
}

/// Column width of a string in the printer's monospace font
pub fn text_width(s: &str) -> usize {
    s.chars().count()
}

/// Truncate a string to at most `max_width` columns
pub fn truncate_text(s: &str, max_width: usize) -> String {
    s.chars().take(max_width).collect()
}

/// Pad a string to a specific column width
///
/// If the string is longer than the width, it will be truncated.
pub fn pad_text(s: &str, width: usize, align_right: bool) -> String {
    let current_width = text_width(s);
    if current_width >= width {
        return truncate_text(s, width);
    }
    let spaces = width - current_width;
    if align_right {
        format!("{}{}", " ".repeat(spaces), s)
    } else {
        format!("{}{}", s, " ".repeat(spaces))
    }
}

/// Encode a formatted payload for transport
///
/// ASCII bytes (0x00-0x7F) pass through unchanged in every charset, which
/// protects ESC/POS commands. For Latin-1 printers the rupee sign, which
/// has no code point there, is spelled `Rs.`.
#[instrument(skip(text), fields(len = text.len()))]
pub fn encode_payload(text: &str, charset: Charset) -> Vec<u8> {
    match charset {
        Charset::Utf8 => text.as_bytes().to_vec(),
        Charset::Latin1 => {
            let text = text.replace('₹', "Rs.");
            let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode(&text);
            bytes.into_owned()
        }
    }
}
