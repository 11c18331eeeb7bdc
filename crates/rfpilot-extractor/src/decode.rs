//! Best-effort text decoding of uploaded documents
//!
//! PDFs are read by scanning uncompressed content streams for text-showing
//! operators. Anything else is decoded as lossy UTF-8. Compressed or
//! image-only PDFs fall back to the lossy text of the whole file.

use crate::types::RawDocument;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static TEXT_OPERATORS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)(\((?:\\.|[^\\)])*\))\s*(?:Tj|')|\[((?:\\.|[^\]\\])*)\]\s*TJ|\b(?:Td|TD|ET)\b|T\*",
    )
    .expect("text operator pattern should compile")
});

static LITERAL_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\((?:\\.|[^\\)])*\)").expect("literal string pattern should compile")
});

/// Decode downloaded bytes into text
pub fn decode_document(bytes: Vec<u8>) -> RawDocument {
    let text = if bytes.starts_with(b"%PDF") {
        let extracted = extract_pdf_text(&bytes);
        if extracted.trim().is_empty() {
            debug!("No uncompressed PDF text found, using lossy decoding");
            clean_text(&String::from_utf8_lossy(&bytes))
        } else {
            extracted
        }
    } else {
        clean_text(&String::from_utf8_lossy(&bytes))
    };

    debug!("Decoded {} bytes into {} chars of text", bytes.len(), text.chars().count());
    RawDocument { bytes, text }
}

fn extract_pdf_text(bytes: &[u8]) -> String {
    // Latin-1 keeps byte offsets and escape sequences intact
    let content: String = bytes.iter().map(|&b| b as char).collect();

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for caps in TEXT_OPERATORS.captures_iter(&content) {
        if let Some(literal) = caps.get(1) {
            current.push_str(&unescape_literal(literal.as_str()));
        } else if let Some(array) = caps.get(2) {
            for literal in LITERAL_STRING.find_iter(array.as_str()) {
                current.push_str(&unescape_literal(literal.as_str()));
            }
        } else if !current.trim().is_empty() {
            lines.push(std::mem::take(&mut current));
        } else {
            current.clear();
        }
    }
    if !current.trim().is_empty() {
        lines.push(current);
    }

    clean_text(&lines.join("\n"))
}

/// Decode a `(...)` PDF literal string
fn unescape_literal(literal: &str) -> String {
    let inner = literal
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .unwrap_or(literal);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') | Some('f') => {}
            Some('\n') => {}
            Some(d @ '0'..='7') => {
                let mut value = d.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            value = value * 8 + digit;
                            chars.next();
                        }
                        None => break,
                    }
                }
                if let Some(decoded) = char::from_u32(value & 0xFF) {
                    out.push(decoded);
                }
            }
            Some(other) => out.push(other),
            None => {}
        }
    }

    out
}

/// Replace control characters (other than newlines and tabs) with spaces
fn clean_text(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_control() && c != '\n' && c != '\t' {
                ' '
            } else {
                c
            }
        })
        .collect()
}
