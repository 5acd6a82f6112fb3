use encoding_rs::Encoding;
use tracing::warn;

use crate::error::{HolidayError, Result};

const BOM: char = '\u{FEFF}';

/// Decoded text plus the number of lines dropped because they were not
/// valid in the source encoding.
#[derive(Debug, Default)]
pub struct DecodedText {
    pub text: String,
    pub skipped_lines: usize,
}

/// Strict transcode of `bytes` from `encoding` into UTF-8.
///
/// Fails on the first invalid byte sequence. The extraction pass uses
/// [`decode_lines`] instead so that one bad row cannot sink the whole file.
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
        .ok_or(HolidayError::Encoding {
            encoding: encoding.name(),
        })
}

/// Line-by-line transcode that drops undecodable lines and counts them.
///
/// Splitting on raw `\n` is safe for Shift_JIS and the other legacy CJK
/// encodings: their trail bytes never fall in the ASCII control range.
pub fn decode_lines(bytes: &[u8], encoding: &'static Encoding) -> DecodedText {
    let mut out = DecodedText::default();
    for (idx, line) in bytes.split(|b| *b == b'\n').enumerate() {
        match decode(line, encoding) {
            Ok(text) => {
                out.text.push_str(&text);
                out.text.push('\n');
            }
            Err(e) => {
                warn!(line = idx + 1, error = %e, "skipping undecodable line");
                out.skipped_lines += 1;
            }
        }
    }
    out
}

/// Trim surrounding whitespace and, for the first field of a row, a
/// leading byte-order mark. Idempotent.
pub fn strip_field_artifacts(field: &str, first: bool) -> &str {
    let trimmed = field.trim();
    if first {
        trimmed.trim_start_matches(BOM).trim()
    } else {
        trimmed
    }
}

/// Apply [`strip_field_artifacts`] to every field of a row.
pub fn normalize_fields<'a, I>(fields: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    fields
        .into_iter()
        .enumerate()
        .map(|(i, f)| strip_field_artifacts(f, i == 0).to_string())
        .collect()
}
