// src/header.rs
// ISF header tokenizer

//! Tokenizer for the textual ISF preamble.
//!
//! The preamble is a run of `:NAME value` / `;NAME value` tags followed by
//! the `:CURVE #<n><n digits>` marker, after which the binary payload
//! starts. The window is decoded as Latin-1, one character per byte, so a
//! character index is also a byte offset into the file.

use std::fmt;

use log::{debug, warn};

use crate::config::DuplicateFields;
use crate::error::{IsfError, IsfWarning, Result};

/// Reserved tag carrying the payload length instead of a regular value.
pub const CURVE_TAG: &str = "CURVE";

/// A single header value, classified integer first, then float, then text.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl HeaderValue {
    /// Classify a raw value run. Numbers may carry surrounding whitespace;
    /// text is kept exactly as it appeared (quotes already stripped).
    pub fn classify(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            HeaderValue::Integer(value)
        } else if let Ok(value) = trimmed.parse::<f64>() {
            HeaderValue::Float(value)
        } else {
            HeaderValue::Text(raw.to_string())
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            HeaderValue::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Integers widen to floats, as the scale factors are often written
    /// without a fractional part.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HeaderValue::Integer(value) => Some(*value as f64),
            HeaderValue::Float(value) => Some(*value),
            HeaderValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Integer(value) => write!(f, "{}", value),
            HeaderValue::Float(value) => write!(f, "{:e}", value),
            HeaderValue::Text(value) => write!(f, "{}", value),
        }
    }
}

/// Header fields in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Header {
    fields: Vec<(String, HeaderValue)>,
}

impl Header {
    pub fn new() -> Self {
        Header::default()
    }

    /// Insert or overwrite a field, returning the value it replaced.
    pub fn insert<S: Into<String>>(&mut self, name: S, value: HeaderValue) -> Option<HeaderValue> {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    fn require(&self, name: &str) -> Result<&HeaderValue> {
        self.get(name).ok_or_else(|| IsfError::missing(name))
    }

    /// Required integer field.
    pub fn int(&self, name: &str) -> Result<i64> {
        let value = self.require(name)?;
        value.as_i64().ok_or_else(|| IsfError::invalid(name, value))
    }

    /// Required numeric field, integer or float.
    pub fn float(&self, name: &str) -> Result<f64> {
        let value = self.require(name)?;
        value.as_f64().ok_or_else(|| IsfError::invalid(name, value))
    }

    /// `NR_PT` as a sample count.
    pub fn point_count(&self) -> Result<usize> {
        let points = self.int("NR_PT")?;
        usize::try_from(points).map_err(|_| IsfError::invalid("NR_PT", points))
    }

    /// Required text field, surrounding whitespace removed.
    pub fn text(&self, name: &str) -> Result<&str> {
        let value = self.require(name)?;
        value
            .as_str()
            .map(str::trim)
            .ok_or_else(|| IsfError::invalid(name, value))
    }
}

/// Location of the binary sample block inside the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadDescriptor {
    pub offset: usize,
    pub length: usize,
}

/// Result of scanning a header window.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedHeader {
    pub header: Header,
    pub payload: PayloadDescriptor,
    pub warnings: Vec<IsfWarning>,
}

/// One `:NAME value` occurrence, as character ranges into the window.
#[derive(Debug, Clone, Copy)]
struct TagSpan {
    name_start: usize,
    name_end: usize,
    value_start: usize,
    value_end: usize,
}

struct Scanner {
    text: Vec<char>,
    pos: usize,
}

impl Scanner {
    fn new(window: &[u8]) -> Self {
        // Latin-1: every byte maps to exactly one char of the same value.
        Scanner {
            text: window.iter().map(|&b| char::from(b)).collect(),
            pos: 0,
        }
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.text[start..end].iter().collect()
    }

    /// Advance to the next tag, resuming after the previous value run.
    fn next_tag(&mut self) -> Option<TagSpan> {
        while self.pos < self.text.len() {
            if let Some(span) = self.match_tag_at(self.pos) {
                self.pos = span.value_end;
                return Some(span);
            }
            self.pos += 1;
        }
        None
    }

    fn match_tag_at(&self, start: usize) -> Option<TagSpan> {
        let text = &self.text;
        if !is_delimiter(*text.get(start)?) {
            return None;
        }

        let name_start = start + 1;
        let mut pos = name_start;
        while pos < text.len() && is_identifier(text[pos]) {
            pos += 1;
        }
        let name_end = pos;
        if name_end == name_start || !text.get(pos)?.is_whitespace() {
            return None;
        }
        pos += 1;

        if text.get(pos) == Some(&'"') {
            pos += 1;
        }
        let value_start = pos;
        while pos < text.len() && text[pos] != ';' && text[pos] != '"' {
            pos += 1;
        }
        if pos == value_start {
            return None;
        }

        Some(TagSpan {
            name_start,
            name_end,
            value_start,
            value_end: pos,
        })
    }

    /// Parse `#<n><n digits>` at `start`, returning (length, offset after
    /// the last digit).
    fn curve_marker(&self, start: usize) -> Result<(usize, usize)> {
        let text = &self.text;
        if text.get(start) != Some(&'#') {
            return Err(IsfError::malformed(format!(
                "CURVE value at byte {} does not start with '#'",
                start
            )));
        }

        let count = text
            .get(start + 1)
            .and_then(|c| c.to_digit(10))
            .filter(|&n| n > 0)
            .ok_or_else(|| {
                IsfError::malformed("CURVE marker is missing its digit count")
            })? as usize;

        let digits_start = start + 2;
        let digits_end = digits_start + count;
        if digits_end > text.len() {
            return Err(IsfError::malformed(format!(
                "CURVE marker declares {} length digits but the header window ends at byte {}",
                count,
                text.len()
            )));
        }

        let mut length: usize = 0;
        for &c in &text[digits_start..digits_end] {
            let digit = c.to_digit(10).ok_or_else(|| {
                IsfError::malformed(format!("non-digit {:?} in CURVE length", c))
            })?;
            length = length
                .checked_mul(10)
                .and_then(|l| l.checked_add(digit as usize))
                .ok_or_else(|| IsfError::malformed("CURVE length overflows"))?;
        }

        Ok((length, digits_end))
    }
}

fn is_delimiter(c: char) -> bool {
    c == ':' || c == ';'
}

fn is_identifier(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Scan a header window into fields and the payload location.
///
/// Scanning stops at the CURVE marker, so binary payload bytes that happen
/// to fall inside the window are never read as tags.
pub fn parse_header(window: &[u8], duplicate_fields: DuplicateFields) -> Result<ParsedHeader> {
    let mut scanner = Scanner::new(window);
    let mut header = Header::new();
    let mut payload = None;

    while let Some(span) = scanner.next_tag() {
        let name = scanner.slice(span.name_start, span.name_end);

        if name == CURVE_TAG {
            let (length, offset) = scanner.curve_marker(span.value_start)?;
            payload = Some(PayloadDescriptor { offset, length });
            break;
        }

        let value = HeaderValue::classify(&scanner.slice(span.value_start, span.value_end));
        if let Some(previous) = header.insert(name.clone(), value) {
            match duplicate_fields {
                DuplicateFields::Overwrite => {
                    warn!("Header field {} repeated, replacing {}", name, previous)
                }
                DuplicateFields::Reject => {
                    return Err(IsfError::malformed(format!(
                        "duplicate header field {}",
                        name
                    )))
                }
            }
        }
    }

    let payload = payload.ok_or_else(|| IsfError::malformed("no CURVE marker found"))?;
    debug!(
        "Parsed {} header fields, payload at byte {} ({} bytes)",
        header.len(),
        payload.offset,
        payload.length
    );

    let mut warnings = Vec::new();
    if let (Some(width), Some(points)) = (
        header.get("BYT_NR").and_then(HeaderValue::as_i64),
        header.get("NR_PT").and_then(HeaderValue::as_i64),
    ) {
        let expected = width as i128 * points as i128;
        if expected != payload.length as i128 {
            let warning = IsfWarning::SizeMismatch {
                expected,
                declared: payload.length,
            };
            warn!("{}", warning);
            warnings.push(warning);
        }
    }

    Ok(ParsedHeader {
        header,
        payload,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const MDO_HEADER: &str = ":WFMPRE:BYT_NR 2;BIT_NR 16;ENCDG BINARY;BN_FMT RI;BYT_OR MSB;\
WFID \"Ch1, DC coupling, 2.000V/div, 4.000ms/div, 10000 points, Sample mode\";\
NR_PT 10000;PT_FMT Y;XUNIT \"s\";XINCR 4.0000E-6;XZERO -20.0000E-3;PT_OFF 0;\
YUNIT \"V\";YMULT 312.5000E-6;YOFF 0.0E+0;YZERO 0.0E+0;:CURVE #520000";

    fn parse(window: &[u8]) -> Result<ParsedHeader> {
        parse_header(window, DuplicateFields::Overwrite)
    }

    #[test]
    fn test_classify_precedence() {
        assert_eq!(HeaderValue::classify("2"), HeaderValue::Integer(2));
        assert_eq!(HeaderValue::classify("-7"), HeaderValue::Integer(-7));
        assert_eq!(HeaderValue::classify("4.0000E-6"), HeaderValue::Float(4.0e-6));
        assert_eq!(HeaderValue::classify("0.0E+0"), HeaderValue::Float(0.0));
        assert_eq!(HeaderValue::classify("10000\n"), HeaderValue::Integer(10000));
        assert_eq!(HeaderValue::classify("BINARY"), HeaderValue::Text("BINARY".to_string()));
        assert_eq!(HeaderValue::classify(" "), HeaderValue::Text(" ".to_string()));
    }

    #[test]
    fn test_parse_mdo_header() {
        let mut window = MDO_HEADER.as_bytes().to_vec();
        window.extend_from_slice(&[0u8; 64]);

        let parsed = parse(&window).unwrap();
        let header = &parsed.header;

        assert_eq!(header.int("BYT_NR").unwrap(), 2);
        assert_eq!(header.int("BIT_NR").unwrap(), 16);
        assert_eq!(header.int("NR_PT").unwrap(), 10000);
        assert_eq!(header.int("PT_OFF").unwrap(), 0);
        assert_eq!(header.text("ENCDG").unwrap(), "BINARY");
        assert_eq!(header.text("BN_FMT").unwrap(), "RI");
        assert_eq!(header.text("XUNIT").unwrap(), "s");
        assert_eq!(
            header.text("WFID").unwrap(),
            "Ch1, DC coupling, 2.000V/div, 4.000ms/div, 10000 points, Sample mode"
        );
        assert_eq!(header.float("XINCR").unwrap(), 4.0e-6);
        assert_eq!(header.float("XZERO").unwrap(), -20.0e-3);
        assert_eq!(header.float("YMULT").unwrap(), 312.5e-6);
        assert!(!header.contains("WFMPRE"));
        assert!(!header.contains(CURVE_TAG));

        assert_eq!(parsed.payload.length, 20000);
        assert_eq!(parsed.payload.offset, MDO_HEADER.len());
        assert!(parsed.warnings.is_empty());
    }

    #[test]
    fn test_payload_offset_with_high_bytes() {
        // Bytes above 0x7f must still count as one character each.
        let mut window = b":WFID \"\xb5s \xe9\xe8\";NR_PT 1;BYT_NR 1;:CURVE #11".to_vec();
        let offset = window.len();
        window.push(0xff);

        let parsed = parse(&window).unwrap();
        assert_eq!(parsed.payload.offset, offset);
        assert_eq!(parsed.payload.length, 1);
        assert_eq!(parsed.header.text("WFID").unwrap(), "\u{b5}s \u{e9}\u{e8}");
    }

    #[test]
    fn test_binary_after_curve_is_not_scanned() {
        let mut window = b":NR_PT 2;BYT_NR 1;:CURVE #12".to_vec();
        window.extend_from_slice(b";FAKE 1");

        let parsed = parse(&window).unwrap();
        assert!(!parsed.header.contains("FAKE"));
        assert_eq!(parsed.header.len(), 2);
    }

    #[test]
    fn test_missing_curve() {
        let result = parse(b":NR_PT 4;BYT_NR 2;ENCDG BIN");
        assert!(matches!(result, Err(IsfError::MalformedHeader(_))));
    }

    #[test]
    fn test_bad_curve_grammar() {
        for window in [
            &b":CURVE 123"[..],
            &b":CURVE #x12"[..],
            &b":CURVE #012"[..],
            &b":CURVE #3 12"[..],
            &b":CURVE #51234"[..],
        ] {
            let result = parse(window);
            assert!(
                matches!(result, Err(IsfError::MalformedHeader(_))),
                "accepted {:?}",
                String::from_utf8_lossy(window)
            );
        }
    }

    #[test]
    fn test_size_mismatch_warning() {
        let parsed = parse(b":NR_PT 4;BYT_NR 2;:CURVE #210").unwrap();
        assert_eq!(parsed.payload.length, 10);
        assert_eq!(
            parsed.warnings,
            vec![IsfWarning::SizeMismatch {
                expected: 8,
                declared: 10
            }]
        );
    }

    #[test]
    fn test_duplicate_fields() {
        let window = b":NR_PT 4;NR_PT 6;:CURVE #10";

        let parsed = parse(window).unwrap();
        assert_eq!(parsed.header.int("NR_PT").unwrap(), 6);
        assert_eq!(parsed.header.len(), 1);

        let result = parse_header(window, DuplicateFields::Reject);
        assert!(matches!(result, Err(IsfError::MalformedHeader(_))));
    }

    #[test]
    fn test_tag_needs_whitespace_and_value() {
        let parsed = parse(b":XUNIT \"\";YUNIT;ENCDG BIN;:CURVE #10").unwrap();
        assert!(!parsed.header.contains("XUNIT"));
        assert!(!parsed.header.contains("YUNIT"));
        assert_eq!(parsed.header.text("ENCDG").unwrap(), "BIN");
    }

    #[test]
    fn test_typed_accessors() {
        let mut header = Header::new();
        header.insert("YMULT", HeaderValue::Integer(2));
        header.insert("YUNIT", HeaderValue::Text("V".to_string()));

        assert_eq!(header.float("YMULT").unwrap(), 2.0);
        assert!(matches!(header.int("YUNIT"), Err(IsfError::InvalidField { .. })));
        assert!(matches!(header.float("YZERO"), Err(IsfError::MissingField(_))));
        assert!(matches!(header.text("YMULT"), Err(IsfError::InvalidField { .. })));
    }
}
