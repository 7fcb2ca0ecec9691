//! Per-file settings read from the header of a source file.
//!
//! A file may start with a `#` line (a shebang, ignored) followed by any number of `%key value`
//! lines. The header is consumed before lexing begins.

use std::error::Error;
use std::fmt::{self, Display};
use std::str;

use serde::Serialize;

pub const DEFAULT_TAB_SIZE: u8 = 4;
pub const MAX_TAB_SIZE: u8 = 16;

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceSettings {
    /// The name reported in diagnostics instead of the file path.
    pub source_name: Option<String>,
    pub tab_size: u8,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            source_name: None,
            tab_size: DEFAULT_TAB_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub settings: SourceSettings,

    /// The byte offset of the first character after the header.
    pub body_offset: usize,

    /// The line number of the first line after the header.
    pub body_line: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub enum HeaderErrorKind {
    UnknownSetting(String),
    MissingValue(String),
    InvalidTabSize(String),
}

impl Display for HeaderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSetting(key) => write!(f, "unknown setting `{}`", key),
            Self::MissingValue(key) => write!(f, "the setting `{}` requires a value", key),

            Self::InvalidTabSize(value) => write!(
                f,
                "setting tab-size must be an integer between 0 and {} (got `{}`)",
                MAX_TAB_SIZE, value
            ),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct HeaderError {
    pub line: usize,
    pub kind: HeaderErrorKind,
}

impl Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid source header: {}", self.kind)
    }
}

impl Error for HeaderError {}

fn trim(mut s: &[u8]) -> &[u8] {
    while let [b' ' | b'\t', rest @ ..] = s {
        s = rest;
    }

    while let [rest @ .., b' ' | b'\t' | b'\r'] = s {
        s = rest;
    }

    s
}

/// Splits off the first line of `buf`, returning its contents without the line terminator and
/// the number of bytes consumed (terminator included).
fn split_line(buf: &[u8]) -> (&[u8], usize) {
    match buf.iter().position(|&c| c == b'\n') {
        Some(idx) => (&buf[..idx], idx + 1),
        None => (buf, buf.len()),
    }
}

fn lossy(s: &[u8]) -> String {
    String::from_utf8_lossy(s).into_owned()
}

fn parse_tab_size(value: &[u8]) -> Result<u8, HeaderErrorKind> {
    str::from_utf8(value)
        .ok()
        .and_then(|s| s.parse::<u8>().ok())
        .filter(|&size| size <= MAX_TAB_SIZE)
        .ok_or_else(|| HeaderErrorKind::InvalidTabSize(lossy(value)))
}

pub fn parse_header(buf: &[u8], defaults: SourceSettings) -> Result<Header, HeaderError> {
    let mut settings = defaults;
    let mut offset = 0;
    let mut line = 1;

    if buf.starts_with(b"#") {
        let (_, consumed) = split_line(buf);
        offset += consumed;
        line += 1;
    }

    while buf[offset..].starts_with(b"%") {
        let (content, consumed) = split_line(&buf[offset + 1..]);

        let (key, value) = match content.iter().position(|&c| c == b' ') {
            Some(idx) => (&content[..idx], trim(&content[idx + 1..])),
            None => (trim(content), &b""[..]),
        };

        let error = |kind| HeaderError { line, kind };

        if value.is_empty() {
            return Err(error(HeaderErrorKind::MissingValue(lossy(key))));
        }

        match key {
            b"source-name" => settings.source_name = Some(lossy(value)),
            b"tab-size" => settings.tab_size = parse_tab_size(value).map_err(error)?,
            _ => return Err(error(HeaderErrorKind::UnknownSetting(lossy(key)))),
        }

        offset += consumed + 1;
        line += 1;
    }

    Ok(Header {
        settings,
        body_offset: offset,
        body_line: line,
    })
}
