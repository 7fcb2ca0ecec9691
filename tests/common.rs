#![allow(dead_code)]

use std::borrow::Cow;
use std::path::PathBuf;

use once_cell::unsync::OnceCell;

use cntc::ast::dump::Sexpr;
use cntc::parse::token::Token;
use cntc::parse::{Cursor, Lexer, LexerError, Parser, ParserError};
use cntc::source::{Source, SourceBuffer, SourceFile};
use cntc::util::CloneStatic;

pub struct Dump<'a> {
    bytes: Cow<'a, [u8]>,
    string: OnceCell<String>,
}

impl PartialEq for Dump<'_> {
    fn eq(&self, other: &Dump) -> bool {
        self.bytes == other.bytes
    }
}

impl AsRef<str> for Dump<'_> {
    fn as_ref(&self) -> &str {
        self.string
            .get_or_init(|| String::from_utf8_lossy(&self.bytes).into_owned())
    }
}

impl<'a> From<&'a [u8]> for Dump<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self {
            bytes: Cow::Borrowed(bytes),
            string: OnceCell::new(),
        }
    }
}

impl From<Vec<u8>> for Dump<'_> {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Cow::Owned(bytes),
            string: OnceCell::new(),
        }
    }
}

/// Loads `code` as a source file named `test.cn` and passes it to `f`.
pub fn with_source_file<R>(code: &[u8], f: impl FnOnce(&SourceFile<'_>) -> R) -> R {
    let mut source_buf = SourceBuffer::new();
    let mut source = Source::new(&mut source_buf);
    let id = source
        .load_from_string(PathBuf::from("test.cn"), code.to_vec())
        .unwrap();

    f(source.get(id).unwrap())
}

pub fn lex(code: &str) -> Result<Vec<Token<'static>>, LexerError> {
    with_source_file(code.as_bytes(), |file| {
        Lexer::new(Cursor::new(file))
            .map(|result| result.map(|token| token.clone_static()))
            .collect()
    })
}

/// Parses `code` as a program and renders it as S-expressions, one statement per line.
pub fn parse(code: &str) -> Result<String, ParserError<'static>> {
    with_source_file(code.as_bytes(), |file| {
        Parser::new(Lexer::new(Cursor::new(file)))
            .parse()
            .map(|program| Sexpr(&program).to_string())
            .map_err(|e| e.clone_static())
    })
}

pub fn parse_expr(code: &str) -> Result<String, ParserError<'static>> {
    with_source_file(code.as_bytes(), |file| {
        Parser::new(Lexer::new(Cursor::new(file)))
            .parse_expr()
            .map(|expr| Sexpr(&*expr).to_string())
            .map_err(|e| e.clone_static())
    })
}
