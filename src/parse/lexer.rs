use std::borrow::Cow;
use std::error::Error;
use std::fmt::{self, Display};
use std::iter::FusedIterator;
use std::rc::Rc;

use serde::Serialize;
use tracing::trace;

use crate::parse::cursor::Cursor;
use crate::parse::token::{Symbol, Token, TokenValue};
use crate::position::{HasSpan, Position, Span};

type ScanResult<'buf> = Result<TokenValue<'buf>, PosLexerError>;

fn is_whitespace(c: u8) -> bool {
    matches!(c, b' ' | b'\n' | b'\t')
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_ident_continuation(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

#[derive(Serialize, Debug, Clone, Copy, Eq, PartialEq)]
pub enum LexerErrorKind {
    MalformedNumber,
    UnterminatedComment,
    UnterminatedString,
    InvalidEscape(u8),
    UnexpectedSymbol(u8),
}

fn write_char(f: &mut fmt::Formatter<'_>, c: u8) -> fmt::Result {
    if c.is_ascii_graphic() {
        write!(f, "{}", c as char)
    } else {
        write!(f, "\\x{:02x}", c)
    }
}

impl Display for LexerErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedNumber => write!(f, "malformed number"),
            Self::UnterminatedComment => write!(f, "unterminated block comment"),
            Self::UnterminatedString => write!(f, "unterminated string"),

            Self::InvalidEscape(c) => {
                write!(f, "invalid escape sequence '\\")?;
                write_char(f, *c)?;
                write!(f, "'")
            }

            Self::UnexpectedSymbol(c) => {
                write!(f, "unexpected symbol '")?;
                write_char(f, *c)?;
                write!(f, "'")
            }
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
struct PosLexerError {
    start: Option<Position>,
    end: Position,
    kind: LexerErrorKind,
}

impl PosLexerError {
    fn with_start(self, start: Position, source_name: Rc<str>) -> LexerError {
        LexerError {
            source_name,
            span: Span {
                start: self.start.unwrap_or(start),
                end: self.end,
            },
            kind: self.kind,
        }
    }
}

#[derive(Serialize, Debug, Clone, Eq, PartialEq)]
pub struct LexerError {
    source_name: Rc<str>,
    span: Span,
    kind: LexerErrorKind,
}

impl LexerError {
    pub fn kind(&self) -> LexerErrorKind {
        self.kind
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn line(&self) -> usize {
        self.span.start.line
    }

    pub fn column(&self) -> usize {
        self.span.start.col
    }
}

impl Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lexical analysis failed: {}", self.kind)
    }
}

impl Error for LexerError {}

impl HasSpan for LexerError {
    fn span(&self) -> Cow<'_, Span> {
        Cow::Borrowed(&self.span)
    }
}

/// Produces tokens from a [`Cursor`] one at a time.
///
/// [`Lexer::next_token`] keeps returning the end-of-stream token once the input is exhausted.
/// The [`Iterator`] implementation yields the end-of-stream token (or the first error) once
/// and then stops.
#[derive(Debug, Clone)]
pub struct Lexer<'buf> {
    cursor: Cursor<'buf>,
    exhausted: bool,
}

impl<'buf> Lexer<'buf> {
    pub fn new(cursor: Cursor<'buf>) -> Self {
        Self {
            cursor,
            exhausted: false,
        }
    }

    pub fn pos(&self) -> Position {
        self.cursor.pos()
    }

    fn create_error_at_pos(&self, kind: LexerErrorKind) -> PosLexerError {
        PosLexerError {
            start: None,
            end: self.cursor.pos(),
            kind,
        }
    }

    fn scan_number(&mut self) -> ScanResult<'buf> {
        let start = self.cursor.pos();
        self.cursor.consume_while(u8::is_ascii_digit);

        if self.cursor.consume_expecting(b".").is_none() {
            return Ok(TokenValue::IntLit(self.cursor.consumed_since(start).into()));
        }

        if self.cursor.consume_while(u8::is_ascii_digit).is_empty() {
            return Err(self.create_error_at_pos(LexerErrorKind::MalformedNumber));
        }

        Ok(TokenValue::RealLit(self.cursor.consumed_since(start).into()))
    }

    fn scan_ident_or_keyword(&mut self) -> ScanResult<'buf> {
        let ident = self.cursor.consume_while(|&c| is_ident_continuation(c));

        if let Some(sym) = Symbol::parse_exact(ident) {
            return Ok(TokenValue::Symbol(sym));
        }

        if self.cursor.consume_expecting(b":").is_some() {
            Ok(TokenValue::Label(ident.into()))
        } else {
            Ok(TokenValue::Ident(ident.into()))
        }
    }

    fn scan_string(&mut self) -> ScanResult<'buf> {
        self.cursor.consume_expecting(b"\"");

        let body_start = self.cursor.pos();
        let mut decoded: Option<Vec<u8>> = None;

        loop {
            let escape_start = self.cursor.pos();

            match self.cursor.next() {
                None | Some(b'\n') => {
                    return Err(self.create_error_at_pos(LexerErrorKind::UnterminatedString));
                }

                Some(b'"') => break,

                Some(b'\\') => {
                    let raw = self.cursor.consumed_since(body_start);
                    let value = decoded.get_or_insert_with(|| raw[..raw.len() - 1].to_vec());

                    value.push(match self.cursor.next() {
                        Some(b'\\') => b'\\',
                        Some(b'"') => b'"',
                        Some(b'\'') => b'\'',
                        Some(b'n') => b'\n',
                        Some(b't') => b'\t',

                        None | Some(b'\n') => {
                            return Err(
                                self.create_error_at_pos(LexerErrorKind::UnterminatedString)
                            );
                        }

                        Some(c) => {
                            return Err(PosLexerError {
                                start: Some(escape_start),
                                end: self.cursor.prev_pos(),
                                kind: LexerErrorKind::InvalidEscape(c),
                            });
                        }
                    });
                }

                Some(c) => {
                    if let Some(value) = &mut decoded {
                        value.push(c);
                    }
                }
            }
        }

        Ok(TokenValue::StringLit(match decoded {
            Some(value) => Cow::Owned(value),

            None => {
                let raw = self.cursor.consumed_since(body_start);

                // strip the closing quote
                Cow::Borrowed(&raw[..raw.len() - 1])
            }
        }))
    }

    fn scan_symbol(&mut self, c: u8) -> ScanResult<'buf> {
        match Symbol::parse_prefix(self.cursor.remaining()) {
            Some(sym) => {
                self.cursor.consume_n(sym.as_slice().len());

                Ok(TokenValue::Symbol(sym))
            }

            None => Err(self.create_error_at_pos(LexerErrorKind::UnexpectedSymbol(c))),
        }
    }

    fn skip_comment(&mut self) {
        self.cursor.consume_expecting(b"//");
        self.cursor.consume_while(|&c| c != b'\n');
        self.cursor.next();
    }

    fn skip_block_comment(&mut self) -> Result<(), PosLexerError> {
        self.cursor.consume_expecting(b"/*");

        loop {
            match self.cursor.next() {
                None => return Err(self.create_error_at_pos(LexerErrorKind::UnterminatedComment)),
                Some(b'*') if self.cursor.consume_expecting(b"/").is_some() => return Ok(()),
                Some(_) => {}
            }
        }
    }

    fn skip_whitespace(&mut self) {
        self.cursor.consume_while(|&c| is_whitespace(c));
    }

    /// Scans the next token.
    pub fn next_token(&mut self) -> Result<Token<'buf>, LexerError> {
        let mut start;

        let scan_result = loop {
            start = self.cursor.pos();

            break match self.cursor.peek() {
                None => {
                    return Ok(Token {
                        value: TokenValue::Eof,
                        span: Span { start, end: start },
                    });
                }

                Some(b'"') => self.scan_string(),

                Some(b'/') if self.cursor.starts_with(b"//") => {
                    self.skip_comment();

                    continue;
                }

                Some(b'/') if self.cursor.starts_with(b"/*") => match self.skip_block_comment() {
                    Ok(()) => continue,
                    Err(e) => break Err(e),
                },

                Some(c) if is_whitespace(c) => {
                    self.skip_whitespace();

                    continue;
                }

                Some(c) if c.is_ascii_digit() => self.scan_number(),
                Some(c) if is_ident_start(c) => self.scan_ident_or_keyword(),
                Some(c) => self.scan_symbol(c),
            };
        };

        match scan_result {
            Ok(value) => {
                let token = Token {
                    span: Span {
                        start,
                        end: self.cursor.prev_pos(),
                    },
                    value,
                };

                trace!(?token, "scanned a token");

                Ok(token)
            }

            Err(err) => Err(err.with_start(start, self.cursor.source_name().clone())),
        }
    }
}

impl<'buf> Iterator for Lexer<'buf> {
    type Item = Result<Token<'buf>, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        let result = self.next_token();
        self.exhausted = matches!(
            result,
            Ok(Token {
                value: TokenValue::Eof,
                ..
            }) | Err(_)
        );

        Some(result)
    }
}

impl<'buf> FusedIterator for Lexer<'buf> {}
