use std::rc::Rc;

use crate::position::Position;
use crate::source::SourceFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState {
    Eof,
    HeadByte,
    ContinuationByte(u8),
}

/// A byte cursor over a source file that tracks line and column numbers.
///
/// Line terminators (`\n`, `\r\n`, and a lone `\r`) are all reported as `\n`.
#[derive(Debug, Clone)]
pub struct Cursor<'buf> {
    buf: &'buf [u8],
    source_name: Rc<str>,
    tab_size: usize,
    pos: Position,
    prev_pos: Option<Position>,
    state: CursorState,
}

impl<'buf> Cursor<'buf> {
    pub fn new(src_file: &SourceFile<'buf>) -> Self {
        let pos = Position {
            src: Some(src_file.id()),
            byte: src_file.body_offset(),
            line: src_file.body_line(),
            col: 1,
        };

        Self {
            buf: src_file.buf(),
            source_name: src_file.shared_name(),
            tab_size: src_file.settings().tab_size.into(),
            pos,
            prev_pos: None,
            state: CursorState::HeadByte,
        }
    }

    pub fn source_name(&self) -> &Rc<str> {
        &self.source_name
    }

    /// Returns the position of the immediately following character.
    pub fn pos(&self) -> Position {
        self.pos
    }

    /// Returns the position of the previously returned character.
    pub fn prev_pos(&self) -> Position {
        self.prev_pos.unwrap_or(self.pos)
    }

    pub fn peek(&self) -> Option<u8> {
        match self.buf.get(self.pos.byte) {
            Some(b'\r') => Some(b'\n'),
            c => c.copied(),
        }
    }

    pub fn remaining(&self) -> &'buf [u8] {
        &self.buf[self.pos.byte..]
    }

    pub fn starts_with(&self, value: &[u8]) -> bool {
        self.remaining().starts_with(value)
    }

    /// Returns the raw bytes between `start` and the current position.
    pub fn consumed_since(&self, start: Position) -> &'buf [u8] {
        &self.buf[start.byte..self.pos.byte]
    }

    pub fn consume_expecting(&mut self, expected: &[u8]) -> Option<&'buf [u8]> {
        self.starts_with(expected)
            .then(|| self.consume_n(expected.len()))
    }

    pub fn consume_n(&mut self, n: usize) -> &'buf [u8] {
        let start = self.pos;

        for _ in 0..n {
            self.next();
        }

        self.consumed_since(start)
    }

    pub fn consume_while(&mut self, mut predicate: impl FnMut(&u8) -> bool) -> &'buf [u8] {
        let start = self.pos;

        while matches!(self.peek(), Some(c) if predicate(&c)) {
            self.next();
        }

        self.consumed_since(start)
    }

    fn advance_head(&mut self, c: u8) -> CursorState {
        use CursorState::*;

        match c {
            b'\n' | b'\r' => {
                self.pos.line += 1;
                self.pos.col = 1;

                HeadByte
            }

            b'\t' => {
                self.pos.col += self.tab_size;

                HeadByte
            }

            _ => {
                self.pos.col += 1;

                match c {
                    // `c` is a single-byte utf-8 sequence
                    0b0000_0000..=0b0111_1111 => HeadByte,

                    // `c` is a utf-8 continuation byte in head position
                    0b1000_0000..=0b1011_1111 => HeadByte,

                    // `c` begins a 2-byte utf-8 sequence
                    0b1100_0000..=0b1101_1111 => ContinuationByte(1),

                    // `c` begins a 3-byte utf-8 sequence
                    0b1110_0000..=0b1110_1111 => ContinuationByte(2),

                    // `c` begins a 4-byte utf-8 sequence
                    0b1111_0000..=0b1111_0111 => ContinuationByte(3),

                    // `c` is an invalid head byte
                    _ => HeadByte,
                }
            }
        }
    }
}

impl<'buf> Iterator for Cursor<'buf> {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        use CursorState::*;

        if let Eof = self.state {
            return None;
        }

        let Some(&c) = self.buf.get(self.pos.byte) else {
            self.state = Eof;

            return None;
        };

        self.prev_pos = Some(self.pos);
        self.pos.byte += 1;

        if c == b'\r' && self.buf.get(self.pos.byte) == Some(&b'\n') {
            self.pos.byte += 1;
        }

        self.state = match self.state {
            Eof => unreachable!(),
            HeadByte => self.advance_head(c),

            ContinuationByte(remaining) if (0b1000_0000..=0b1011_1111).contains(&c) => {
                match remaining {
                    1 => HeadByte,
                    _ => ContinuationByte(remaining - 1),
                }
            }

            // expected a continuation byte, got something wild
            ContinuationByte(_) => self.advance_head(c),
        };

        Some(if c == b'\r' { b'\n' } else { c })
    }
}
