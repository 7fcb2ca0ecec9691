use std::borrow::Cow;
use std::fmt::{self, Display};

use serde::Serialize;

use crate::source::{Source, SourceId};

#[derive(Serialize, Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct Position {
    pub src: Option<SourceId>,
    pub byte: usize,
    pub line: usize,
    pub col: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            src: None,
            byte: 0,
            line: 1,
            col: 1,
        }
    }
}

impl Position {
    pub fn display<'a>(&'a self, source: &'a Source<'_>) -> PositionPath<'a> {
        PositionPath {
            name: self
                .src
                .and_then(|id| source.get(id))
                .map(|file| file.name())
                .unwrap_or("<unknown>"),
            pos: self,
        }
    }
}

/// Formats a position as `name:line:col`.
pub struct PositionPath<'a> {
    name: &'a str,
    pos: &'a Position,
}

impl Display for PositionPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.name, self.pos.line, self.pos.col)
    }
}

/// A span between two positions, inclusive on the both ends.
#[derive(Serialize, Debug, Clone, Hash, Eq, PartialEq, Default)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn convex_hull(&self, other: &Span) -> Span {
        let start = if other.start.byte < self.start.byte {
            other.start
        } else {
            self.start
        };

        let end = if other.end.byte > self.end.byte {
            other.end
        } else {
            self.end
        };

        Span { start, end }
    }

    pub fn display<'a>(&'a self, source: &'a Source<'_>) -> PositionPath<'a> {
        self.start.display(source)
    }
}

#[derive(Serialize, Debug, Clone, Hash, Eq, PartialEq, Default)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

pub trait HasSpan {
    fn span(&self) -> Cow<'_, Span>;
}

impl<T: HasSpan + ?Sized> HasSpan for Box<T> {
    fn span(&self) -> Cow<'_, Span> {
        (**self).span()
    }
}

impl<T> HasSpan for Spanned<T> {
    fn span(&self) -> Cow<'_, Span> {
        Cow::Borrowed(&self.span)
    }
}
