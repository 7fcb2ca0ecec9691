use std::borrow::Cow;
use std::fmt::{self, Display};
use std::io::{self, Write};

use byte_string::ByteStr;
use itertools::Itertools;
use once_cell::sync::OnceCell;
use phf::phf_map;
use serde::Serialize;

use crate::position::{HasSpan, Span};
use crate::util::CloneStatic;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Token<'buf> {
    pub span: Span,
    pub value: TokenValue<'buf>,
}

impl<'buf> Token<'buf> {
    pub fn ty(&self) -> TokenType {
        self.value.ty()
    }

    pub fn line(&self) -> usize {
        self.span.start.line
    }

    pub fn column(&self) -> usize {
        self.span.start.col
    }

    /// Returns the text carried by the token, or an empty slice for payload-less kinds.
    pub fn lexeme(&self) -> &[u8] {
        self.value.lexeme()
    }
}

impl HasSpan for Token<'_> {
    fn span(&self) -> Cow<'_, Span> {
        Cow::Borrowed(&self.span)
    }
}

impl CloneStatic<Token<'static>> for Token<'_> {
    fn clone_static(&self) -> Token<'static> {
        Token {
            span: self.span.clone(),
            value: self.value.clone_static(),
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum TokenType {
    Eof,
    Ident,
    Label,
    IntLit,
    RealLit,
    StringLit,
    Symbol(Symbol),
}

impl Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eof => write!(f, "end of stream"),
            Self::Ident => write!(f, "an identifier"),
            Self::Label => write!(f, "a label"),
            Self::IntLit => write!(f, "an integer literal"),
            Self::RealLit => write!(f, "a real literal"),
            Self::StringLit => write!(f, "a string literal"),
            Self::Symbol(sym) => write!(f, "`{}`", sym),
        }
    }
}

impl TokenType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Eof => "end_of_stream",
            Self::Ident => "identifier",
            Self::Label => "label",
            Self::IntLit => "int_literal",
            Self::RealLit => "real_literal",
            Self::StringLit => "string_literal",
            Self::Symbol(sym) => sym.kind_name(),
        }
    }
}

#[derive(Serialize, Clone, PartialEq)]
pub enum TokenValue<'buf> {
    Eof,
    Ident(Cow<'buf, [u8]>),
    Label(Cow<'buf, [u8]>),
    IntLit(Cow<'buf, [u8]>),
    RealLit(Cow<'buf, [u8]>),

    /// A string literal with its escape sequences already decoded.
    StringLit(Cow<'buf, [u8]>),

    Symbol(Symbol),
}

impl TokenValue<'_> {
    pub fn ty(&self) -> TokenType {
        match self {
            Self::Eof => TokenType::Eof,
            Self::Ident(_) => TokenType::Ident,
            Self::Label(_) => TokenType::Label,
            Self::IntLit(_) => TokenType::IntLit,
            Self::RealLit(_) => TokenType::RealLit,
            Self::StringLit(_) => TokenType::StringLit,
            Self::Symbol(sym) => TokenType::Symbol(*sym),
        }
    }

    pub fn lexeme(&self) -> &[u8] {
        match self {
            Self::Eof | Self::Symbol(_) => &[],

            Self::Ident(s)
            | Self::Label(s)
            | Self::IntLit(s)
            | Self::RealLit(s)
            | Self::StringLit(s) => s.as_ref(),
        }
    }
}

impl fmt::Debug for TokenValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eof => write!(f, "Eof"),
            Self::Ident(s) => f.debug_tuple("Ident").field(&ByteStr::new(s)).finish(),
            Self::Label(s) => f.debug_tuple("Label").field(&ByteStr::new(s)).finish(),
            Self::IntLit(s) => f.debug_tuple("IntLit").field(&ByteStr::new(s)).finish(),
            Self::RealLit(s) => f.debug_tuple("RealLit").field(&ByteStr::new(s)).finish(),
            Self::StringLit(s) => f.debug_tuple("StringLit").field(&ByteStr::new(s)).finish(),
            Self::Symbol(sym) => f.debug_tuple("Symbol").field(sym).finish(),
        }
    }
}

impl CloneStatic<TokenValue<'static>> for TokenValue<'_> {
    fn clone_static(&self) -> TokenValue<'static> {
        match self {
            Self::Eof => TokenValue::Eof,
            Self::Ident(s) => TokenValue::Ident(s.clone_static()),
            Self::Label(s) => TokenValue::Label(s.clone_static()),
            Self::IntLit(s) => TokenValue::IntLit(s.clone_static()),
            Self::RealLit(s) => TokenValue::RealLit(s.clone_static()),
            Self::StringLit(s) => TokenValue::StringLit(s.clone_static()),
            Self::Symbol(sym) => TokenValue::Symbol(*sym),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolCategory {
    Keyword,
    Operator,
    Punctuation,
}

macro_rules! symbols {
    ($( $category:ident { $( $lit:literal => $variant:ident ),+ $(,)? } )+) => {
        #[derive(Serialize, Debug, Clone, Copy, Hash, Eq, PartialEq)]
        pub enum Symbol {
            $( $( $variant ),+ ),+
        }

        impl Symbol {
            const SYMBOLS: phf::Map<&'static [u8], Symbol> = phf_map! {
                $( $( $lit => Self::$variant ),+ ),+
            };

            fn get_prefix_lengths() -> &'static [usize] {
                static PREFIX_LENGTHS: OnceCell<Vec<usize>> = OnceCell::new();

                PREFIX_LENGTHS.get_or_init(|| {
                    let mut lengths = vec![$( $( $lit.len() ),+ ),+];
                    lengths.sort_unstable();
                    lengths.into_iter().rev().dedup().collect()
                })
            }

            /// Finds the longest symbol `input` starts with.
            pub fn parse_prefix(input: &[u8]) -> Option<Symbol> {
                Self::get_prefix_lengths()
                    .iter()
                    .filter_map(|&len| input.get(0..len))
                    .find_map(|prefix| Self::SYMBOLS.get(prefix))
                    .copied()
            }

            pub fn parse_exact(input: &[u8]) -> Option<Symbol> {
                Self::SYMBOLS.get(input).copied()
            }

            pub fn as_slice(self) -> &'static [u8] {
                match self {
                    $( $( Self::$variant => &$lit[..], )+ )+
                }
            }

            pub fn category(self) -> SymbolCategory {
                match self {
                    $( $( Self::$variant => SymbolCategory::$category, )+ )+
                }
            }
        }
    };
}

symbols! {
    Keyword {
        b"void" => Void,
        b"bool" => Bool,
        b"int" => Int,
        b"real" => Real,
        b"string" => String,
        b"mut" => Mut,
        b"ref" => Ref,
        b"if" => If,
        b"then" => Then,
        b"elseif" => ElseIf,
        b"else" => Else,
        b"while" => While,
        b"do" => Do,
        b"end" => End,
        b"return" => Return,
        b"break" => Break,
        b"continue" => Continue,
        b"true" => True,
        b"false" => False,
    }

    Punctuation {
        b";" => Semicolon,
        b"," => Delimiter,
        b"{" => BraceLeft,
        b"}" => BraceRight,
        b"[" => BracketLeft,
        b"]" => BracketRight,
        b"(" => ParenLeft,
        b")" => ParenRight,
    }

    Operator {
        b"=" => Assign,
        b"+" => Add,
        b"+=" => AddAssign,
        b"-" => Sub,
        b"-=" => SubAssign,
        b"*" => Mul,
        b"*=" => MulAssign,
        b"/" => Div,
        b"/=" => DivAssign,
        b"%" => Rem,
        b"%=" => RemAssign,
        b"^" => Pow,
        b"^=" => PowAssign,
        b"&&" => And,
        b"||" => Or,
        b"!" => Not,
        b"==" => Eq,
        b"!=" => Ne,
        b"<" => Lt,
        b"<=" => Le,
        b">" => Gt,
        b">=" => Ge,
    }
}

impl Symbol {
    pub fn as_str(self) -> &'static str {
        // every symbol is spelled in ascii
        std::str::from_utf8(self.as_slice()).unwrap_or_default()
    }

    /// The snake-case name of the symbol's token kind, e.g. `left_paren` or `add_assign`.
    pub fn kind_name(self) -> &'static str {
        match self {
            Self::Semicolon => "semicolon",
            Self::Delimiter => "delimiter",
            Self::BraceLeft => "left_brace",
            Self::BraceRight => "right_brace",
            Self::BracketLeft => "left_bracket",
            Self::BracketRight => "right_bracket",
            Self::ParenLeft => "left_paren",
            Self::ParenRight => "right_paren",
            Self::Assign => "assign",
            Self::Add => "add",
            Self::AddAssign => "add_assign",
            Self::Sub => "sub",
            Self::SubAssign => "sub_assign",
            Self::Mul => "mul",
            Self::MulAssign => "mul_assign",
            Self::Div => "div",
            Self::DivAssign => "div_assign",
            Self::Rem => "rem",
            Self::RemAssign => "rem_assign",
            Self::Pow => "pow",
            Self::PowAssign => "pow_assign",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Ge => "ge",

            // keywords are named after their spelling
            _ => {
                debug_assert_eq!(self.category(), SymbolCategory::Keyword);

                self.as_str()
            }
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub fn write_escaped_string(s: &[u8], out: &mut impl Write) -> io::Result<()> {
    out.write_all(b"\"")?;

    for &c in s {
        match c {
            b'\\' => out.write_all(b"\\\\")?,
            b'"' => out.write_all(b"\\\"")?,
            b'\n' => out.write_all(b"\\n")?,
            b'\t' => out.write_all(b"\\t")?,
            _ if c.is_ascii_graphic() || c == b' ' || !c.is_ascii() => out.write_all(&[c])?,
            _ => write!(out, "\\x{:02x}", c)?,
        }
    }

    out.write_all(b"\"")
}
