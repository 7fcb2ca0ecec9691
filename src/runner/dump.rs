use std::io::{self, Write};

use cntc::ast::dump::to_ron;
use cntc::parse::token::{write_escaped_string, Token, TokenValue};
use cntc::parse::{Lexer, LexerError};

use super::config::LexerOutputFormat;

/// Writes the tokens produced by `lexer` to `out`.
///
/// A lexical error stops the dump and is handed back to the caller.
pub fn dump_tokens<'buf>(
    format: LexerOutputFormat,
    lexer: Lexer<'buf>,
    mut out: impl Write,
) -> io::Result<Option<LexerError>> {
    let mut tokens = Vec::new();
    let mut error = None;

    for result in lexer {
        match result {
            Ok(token) => tokens.push(token),

            Err(e) => {
                error = Some(e);

                break;
            }
        }
    }

    match format {
        LexerOutputFormat::Listing => {
            for token in &tokens {
                write_token(token, &mut out)?;
            }
        }

        LexerOutputFormat::Debug => writeln!(out, "{:#?}", tokens)?,
        LexerOutputFormat::Ron => writeln!(out, "{}", to_ron(&tokens)?)?,
    }

    Ok(error)
}

fn write_token(token: &Token<'_>, out: &mut impl Write) -> io::Result<()> {
    write!(out, "{}:{} {}", token.line(), token.column(), token.ty().name())?;

    match &token.value {
        TokenValue::Eof | TokenValue::Symbol(_) => {}

        TokenValue::StringLit(s) => {
            write!(out, " ")?;
            write_escaped_string(s, out)?;
        }

        TokenValue::Ident(s)
        | TokenValue::Label(s)
        | TokenValue::IntLit(s)
        | TokenValue::RealLit(s) => {
            write!(out, " ")?;
            out.write_all(s)?;
        }
    }

    writeln!(out)
}
