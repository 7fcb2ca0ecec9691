use std::io;

use tracing::debug;

use cntc::ast::dump::{dump_ast, AstDumpFormat};
use cntc::ast::Program;
use cntc::parse::{Cursor, Lexer, Parser};
use cntc::source::SourceSettings;
use cntc::util::CloneStatic;

use super::config::{OutputKind, ParserOutputFormat};
use super::dump::dump_tokens;
use super::{PassOutput, RunnerCtx};

pub fn load_files(ctx: &mut RunnerCtx<'_, '_>) -> PassOutput<()> {
    ctx.source.borrow_mut().set_defaults(SourceSettings {
        tab_size: ctx.config.tab_size,
        ..Default::default()
    });

    for path in &ctx.config.paths {
        let result = ctx.source.borrow_mut().load(path.clone());

        if let Err(e) = result {
            ctx.diagnostics
                .error()
                .with_message(format!("could not load file {}: {}", path.display(), e))
                .with_source(Box::new(e))
                .emit();
        }
    }

    debug!(count = ctx.config.paths.len(), "loaded the input files");

    ctx.stop_if_errors(())
}

pub fn scan_files<'buf>(ctx: &mut RunnerCtx<'buf, '_>) -> PassOutput<Vec<Lexer<'buf>>> {
    let lexers = ctx
        .source
        .borrow()
        .iter()
        .map(|src_file| Lexer::new(Cursor::new(src_file)))
        .collect();

    PassOutput::continue_with_output(lexers)
}

pub fn dump_tokens_if_asked<'buf>(
    ctx: &mut RunnerCtx<'buf, '_>,
    mut lexers: Vec<Lexer<'buf>>,
) -> PassOutput<Vec<Lexer<'buf>>> {
    let OutputKind::Lexer(format) = ctx.config.output else {
        return PassOutput::continue_with_output(lexers);
    };

    for lexer in lexers.drain(..) {
        match dump_tokens(format, lexer, io::stdout().lock()) {
            Ok(None) => {}

            Ok(Some(e)) => {
                ctx.diagnostics.error().with_span_and_error(e).emit();
            }

            Err(e) => {
                ctx.diagnostics
                    .error()
                    .with_message("could not dump the tokens to stdout")
                    .with_source(Box::new(e))
                    .emit();
            }
        }
    }

    PassOutput::stop_with_output(lexers)
}

pub fn parse_all<'buf>(
    ctx: &mut RunnerCtx<'buf, '_>,
    mut lexers: Vec<Lexer<'buf>>,
) -> PassOutput<Vec<Program<'buf>>> {
    let mut result = Vec::with_capacity(lexers.len());

    for lexer in lexers.drain(..) {
        let parser = Parser::new(lexer);

        match parser.parse() {
            Ok(program) => {
                debug!(stmts = program.body.len(), "parsed a source file");
                result.push(program);
            }

            Err(e) => {
                ctx.diagnostics
                    .error()
                    .with_span_and_error(e.clone_static())
                    .emit();
            }
        }
    }

    debug!(
        parsed = result.len(),
        failed = ctx.config.paths.len().saturating_sub(result.len()),
        "syntax analysis finished"
    );

    ctx.stop_if_errors(result)
}

pub fn dump_asts_if_asked<'buf>(
    ctx: &mut RunnerCtx<'buf, '_>,
    mut asts: Vec<Program<'buf>>,
) -> PassOutput<Vec<Program<'buf>>> {
    let OutputKind::Parser(format) = ctx.config.output else {
        return PassOutput::continue_with_output(asts);
    };

    let format = match format {
        ParserOutputFormat::Sexpr => AstDumpFormat::Sexpr,
        ParserOutputFormat::Debug => AstDumpFormat::Debug,
        ParserOutputFormat::Ron => AstDumpFormat::Ron,
    };

    for ast in asts.drain(..) {
        if let Err(e) = dump_ast(format, &ast, io::stdout().lock()) {
            ctx.diagnostics
                .error()
                .with_message("could not dump an ast to stdout")
                .with_source(Box::new(e))
                .emit();
        }
    }

    PassOutput::stop_with_output(asts)
}
