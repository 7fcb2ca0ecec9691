use owo_colors::{OwoColorize, Stream};

use cntc::errors::{Diagnostic, DiagnosticMessage, Level};
use cntc::position::Span;
use cntc::source::Source;

fn format_level(level: Level) -> String {
    match level {
        Level::Error => format!(
            "{}",
            "ERROR".if_supports_color(Stream::Stderr, |text| text.bright_red())
        ),
    }
}

fn format_span(src: &Source<'_>, span: Option<&Span>) -> String {
    match span {
        None => "".to_owned(),
        Some(span) => format!(
            "{} ",
            span.display(src)
                .if_supports_color(Stream::Stderr, |text| text.bold())
        ),
    }
}

pub fn print_diagnostic(src: &Source<'_>, diagnostic: &Diagnostic) {
    let Diagnostic {
        level,
        message: DiagnosticMessage { span, message },
        source: _,
    } = diagnostic;

    let level = format_level(*level);
    let span = format_span(src, span.as_ref());
    eprintln!("{} {}{}", level, span, message);
}
