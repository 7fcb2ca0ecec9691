use std::error::Error;
use std::fmt::{self, Display};

use crate::position::{HasSpan, Span};

/// The severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Error,
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub span: Option<Span>,
    pub message: String,
}

impl DiagnosticMessage {
    pub fn new(message: String) -> Self {
        Self {
            span: None,
            message,
        }
    }

    pub fn with_span(span: Span, message: String) -> Self {
        Self {
            span: Some(span),
            message,
        }
    }
}

impl From<String> for DiagnosticMessage {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for DiagnosticMessage {
    fn from(message: &str) -> Self {
        Self::new(message.to_owned())
    }
}

impl Display for DiagnosticMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.message)
    }
}

#[derive(Debug)]
pub struct Diagnostic {
    pub level: Level,
    pub message: DiagnosticMessage,
    pub source: Option<Box<dyn Error + 'static>>,
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.message)
    }
}

impl Error for Diagnostic {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref()
    }
}

pub trait SpannedError: Error + HasSpan {}

impl<T: Error + HasSpan> SpannedError for T {}

#[must_use = "DiagnosticBuilder is useless unless emitted"]
pub struct DiagnosticBuilder<'a, 'emt> {
    owner: &'a mut Diagnostics<'emt>,
    level: Level,
    message: Option<DiagnosticMessage>,
    source: Option<Box<dyn Error + 'static>>,
}

impl<'a, 'emt> DiagnosticBuilder<'a, 'emt> {
    fn new(owner: &'a mut Diagnostics<'emt>, level: Level) -> Self {
        Self {
            owner,
            level,
            message: None,
            source: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<DiagnosticMessage>) -> Self {
        self.message = Some(message.into());

        self
    }

    pub fn with_source(mut self, source: Box<dyn Error + 'static>) -> Self {
        self.source = Some(source);

        self
    }

    /// Uses the `error` to fill in the span and the message (unless already set) and the source
    /// of the diagnostic.
    pub fn with_span_and_error(mut self, error: impl SpannedError + 'static) -> Self {
        self.message = self.message.or_else(|| {
            Some(DiagnosticMessage::with_span(
                error.span().into_owned(),
                error.to_string(),
            ))
        });

        self.source = Some(Box::new(error));

        self
    }

    /// Emits the diagnostic.
    ///
    /// If no message was set, the source error's message is used instead.
    pub fn emit(self) {
        let message = match (self.message, &self.source) {
            (Some(message), _) => message,
            (None, Some(source)) => DiagnosticMessage::new(source.to_string()),
            (None, None) => DiagnosticMessage::new(self.level.to_string()),
        };

        self.owner.emit(Diagnostic {
            level: self.level,
            message,
            source: self.source,
        });
    }
}

/// Collects the diagnostics reported while processing the input.
///
/// Every emitted diagnostic is also passed to the emitter, if one is installed.
#[derive(Default)]
pub struct Diagnostics<'emt> {
    diagnostics: Vec<Diagnostic>,
    emitter: Option<Box<dyn FnMut(&Diagnostic) + 'emt>>,
    error_count: usize,
}

impl<'emt> Diagnostics<'emt> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_emitter(&mut self, emitter: Box<dyn FnMut(&Diagnostic) + 'emt>) {
        self.emitter = Some(emitter);
    }

    fn with_level(&mut self, level: Level) -> DiagnosticBuilder<'_, 'emt> {
        DiagnosticBuilder::new(self, level)
    }

    pub fn error(&mut self) -> DiagnosticBuilder<'_, 'emt> {
        self.with_level(Level::Error)
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    fn emit(&mut self, diagnostic: Diagnostic) {
        match diagnostic.level {
            Level::Error => self.error_count += 1,
        }

        if let Some(emitter) = &mut self.emitter {
            emitter(&diagnostic);
        }

        self.diagnostics.push(diagnostic);
    }
}
