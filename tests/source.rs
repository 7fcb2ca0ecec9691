mod common;

use std::path::PathBuf;

use pretty_assertions::assert_eq;

use cntc::errors::{Diagnostic, Diagnostics, Level};
use cntc::parse::{Cursor, Lexer, Parser};
use cntc::position::HasSpan;
use cntc::source::{HeaderErrorKind, Source, SourceBuffer, SourceError, SourceSettings};

use self::common::{lex, with_source_file};

#[test]
fn test_no_header() {
    with_source_file(b"int x;", |file| {
        assert_eq!(file.name(), "test.cn");
        assert_eq!(file.settings(), &SourceSettings::default());
        assert_eq!(file.body_offset(), 0);
        assert_eq!(file.body_line(), 1);
    });
}

#[test]
fn test_full_header() {
    let code = b"#!/usr/bin/env cntc\n%source-name demo\n%tab-size 8\n\tx";

    with_source_file(code, |file| {
        assert_eq!(file.name(), "demo");
        assert_eq!(file.settings().tab_size, 8);
        assert_eq!(file.body_line(), 4);
        assert_eq!(&file.buf()[file.body_offset()..], b"\tx");

        let token = Lexer::new(Cursor::new(file)).next_token().unwrap();
        assert_eq!((token.line(), token.column()), (4, 9));
    });
}

#[test]
fn test_shebang_only() {
    with_source_file(b"# comment\n$", |file| {
        assert_eq!(file.body_offset(), 10);
        assert_eq!(file.body_line(), 2);
    });
}

#[test]
fn test_source_name_in_errors() {
    let err = lex("%source-name renamed.cn\nx = 1 & 2;").unwrap_err();

    assert_eq!(err.source_name(), "renamed.cn");
    assert_eq!((err.line(), err.column()), (2, 7));
}

fn load(code: &[u8]) -> Result<(), cntc::source::HeaderError> {
    let mut source_buf = SourceBuffer::new();
    let mut source = Source::new(&mut source_buf);

    source
        .load_from_string(PathBuf::from("test.cn"), code.to_vec())
        .map(|_| ())
}

#[test]
fn test_unknown_setting() {
    let err = load(b"%colour red\n").unwrap_err();

    assert_eq!(err.line, 1);
    assert_eq!(err.kind, HeaderErrorKind::UnknownSetting("colour".to_owned()));
    insta::assert_snapshot!(err.to_string(), @"invalid source header: unknown setting `colour`");
}

#[test]
fn test_invalid_tab_size() {
    let err = load(b"#!cntc\n%tab-size 17\n").unwrap_err();

    assert_eq!(err.line, 2);
    assert_eq!(err.kind, HeaderErrorKind::InvalidTabSize("17".to_owned()));
    insta::assert_snapshot!(
        err.to_string(),
        @"invalid source header: setting tab-size must be an integer between 0 and 16 (got `17`)"
    );

    let err = load(b"%tab-size four\n").unwrap_err();
    assert_eq!(err.kind, HeaderErrorKind::InvalidTabSize("four".to_owned()));

    let err = load(b"%tab-size -1\n").unwrap_err();
    assert_eq!(err.kind, HeaderErrorKind::InvalidTabSize("-1".to_owned()));
}

#[test]
fn test_missing_value() {
    let err = load(b"%tab-size\n").unwrap_err();

    assert_eq!(err.kind, HeaderErrorKind::MissingValue("tab-size".to_owned()));
}

#[test]
fn test_defaults() {
    let mut source_buf = SourceBuffer::new();
    let mut source = Source::new(&mut source_buf);

    source.set_defaults(SourceSettings {
        tab_size: 2,
        ..Default::default()
    });

    let plain = source
        .load_from_string(PathBuf::from("a.cn"), b"\tx".to_vec())
        .unwrap();
    let overridden = source
        .load_from_string(PathBuf::from("b.cn"), b"%tab-size 3\n\tx".to_vec())
        .unwrap();

    assert_eq!(source.get(plain).unwrap().settings().tab_size, 2);
    assert_eq!(source.get(overridden).unwrap().settings().tab_size, 3);
    assert_eq!(source.iter().count(), 2);
}

#[test]
fn test_position_display() {
    let mut source_buf = SourceBuffer::new();
    let mut source = Source::new(&mut source_buf);
    let id = source
        .load_from_string(PathBuf::from("dir/main.cn"), b"x = 1 + ;".to_vec())
        .unwrap();

    let err = {
        let file = source.get(id).unwrap();
        let lexer = Lexer::new(Cursor::new(file));

        match Parser::new(lexer).parse() {
            Ok(_) => panic!("parsing unexpectedly succeeded"),
            Err(e) => e.span().into_owned(),
        }
    };

    assert_eq!(err.display(&source).to_string(), "dir/main.cn:1:9");
}

#[test]
fn test_missing_file() {
    let mut source_buf = SourceBuffer::new();
    let mut source = Source::new(&mut source_buf);

    let result = source.load(PathBuf::from("this/file/does/not/exist.cn"));

    assert!(matches!(result, Err(SourceError::Io(_))));
}

#[test]
fn test_diagnostics() {
    let mut emitted = Vec::new();

    {
        let mut diagnostics = Diagnostics::new();
        diagnostics.set_emitter(Box::new(|diagnostic: &Diagnostic| {
            emitted.push((diagnostic.level, diagnostic.to_string()));
        }));

        assert!(!diagnostics.has_errors());
        assert_eq!(diagnostics.error_count(), 0);

        diagnostics.error().with_message("cannot read input").emit();
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.error_count(), 1);

        let err = lex("x = 12.;").unwrap_err();
        diagnostics.error().with_span_and_error(err).emit();
        assert_eq!(diagnostics.error_count(), 2);
        assert_eq!(diagnostics.iter().count(), 2);

        let span = diagnostics
            .iter()
            .last()
            .and_then(|diagnostic| diagnostic.message.span.clone())
            .unwrap();
        assert_eq!((span.start.line, span.start.col), (1, 5));
    }

    assert_eq!(
        emitted,
        vec![
            (Level::Error, "cannot read input".to_owned()),
            (
                Level::Error,
                "lexical analysis failed: malformed number".to_owned()
            ),
        ]
    );
}
