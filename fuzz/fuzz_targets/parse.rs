#![no_main]

use libfuzzer_sys::fuzz_target;

use cntc::ast::dump::Sexpr;
use cntc::parse::{Cursor, Lexer, Parser};
use cntc::source::{Source, SourceBuffer};

fuzz_target!(|code: &[u8]| {
    let mut source_buf = SourceBuffer::new();
    let mut source = Source::new(&mut source_buf);
    let Ok(source_id) = source.load_from_string("fuzz-input.cn".into(), code.to_vec()) else {
        return;
    };
    let source_file = source.get(source_id).unwrap();

    let cursor = Cursor::new(source_file);
    let lexer = Lexer::new(cursor);
    let parser = Parser::new(lexer);

    if let Ok(ast) = parser.parse() {
        let _ = Sexpr(&ast).to_string();
    }
});
