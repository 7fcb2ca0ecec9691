pub mod ast;
pub mod errors;
pub mod parse;
pub mod position;
pub mod source;
pub mod util;
