use std::path::PathBuf;

use clap::{arg, command, value_parser, ValueEnum};

use cntc::source::settings::{DEFAULT_TAB_SIZE, MAX_TAB_SIZE};

#[derive(Debug, Clone)]
pub struct CntcConfig {
    pub paths: Vec<PathBuf>,
    pub output: OutputKind,
    pub tab_size: u8,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum CompilationStage {
    Lexer,
    #[default]
    Parser,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Sexpr,
    Debug,
    Ron,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LexerOutputFormat {
    /// One `line:col KIND lexeme` line per token.
    #[default]
    Listing,
    Debug,
    Ron,
}

impl TryFrom<OutputFormat> for LexerOutputFormat {
    type Error = &'static str;

    fn try_from(format: OutputFormat) -> Result<LexerOutputFormat, Self::Error> {
        match format {
            OutputFormat::Debug => Ok(Self::Debug),
            OutputFormat::Ron => Ok(Self::Ron),
            OutputFormat::Sexpr => {
                Err("this format cannot be used for the current compilation stage")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParserOutputFormat {
    #[default]
    Sexpr,
    Debug,
    Ron,
}

impl From<OutputFormat> for ParserOutputFormat {
    fn from(format: OutputFormat) -> ParserOutputFormat {
        match format {
            OutputFormat::Sexpr => Self::Sexpr,
            OutputFormat::Debug => Self::Debug,
            OutputFormat::Ron => Self::Ron,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    Lexer(LexerOutputFormat),
    Parser(ParserOutputFormat),
}

pub fn parse_args_or_exit() -> CntcConfig {
    use clap::Command;

    fn command() -> Command {
        command!()
            .arg(
                arg!(files: <FILE> ... "input files")
                    .value_parser(value_parser!(PathBuf))
                    .required(true),
            )
            .arg(
                arg!(-s --stage <STAGE> "the compilation stage to perform")
                    .value_parser(value_parser!(CompilationStage))
                    .required(false),
            )
            .arg(
                arg!(-f --format <FORMAT> "the output format")
                    .value_parser(value_parser!(OutputFormat)),
            )
            .arg(
                arg!(-t --"tab-size" <N> "the default tab width used to compute columns")
                    .value_parser(value_parser!(u8).range(0..=i64::from(MAX_TAB_SIZE))),
            )
    }

    fn parse_args() -> Result<CntcConfig, clap::Error> {
        use clap::error::ErrorKind;

        let mut command = command();
        let matches = command.get_matches_mut();

        let paths = matches
            .get_many::<PathBuf>("files")
            .into_iter()
            .flatten()
            .cloned()
            .collect();

        let stage = matches
            .get_one::<CompilationStage>("stage")
            .copied()
            .unwrap_or_default();
        let format = matches.get_one::<OutputFormat>("format").copied();

        let output = match stage {
            CompilationStage::Lexer => {
                let format = match format {
                    Some(format) => format.try_into(),
                    None => Ok(Default::default()),
                };

                OutputKind::Lexer(
                    format.map_err(|msg| command.error(ErrorKind::ValueValidation, msg))?,
                )
            }

            CompilationStage::Parser => {
                OutputKind::Parser(format.map(Into::into).unwrap_or_default())
            }
        };

        let tab_size = matches
            .get_one::<u8>("tab-size")
            .copied()
            .unwrap_or(DEFAULT_TAB_SIZE);

        Ok(CntcConfig {
            paths,
            output,
            tab_size,
        })
    }

    match parse_args() {
        Ok(cfg) => cfg,

        Err(e) => {
            e.format(&mut command()).exit();
        }
    }
}
