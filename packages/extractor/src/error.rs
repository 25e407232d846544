use thiserror::Error;

/// Structural problems found while reading a drawing-exchange document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("document is empty")]
    Empty,

    #[error("line {line}: invalid group code {text:?}")]
    InvalidGroupCode { line: usize, text: String },

    #[error("line {line}: invalid value {text:?} for group code {code}")]
    InvalidValue {
        line: usize,
        code: i32,
        text: String,
    },

    #[error("line {line}: group code {code} has no value")]
    MissingValue { line: usize, code: i32 },

    #[error("line {line}: expected SECTION or EOF, found {found:?}")]
    UnexpectedRecord { line: usize, found: String },

    #[error("line {line}: SECTION is missing its name")]
    MissingSectionName { line: usize },

    #[error("section {name} is not terminated by ENDSEC")]
    UnterminatedSection { name: String },
}

/// Failure of a whole extraction run.
///
/// The message always starts with `DXF parsing failed:` regardless of the
/// underlying cause.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("DXF parsing failed: {0}")]
    Parsing(#[from] ParseError),
}
