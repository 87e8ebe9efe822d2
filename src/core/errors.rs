//! Errors raised while parsing repository metadata and rule attributes.

use miette::Diagnostic;
use thiserror::Error;

/// Malformed repository metadata, package index, or rule attribute text.
///
/// Parse errors are always fatal: malformed metadata is never repaired.
#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    #[error("{source_name}:{line}: {message}")]
    #[diagnostic(code(debpin::parse::malformed))]
    Malformed {
        source_name: String,
        line: usize,
        message: String,
    },

    #[error("missing field `{field}` in {context}")]
    #[diagnostic(code(debpin::parse::missing_field))]
    MissingField { field: String, context: String },

    #[error("invalid SHA256 line in Release file: `{line}`")]
    #[diagnostic(
        code(debpin::parse::release_line),
        help("expected `<sha256> <size> <path>`")
    )]
    ReleaseLine { line: String },

    #[error("invalid version `{version}`: {reason}")]
    #[diagnostic(code(debpin::parse::version))]
    InvalidVersion { version: String, reason: String },

    #[error("invalid source `{source_str}`: {reason}")]
    #[diagnostic(
        code(debpin::parse::source),
        help("sources are written as `<url> <distribution> [<component> ...]`")
    )]
    InvalidSource { source_str: String, reason: String },

    #[error("invalid package pin `{spec}`: {reason}")]
    #[diagnostic(
        code(debpin::parse::pin),
        help("pins are written as `<name>` or `<name>=<version>`")
    )]
    InvalidPin { spec: String, reason: String },

    #[error("package index is not valid UTF-8: {0}")]
    #[diagnostic(code(debpin::parse::encoding))]
    Encoding(#[from] std::string::FromUtf8Error),
}
