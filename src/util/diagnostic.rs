//! Suggestions attached to errors.
//!
//! The typed errors carry a `miette` help line; this walks an `anyhow`
//! chain to find it so the CLI can print it under the error.

use std::error::Error as StdError;

use miette::Diagnostic;

use crate::core::ParseError;
use crate::document::ConfigError;
use crate::resolver::ResolveError;
use crate::sources::TransportError;
use crate::verify::IntegrityError;

fn diagnostic_of<'a>(cause: &'a (dyn StdError + 'static)) -> Option<&'a dyn Diagnostic> {
    if let Some(e) = cause.downcast_ref::<ConfigError>() {
        return Some(e);
    }
    if let Some(e) = cause.downcast_ref::<ParseError>() {
        return Some(e);
    }
    if let Some(e) = cause.downcast_ref::<TransportError>() {
        return Some(e);
    }
    if let Some(e) = cause.downcast_ref::<IntegrityError>() {
        return Some(e);
    }
    cause.downcast_ref::<ResolveError>().map(|e| e as &dyn Diagnostic)
}

/// The help text of the first error in the chain that has one.
pub fn help(err: &anyhow::Error) -> Option<String> {
    err.chain()
        .filter_map(diagnostic_of)
        .find_map(|d| d.help().map(|h| h.to_string()))
}
