//! Repository trust.
//!
//! Two checks guard everything that is parsed for package data:
//! the detached OpenPGP signature over `Release`, and the SHA-256 of every
//! index file as recorded in that verified `Release`. Both are fatal on
//! failure; there is no best-effort mode.

pub mod keyring;
pub mod signature;

use std::path::Path;

use anyhow::Result;
use miette::Diagnostic;
use thiserror::Error;

use crate::util::hash::sha256_file;

pub use keyring::Keyring;
pub use signature::{with_encoding_fallback, SignatureCheck};

/// Repository content failed authentication.
#[derive(Debug, Error, Diagnostic)]
pub enum IntegrityError {
    #[error("bad signature for {name}: {reason}")]
    #[diagnostic(
        code(debpin::verify::signature),
        help("The repository may be compromised, or the trusted keys (--pgp-key) are outdated")
    )]
    BadSignature { name: String, reason: String },

    #[error("downloaded file {name} is corrupt: expected sha256 {expected}, got {actual}")]
    #[diagnostic(code(debpin::verify::hash_mismatch))]
    HashMismatch {
        name: String,
        expected: String,
        actual: String,
    },
}

/// Verifies a detached signature over a document.
pub trait SignatureVerifier {
    /// Succeed only if `signature` is a valid signature over exactly
    /// `document` by a trusted key.
    fn verify_detached(
        &self,
        name: &str,
        document: &[u8],
        signature: &[u8],
    ) -> Result<(), IntegrityError>;
}

/// Check a downloaded file against the digest recorded in verified metadata.
pub fn verify_sha256(path: &Path, expected: &str, name: &str) -> Result<()> {
    let actual = sha256_file(path)?;
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(IntegrityError::HashMismatch {
            name: name.to_string(),
            expected: expected.to_ascii_lowercase(),
            actual,
        }
        .into());
    }

    tracing::debug!("Hash verified for {}: {}", name, &actual[..16]);
    Ok(())
}
