//! Detached signature checks with armored/binary encoding fallback.
//!
//! `Release.gpg` is usually ASCII armored, but some repositories publish a
//! binary OpenPGP packet instead. The armored attempt reports
//! [`SignatureCheck::WrongEncoding`] when the input simply is not armored;
//! only then is the binary attempt made. A signature that parses but does
//! not verify is [`SignatureCheck::Invalid`] and is never retried.

/// Outcome of one verification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureCheck {
    /// The signature covers the document and was made by a trusted key.
    Verified,
    /// The signature is not in the encoding this attempt understands.
    WrongEncoding,
    /// The signature is malformed or does not verify.
    Invalid(String),
}

/// Run the armored attempt, then the binary attempt only if the first one
/// reported [`SignatureCheck::WrongEncoding`].
pub fn with_encoding_fallback(
    armored: impl FnOnce() -> SignatureCheck,
    binary: impl FnOnce() -> SignatureCheck,
) -> SignatureCheck {
    match armored() {
        SignatureCheck::WrongEncoding => {
            tracing::debug!("Signature is not armored, retrying as binary");
            binary()
        }
        outcome => outcome,
    }
}

/// Whether bytes look like an ASCII-armored OpenPGP block.
pub fn is_armored(data: &[u8]) -> bool {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    data[start..].starts_with(b"-----BEGIN PGP ")
}
