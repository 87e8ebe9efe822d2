//! Trusted OpenPGP public keys.

use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pgp::{Deserializable, SignedPublicKey, StandaloneSignature};

use crate::verify::signature::{is_armored, with_encoding_fallback, SignatureCheck};
use crate::verify::{IntegrityError, SignatureVerifier};

/// The set of keys trusted to sign repository metadata.
///
/// Assembled once per run and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct Keyring {
    keys: Vec<SignedPublicKey>,
}

impl Keyring {
    /// A keyring trusting nobody. Every signature check fails against it.
    pub fn empty() -> Self {
        Keyring { keys: Vec::new() }
    }

    /// Build a keyring from already parsed keys.
    pub fn from_keys(keys: Vec<SignedPublicKey>) -> Self {
        Keyring { keys }
    }

    /// Load one armored public key from each path.
    pub fn load(paths: &[PathBuf]) -> Result<Self> {
        let keys = paths
            .iter()
            .map(|path| load_armored_key(path))
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!("Loaded {} trusted key(s)", keys.len());
        Ok(Keyring { keys })
    }

    /// Number of trusted primary keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn check_armored(&self, document: &[u8], signature: &[u8]) -> SignatureCheck {
        if !is_armored(signature) {
            return SignatureCheck::WrongEncoding;
        }

        match StandaloneSignature::from_armor_many(Cursor::new(signature)) {
            Ok((signatures, _headers)) => self.check_any(signatures, document),
            Err(e) => SignatureCheck::Invalid(format!("malformed armored signature: {}", e)),
        }
    }

    fn check_binary(&self, document: &[u8], signature: &[u8]) -> SignatureCheck {
        self.check_any(
            StandaloneSignature::from_bytes_many(Cursor::new(signature)),
            document,
        )
    }

    /// Verified if any parsable signature verifies under any trusted key
    /// or subkey.
    fn check_any(
        &self,
        signatures: impl Iterator<Item = pgp::errors::Result<StandaloneSignature>>,
        document: &[u8],
    ) -> SignatureCheck {
        let mut parsed = 0;
        let mut last_error = None;

        for signature in signatures {
            let signature = match signature {
                Ok(signature) => signature,
                Err(e) => {
                    last_error = Some(format!("malformed signature packet: {}", e));
                    continue;
                }
            };
            parsed += 1;

            for key in &self.keys {
                if signature.verify(key, document).is_ok() {
                    return SignatureCheck::Verified;
                }
                for subkey in &key.public_subkeys {
                    if signature.verify(&subkey.key, document).is_ok() {
                        return SignatureCheck::Verified;
                    }
                }
            }
        }

        if self.keys.is_empty() {
            return SignatureCheck::Invalid("no trusted keys configured".to_string());
        }
        if parsed == 0 {
            return SignatureCheck::Invalid(
                last_error.unwrap_or_else(|| "no signature found".to_string()),
            );
        }
        SignatureCheck::Invalid("not signed by any trusted key".to_string())
    }
}

impl SignatureVerifier for Keyring {
    fn verify_detached(
        &self,
        name: &str,
        document: &[u8],
        signature: &[u8],
    ) -> Result<(), IntegrityError> {
        let outcome = with_encoding_fallback(
            || self.check_armored(document, signature),
            || self.check_binary(document, signature),
        );

        match outcome {
            SignatureCheck::Verified => Ok(()),
            SignatureCheck::WrongEncoding => Err(IntegrityError::BadSignature {
                name: name.to_string(),
                reason: "unrecognized signature encoding".to_string(),
            }),
            SignatureCheck::Invalid(reason) => Err(IntegrityError::BadSignature {
                name: name.to_string(),
                reason,
            }),
        }
    }
}

fn load_armored_key(path: &Path) -> Result<SignedPublicKey> {
    let file = File::open(path)
        .with_context(|| format!("failed to open PGP key: {}", path.display()))?;

    let (key, _headers) = SignedPublicKey::from_armor_single(BufReader::new(file))
        .with_context(|| format!("failed to read armored PGP key: {}", path.display()))?;

    key.verify()
        .with_context(|| format!("PGP key has invalid self-signatures: {}", path.display()))?;

    Ok(key)
}
