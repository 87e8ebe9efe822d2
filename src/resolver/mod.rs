//! Pin resolution.
//!
//! Each pin is matched against the merged package index of its rule:
//! - `Exact` pins take the first index entry whose version is equal under
//!   Debian version ordering. Index order, not version order, decides
//!   between duplicate entries of one version.
//! - `Latest` pins take the entry with the greatest version; among entries
//!   of that version the first one encountered wins.
//!
//! A pin nothing satisfies is fatal. Unresolved pins are never skipped.

pub mod errors;

use std::collections::BTreeMap;

use anyhow::Result;

use crate::core::{DebVersion, IndexEntry, ParseError, PinSpec, VersionConstraint};

pub use errors::ResolveError;

/// What a pin resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPin {
    /// `.deb` path relative to the mirror base URL.
    pub filename: String,
    pub sha256: String,
}

/// Pin spec string to its resolution, ordered by pin spec.
pub type ResolvedMapping = BTreeMap<String, ResolvedPin>;

/// Find the index entry satisfying `pin`, if any.
///
/// Only versions of entries named like the pin are parsed; a malformed
/// version among them is an error.
pub fn resolve_pin<'a>(
    pin: &PinSpec,
    index: &'a [IndexEntry],
) -> Result<Option<&'a IndexEntry>, ParseError> {
    let mut candidates = index.iter().filter(|e| e.package == pin.name());

    match pin.constraint() {
        VersionConstraint::Exact(wanted) => {
            for entry in candidates {
                if DebVersion::parse(&entry.version)? == *wanted {
                    return Ok(Some(entry));
                }
            }
            Ok(None)
        }
        VersionConstraint::Latest => {
            let best = candidates.try_fold(
                None::<(&IndexEntry, DebVersion)>,
                |best, entry| -> Result<_, ParseError> {
                    let version = DebVersion::parse(&entry.version)?;
                    let is_new_max = match &best {
                        Some((_, current)) => version > *current,
                        None => true,
                    };
                    Ok(if is_new_max {
                        Some((entry, version))
                    } else {
                        best
                    })
                },
            )?;
            Ok(best.map(|(entry, _)| entry))
        }
    }
}

/// Resolve every pin of a rule.
pub fn resolve_pins(rule: &str, pins: &[PinSpec], index: &[IndexEntry]) -> Result<ResolvedMapping> {
    let mut resolved = ResolvedMapping::new();

    for pin in pins {
        let Some(entry) = resolve_pin(pin, index)? else {
            let available = index
                .iter()
                .filter(|e| e.package == pin.name())
                .map(|e| e.version.clone())
                .collect();
            return Err(ResolveError::Unavailable {
                pin: pin.spec().to_string(),
                rule: rule.to_string(),
                available,
            }
            .into());
        };

        tracing::debug!("{}: {} -> {} ({})", rule, pin, entry.filename, entry.version);
        resolved.insert(
            pin.spec().to_string(),
            ResolvedPin {
                filename: entry.filename.clone(),
                sha256: entry.sha256.clone(),
            },
        );
    }

    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(package: &str, version: &str) -> IndexEntry {
        IndexEntry {
            package: package.to_string(),
            version: version.to_string(),
            filename: format!("pool/main/{}_{}_amd64.deb", package, version),
            sha256: format!("sha-{}-{}", package, version),
        }
    }

    fn pin(spec: &str) -> PinSpec {
        PinSpec::parse(spec).unwrap()
    }

    fn scenario_index() -> Vec<IndexEntry> {
        vec![
            entry("foo", "1.0-1"),
            entry("bar", "2.0-1"),
            entry("foo", "1.2-1"),
        ]
    }

    #[test]
    fn test_latest_and_exact_scenario() {
        let index = scenario_index();
        let resolved = resolve_pins("rule", &[pin("foo"), pin("bar=2.0-1")], &index).unwrap();

        assert_eq!(resolved["foo"].filename, "pool/main/foo_1.2-1_amd64.deb");
        assert_eq!(resolved["foo"].sha256, "sha-foo-1.2-1");
        assert_eq!(resolved["bar=2.0-1"].filename, "pool/main/bar_2.0-1_amd64.deb");
    }

    #[test]
    fn test_latest_is_maximum_regardless_of_order() {
        let index = vec![
            entry("foo", "1.10-1"),
            entry("foo", "1.9-1"),
            entry("foo", "1.10~rc1-1"),
            entry("foo", "0:1.2"),
        ];
        let best = resolve_pin(&pin("foo=latest"), &index).unwrap().unwrap();
        assert_eq!(best.version, "1.10-1");

        let best_version = DebVersion::parse(&best.version).unwrap();
        for e in &index {
            assert!(DebVersion::parse(&e.version).unwrap() <= best_version);
        }
    }

    #[test]
    fn test_latest_tie_keeps_first() {
        let mut first = entry("foo", "1.0");
        first.filename = "first.deb".to_string();
        let mut second = entry("foo", "0:1.0");
        second.filename = "second.deb".to_string();

        let index = vec![first, second];
        let best = resolve_pin(&pin("foo"), &index).unwrap().unwrap();
        assert_eq!(best.filename, "first.deb");
    }

    #[test]
    fn test_latest_accepts_tilde_versions() {
        // Lower than any "0" seed would have been.
        let index = vec![entry("foo", "0~git20240101")];
        assert!(resolve_pin(&pin("foo"), &index).unwrap().is_some());
    }

    #[test]
    fn test_exact_uses_version_equality() {
        let index = vec![entry("foo", "1:2.0-1"), entry("foo", "2.0-1")];
        let found = resolve_pin(&pin("foo=0:2.0-1"), &index).unwrap().unwrap();
        assert_eq!(found.version, "2.0-1");
    }

    #[test]
    fn test_exact_first_match_wins() {
        let mut a = entry("foo", "1.0");
        a.filename = "a.deb".to_string();
        let mut b = entry("foo", "1.0");
        b.filename = "b.deb".to_string();

        let index = vec![a, b];
        let found = resolve_pin(&pin("foo=1.0"), &index).unwrap().unwrap();
        assert_eq!(found.filename, "a.deb");
    }

    #[test]
    fn test_exact_absent_is_fatal() {
        let index = scenario_index();
        let err = resolve_pins("debian_bookworm", &[pin("bar=3.0")], &index).unwrap_err();

        match err.downcast_ref::<ResolveError>() {
            Some(ResolveError::Unavailable { pin, rule, available }) => {
                assert_eq!(pin, "bar=3.0");
                assert_eq!(rule, "debian_bookworm");
                assert_eq!(available, &vec!["2.0-1".to_string()]);
            }
            None => panic!("unexpected error: {:#}", err),
        }
    }

    #[test]
    fn test_unknown_package_is_fatal() {
        let index = scenario_index();
        assert!(resolve_pins("rule", &[pin("baz")], &index).is_err());
    }

    #[test]
    fn test_same_package_two_pins() {
        let index = vec![entry("foo", "1.0"), entry("foo", "2.0")];
        let resolved = resolve_pins("rule", &[pin("foo=1.0"), pin("foo=2.0")], &index).unwrap();
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved["foo=1.0"].sha256, "sha-foo-1.0");
        assert_eq!(resolved["foo=2.0"].sha256, "sha-foo-2.0");
    }

    #[test]
    fn test_malformed_candidate_version_is_error() {
        let index = vec![entry("foo", "x:1.0")];
        assert!(resolve_pin(&pin("foo"), &index).is_err());
        // Other packages' versions are never looked at.
        assert!(resolve_pin(&pin("bar"), &index).unwrap().is_none());
    }
}
