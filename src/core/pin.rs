//! Package pins.
//!
//! Supports:
//! - Latest: `libc6` or `libc6=latest`
//! - Exact: `libc6=2.36-9+deb12u4`

use std::fmt;

use crate::core::errors::ParseError;
use crate::core::version::DebVersion;

/// What version a pin asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionConstraint {
    /// The highest version available in the index.
    Latest,
    /// Exactly this version, under Debian version equality.
    Exact(DebVersion),
}

/// A parsed pin, keyed by the string it was written as.
///
/// Two pins for the same package with different versions are distinct
/// pins, so `foo=1.0` and `foo=2.0` can live in the same rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinSpec {
    spec: String,
    name: String,
    constraint: VersionConstraint,
}

impl PinSpec {
    /// Parse a pin like `foo` or `foo=1.0-1`.
    pub fn parse(spec: &str) -> Result<Self, ParseError> {
        let invalid = |reason: &str| ParseError::InvalidPin {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let (name, constraint) = match spec.split_once('=') {
            Some((name, version)) => {
                if version.is_empty() {
                    return Err(invalid("missing version after `=`"));
                }
                let constraint = if version == "latest" {
                    VersionConstraint::Latest
                } else {
                    VersionConstraint::Exact(DebVersion::parse(version)?)
                };
                (name, constraint)
            }
            None => (spec, VersionConstraint::Latest),
        };

        if name.is_empty() {
            return Err(invalid("missing package name"));
        }
        if name.contains(char::is_whitespace) {
            return Err(invalid("package name contains whitespace"));
        }

        Ok(PinSpec {
            spec: spec.to_string(),
            name: name.to_string(),
            constraint,
        })
    }

    /// The pin exactly as written; this is the key in rule attributes.
    pub fn spec(&self) -> &str {
        &self.spec
    }

    /// The package name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The version constraint.
    pub fn constraint(&self) -> &VersionConstraint {
        &self.constraint
    }

    /// Whether this pin tracks the latest version.
    pub fn is_latest(&self) -> bool {
        matches!(self.constraint, VersionConstraint::Latest)
    }
}

impl fmt::Display for PinSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spec)
    }
}
