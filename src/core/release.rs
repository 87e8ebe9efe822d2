//! `Release` file primitives.
//!
//! The `Release` file at `dists/<distribution>/Release` is the signed
//! manifest of a repository snapshot. Its `SHA256` field lists every index
//! the repository publishes as `<digest> <size> <path>` lines, paths being
//! relative to the distribution directory.

use crate::core::control::parse_paragraphs;
use crate::core::errors::ParseError;

/// One line of the `SHA256` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseEntry {
    /// Hex SHA-256 digest of the file.
    pub sha256: String,
    /// Size of the file in bytes.
    pub size: u64,
    /// Path relative to `dists/<distribution>/`.
    pub path: String,
}

impl ReleaseEntry {
    /// Whether this entry is the gzip'd binary package index for `arch`.
    pub fn is_binary_packages_gz(&self, arch: &str) -> bool {
        self.path.ends_with(&format!("/binary-{}/Packages.gz", arch))
    }
}

/// Parsed repository metadata.
#[derive(Debug, Clone, Default)]
pub struct ReleaseFile {
    origin: Option<String>,
    suite: Option<String>,
    codename: Option<String>,
    date: Option<String>,
    sha256: Vec<ReleaseEntry>,
}

impl ReleaseFile {
    /// Parse Release file text.
    ///
    /// Only the first paragraph is meaningful.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let paragraphs = parse_paragraphs(text, "Release")?;
        let Some(para) = paragraphs.into_iter().next() else {
            return Err(ParseError::MissingField {
                field: "SHA256".to_string(),
                context: "empty Release file".to_string(),
            });
        };

        let checksums = para.field("SHA256").ok_or_else(|| ParseError::MissingField {
            field: "SHA256".to_string(),
            context: "Release file".to_string(),
        })?;

        let mut sha256 = Vec::new();
        for line in checksums.lines() {
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.is_empty() {
                continue;
            }
            let [digest, size, path] = fields.as_slice() else {
                return Err(ParseError::ReleaseLine {
                    line: line.to_string(),
                });
            };
            let size = size.parse().map_err(|_| ParseError::ReleaseLine {
                line: line.to_string(),
            })?;
            sha256.push(ReleaseEntry {
                sha256: digest.to_ascii_lowercase(),
                size,
                path: path.to_string(),
            });
        }

        Ok(ReleaseFile {
            origin: para.field("Origin").map(str::to_string),
            suite: para.field("Suite").map(str::to_string),
            codename: para.field("Codename").map(str::to_string),
            date: para.field("Date").map(str::to_string),
            sha256,
        })
    }

    /// Entries of the `SHA256` field, in file order.
    pub fn sha256_entries(&self) -> &[ReleaseEntry] {
        &self.sha256
    }

    /// Binary `Packages.gz` indices for an architecture, in file order.
    pub fn packages_indices<'a>(&'a self, arch: &'a str) -> impl Iterator<Item = &'a ReleaseEntry> {
        self.sha256.iter().filter(move |e| e.is_binary_packages_gz(arch))
    }

    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn suite(&self) -> Option<&str> {
        self.suite.as_deref()
    }

    pub fn codename(&self) -> Option<&str> {
        self.codename.as_deref()
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }
}
