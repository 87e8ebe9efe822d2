//! Binary package index entries.

use crate::core::control::parse_paragraphs;
use crate::core::errors::ParseError;

/// One package paragraph of a `Packages` index.
///
/// The version is kept as written; it is only parsed when a pin asks about
/// this package, so unrelated odd versions never abort a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub package: String,
    pub version: String,
    /// Path of the `.deb` relative to the mirror base URL.
    pub filename: String,
    pub sha256: String,
}

/// Parse a (possibly concatenated) `Packages` index.
pub fn parse_packages_index(text: &str) -> Result<Vec<IndexEntry>, ParseError> {
    parse_paragraphs(text, "Packages")?
        .iter()
        .map(|para| -> Result<IndexEntry, ParseError> {
            let package = para.required_field("Package", "package index entry")?;
            let context = format!("index entry for `{}`", package);
            Ok(IndexEntry {
                package: package.to_string(),
                version: para.required_field("Version", &context)?.to_string(),
                filename: para.required_field("Filename", &context)?.to_string(),
                sha256: para.required_field("SHA256", &context)?.to_ascii_lowercase(),
            })
        })
        .collect()
}
