//! Building the package index of a rule.
//!
//! For every source: `Release` and its detached signature are fetched and
//! verified, then each binary `Packages.gz` of the rule's architecture that
//! `Release` lists is fetched, checked against its recorded SHA-256 and
//! decompressed. Nothing is parsed for package data before both checks
//! passed.

use std::io::Read;

use anyhow::{Context, Result};
use flate2::read::GzDecoder;

use crate::core::{parse_packages_index, IndexEntry, ParseError, ReleaseFile, Source};
use crate::sources::MirrorFetcher;
use crate::verify::{verify_sha256, SignatureVerifier};

/// Fetch and verify the package index of one source.
///
/// Entries keep the order of the `Release` file and, within one index
/// file, the order of its paragraphs.
pub fn fetch_source_index(
    fetcher: &MirrorFetcher<'_>,
    verifier: &dyn SignatureVerifier,
    source: &Source,
    arch: &str,
) -> Result<Vec<IndexEntry>> {
    let dist = source.distribution.as_str();
    let mirrors = source.base_urls.as_slice();
    tracing::info!(
        "Fetching {} from {}",
        dist,
        mirrors
            .iter()
            .map(|u| u.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let release_file = fetcher.fetch_to_temp("Release", dist, mirrors)?;
    let signature_file = fetcher.fetch_to_temp("Release.gpg", dist, mirrors)?;

    let release_bytes = std::fs::read(release_file.path())
        .with_context(|| format!("failed to read downloaded Release of {}", dist))?;
    let signature_bytes = std::fs::read(signature_file.path())
        .with_context(|| format!("failed to read downloaded Release.gpg of {}", dist))?;

    verifier.verify_detached(
        &format!("dists/{}/Release", dist),
        &release_bytes,
        &signature_bytes,
    )?;
    tracing::debug!("Signature verified for dists/{}/Release", dist);

    let release_text = String::from_utf8(release_bytes).map_err(ParseError::from)?;
    let release = ReleaseFile::parse(&release_text)
        .with_context(|| format!("failed to parse Release of {}", dist))?;

    let mut packages = Vec::new();
    let mut fetched = 0usize;

    for entry in release.packages_indices(arch) {
        if !source.accepts_component(&entry.path) {
            continue;
        }

        let mut index_file = fetcher.fetch_to_temp(&entry.path, dist, mirrors)?;
        verify_sha256(index_file.path(), &entry.sha256, &entry.path)?;

        let start = packages.len();
        GzDecoder::new(index_file.as_file_mut())
            .read_to_end(&mut packages)
            .with_context(|| format!("failed to decompress {}", entry.path))?;
        // Keep the last paragraph of this file apart from the next file's first.
        if packages.len() > start {
            packages.extend_from_slice(b"\n\n");
        }
        fetched += 1;
    }

    if fetched == 0 {
        tracing::warn!(
            "No binary-{} package index found in dists/{}/Release",
            arch,
            dist
        );
    }

    let text = String::from_utf8(packages).map_err(ParseError::from)?;
    let entries = parse_packages_index(&text)
        .with_context(|| format!("failed to parse package index of {}", dist))?;

    tracing::debug!(
        "{} package(s) from {} index file(s) of {}",
        entries.len(),
        fetched,
        dist
    );
    Ok(entries)
}

/// Concatenate the indices of every source of a rule, in source order.
pub fn build_rule_index(
    fetcher: &MirrorFetcher<'_>,
    verifier: &dyn SignatureVerifier,
    sources: &[Source],
    arch: &str,
) -> Result<Vec<IndexEntry>> {
    let mut index = Vec::new();
    for source in sources {
        index.extend(fetch_source_index(fetcher, verifier, source, arch)?);
    }
    Ok(index)
}
