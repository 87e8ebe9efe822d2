//! Test fixtures for repository scenarios.
//!
//! [`RepoFixture`] builds the files of a tiny apt repository (`Release`,
//! `Release.gpg` and gzip'd `Packages` indices with matching digests) and
//! serves them from a [`MockHttpClient`](super::MockHttpClient).

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::test_support::{MockHttpClient, MockHttpResponse};
use crate::util::hash::sha256_bytes;

/// Placeholder `Release.gpg`; fixtures are checked with a
/// [`StaticVerifier`](super::StaticVerifier).
const FIXTURE_SIGNATURE: &[u8] =
    b"-----BEGIN PGP SIGNATURE-----\n\nfixture\n-----END PGP SIGNATURE-----\n";

/// Pool path of a package in fixture repositories.
pub fn deb_filename(package: &str, version: &str, arch: &str) -> String {
    let initial = package.chars().next().unwrap_or('_');
    format!(
        "pool/main/{}/{}/{}_{}_{}.deb",
        initial, package, package, version, arch
    )
}

/// SHA-256 recorded for a fixture package.
pub fn deb_sha256(package: &str, version: &str) -> String {
    sha256_bytes(format!("{}_{}", package, version).as_bytes())
}

/// One `Packages` paragraph.
pub fn packages_paragraph(package: &str, version: &str, arch: &str) -> String {
    format!(
        "Package: {package}\n\
         Version: {version}\n\
         Architecture: {arch}\n\
         Filename: {filename}\n\
         Size: 1024\n\
         SHA256: {sha256}\n\
         Description: {package} test package\n \
         Longer description line.\n",
        filename = deb_filename(package, version, arch),
        sha256 = deb_sha256(package, version),
    )
}

/// A whole `Packages` file.
pub fn packages_text(arch: &str, packages: &[(&str, &str)]) -> String {
    packages
        .iter()
        .map(|(name, version)| packages_paragraph(name, version, arch))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Gzip bytes.
pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).expect("failed to write gzip data");
    encoder.finish().expect("failed to finish gzip stream")
}

/// `Release` text with a `SHA256` entry per `(path, content)`.
pub fn release_text(distribution: &str, files: &[(String, Vec<u8>)]) -> String {
    let mut text = format!(
        "Origin: Debian\n\
         Label: Debian\n\
         Suite: stable\n\
         Codename: {}\n\
         Date: Sat, 10 Feb 2024 10:23:41 UTC\n\
         SHA256:\n",
        distribution
    );
    for (path, content) in files {
        text.push_str(&format!(
            " {} {:>8} {}\n",
            sha256_bytes(content),
            content.len(),
            path
        ));
    }
    text
}

/// An apt repository on a single mirror.
#[derive(Debug, Clone)]
pub struct RepoFixture {
    /// Mirror base URL without trailing slash.
    pub base: String,
    pub distribution: String,
    /// Files below `dists/<distribution>/`, in Release order.
    pub files: Vec<(String, Vec<u8>)>,
    /// Replacement served instead of the real content, by path.
    pub tampered: Vec<(String, Vec<u8>)>,
}

impl RepoFixture {
    pub fn new(base: &str, distribution: &str) -> Self {
        RepoFixture {
            base: base.trim_end_matches('/').to_string(),
            distribution: distribution.to_string(),
            files: Vec::new(),
            tampered: Vec::new(),
        }
    }

    /// Add `<component>/binary-<arch>/Packages.gz` with the given packages.
    ///
    /// The uncompressed `Packages` file is listed as well, like real
    /// repositories do.
    pub fn with_packages(mut self, component: &str, arch: &str, packages: &[(&str, &str)]) -> Self {
        let text = packages_text(arch, packages);
        let dir = format!("{}/binary-{}", component, arch);
        self.files
            .push((format!("{}/Packages", dir), text.as_bytes().to_vec()));
        self.files
            .push((format!("{}/Packages.gz", dir), gzip(text.as_bytes())));
        self
    }

    /// Serve different bytes for `path` than the Release file records.
    pub fn with_tampered(mut self, path: &str, content: &[u8]) -> Self {
        self.tampered.push((path.to_string(), content.to_vec()));
        self
    }

    pub fn release(&self) -> String {
        release_text(&self.distribution, &self.files)
    }

    /// Full URL of a distribution file.
    pub fn url(&self, name: &str) -> String {
        format!("{}/dists/{}/{}", self.base, self.distribution, name)
    }

    /// The source string a rule would declare for this repository.
    pub fn source(&self, components: &[&str]) -> String {
        let mut source = format!("{} {}", self.base, self.distribution);
        for component in components {
            source.push(' ');
            source.push_str(component);
        }
        source
    }

    /// Register every file of the repository with the mock client.
    pub fn install(&self, http: &MockHttpClient) {
        http.mock_url(&self.url("Release"), MockHttpResponse::ok(self.release()));
        http.mock_url(
            &self.url("Release.gpg"),
            MockHttpResponse::ok(FIXTURE_SIGNATURE.to_vec()),
        );
        for (path, content) in &self.files {
            let served = self
                .tampered
                .iter()
                .find(|(p, _)| p == path)
                .map(|(_, c)| c.clone())
                .unwrap_or_else(|| content.clone());
            http.mock_url(&self.url(path), MockHttpResponse::ok(served));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{parse_packages_index, ReleaseFile};

    #[test]
    fn test_packages_text_parses() {
        let text = packages_text("amd64", &[("foo", "1.0-1"), ("bar", "2.0-1")]);
        let entries = parse_packages_index(&text).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].filename, deb_filename("foo", "1.0-1", "amd64"));
        assert_eq!(entries[1].sha256, deb_sha256("bar", "2.0-1"));
    }

    #[test]
    fn test_release_lists_digests() {
        let repo = RepoFixture::new("http://deb.example/debian/", "bookworm")
            .with_packages("main", "amd64", &[("foo", "1.0-1")]);
        let release = ReleaseFile::parse(&repo.release()).unwrap();

        let indices: Vec<_> = release.packages_indices("amd64").collect();
        assert_eq!(indices.len(), 1);
        assert_eq!(indices[0].path, "main/binary-amd64/Packages.gz");
        assert_eq!(indices[0].sha256, sha256_bytes(&repo.files[1].1));
        assert_eq!(
            repo.url("Release"),
            "http://deb.example/debian/dists/bookworm/Release"
        );
    }
}
