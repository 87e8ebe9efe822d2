//! Fetching distribution files with mirror fallback.
//!
//! There are no chunked or resumed downloads: every mirror is tried once,
//! in order, until one delivers the whole file.

use std::fs::File;
use std::io::Seek;

use tempfile::NamedTempFile;
use url::Url;

use crate::sources::http::{HttpClient, TransportError};

/// Downloads `dists/<distribution>/<name>` from an ordered mirror list.
pub struct MirrorFetcher<'a> {
    http: &'a dyn HttpClient,
}

impl<'a> MirrorFetcher<'a> {
    pub fn new(http: &'a dyn HttpClient) -> Self {
        MirrorFetcher { http }
    }

    /// The URL of a distribution file on one mirror.
    pub fn dist_url(base: &Url, distribution: &str, name: &str) -> Result<Url, TransportError> {
        let raw = format!(
            "{}/dists/{}/{}",
            base.as_str().trim_end_matches('/'),
            distribution,
            name.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|e| TransportError::InvalidUrl {
            url: raw.clone(),
            message: e.to_string(),
        })
    }

    /// Download a distribution file into `dest`, trying each mirror once.
    ///
    /// `dest` is truncated before every attempt so a half-finished download
    /// from a failing mirror never leaks into the result. Returns the URL
    /// that served the file.
    pub fn fetch(
        &self,
        dest: &mut File,
        name: &str,
        distribution: &str,
        mirrors: &[Url],
    ) -> Result<Url, TransportError> {
        let mut tried = Vec::with_capacity(mirrors.len());

        for mirror in mirrors {
            let url = Self::dist_url(mirror, distribution, name)?;
            tried.push(url.to_string());

            dest.set_len(0)?;
            dest.rewind()?;

            match self.http.download(&url, dest) {
                Ok(bytes) => {
                    tracing::debug!("Fetched {} ({} bytes)", url, bytes);
                    dest.rewind()?;
                    return Ok(url);
                }
                Err(e) => {
                    tracing::warn!("{}", e);
                }
            }
        }

        Err(TransportError::AllMirrorsFailed {
            name: name.to_string(),
            urls: tried,
        })
    }

    /// Download a distribution file into a fresh temporary file.
    ///
    /// The file is removed when the returned handle is dropped.
    pub fn fetch_to_temp(
        &self,
        name: &str,
        distribution: &str,
        mirrors: &[Url],
    ) -> Result<NamedTempFile, TransportError> {
        let mut tmp = NamedTempFile::new()?;
        self.fetch(tmp.as_file_mut(), name, distribution, mirrors)?;
        Ok(tmp)
    }
}
