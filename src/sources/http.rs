//! HTTP transport.

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use miette::Diagnostic;
use thiserror::Error;
use url::Url;

use crate::util::config::NetConfig;

/// A mirror could not deliver a file.
///
/// Single-mirror failures are recovered by trying the next mirror; only
/// [`TransportError::AllMirrorsFailed`] escapes the mirror fetcher.
#[derive(Debug, Error, Diagnostic)]
pub enum TransportError {
    #[error("request to {url} failed: {message}")]
    #[diagnostic(code(debpin::net::request))]
    Request { url: String, message: String },

    #[error("download from {url} failed with status code {status}")]
    #[diagnostic(code(debpin::net::status))]
    Status { url: String, status: u16 },

    #[error("invalid mirror URL {url}: {message}")]
    #[diagnostic(code(debpin::net::url))]
    InvalidUrl { url: String, message: String },

    #[error("failed to write download: {0}")]
    #[diagnostic(code(debpin::net::io))]
    Io(#[from] std::io::Error),

    #[error("no mirror had the file {name} available (tried: {})", .urls.join(", "))]
    #[diagnostic(
        code(debpin::net::all_mirrors_failed),
        help("Check your network connection and the mirror URLs in `sources`")
    )]
    AllMirrorsFailed { name: String, urls: Vec<String> },
}

/// Minimal HTTP client surface used to download repository files.
pub trait HttpClient {
    /// Download `url` into `dest`, returning the number of bytes written.
    ///
    /// Non-success status codes are errors.
    fn download(&self, url: &Url, dest: &mut dyn Write) -> Result<u64, TransportError>;
}

/// Blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Build a client from network settings.
    pub fn new(net: &NetConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(net.timeout_secs()))
            .user_agent(net.user_agent())
            .build()
            .context("failed to build HTTP client")?;

        Ok(ReqwestClient { client })
    }
}

impl HttpClient for ReqwestClient {
    fn download(&self, url: &Url, dest: &mut dyn Write) -> Result<u64, TransportError> {
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| TransportError::Request {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.copy_to(dest).map_err(|e| TransportError::Request {
            url: url.to_string(),
            message: format!("failed to read response body: {}", e),
        })
    }
}
