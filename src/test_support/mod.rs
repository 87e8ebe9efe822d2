//! Test utilities and mocks for debpin unit tests.
//!
//! The network and the trust decision are the two seams of the update
//! pipeline; both have in-memory stand-ins here.
//!
//! # Example
//!
//! ```rust,ignore
//! use debpin::test_support::{MockHttpClient, MockHttpResponse, RepoFixture};
//!
//! #[test]
//! fn test_example() {
//!     let http = MockHttpClient::new();
//!     RepoFixture::new("http://deb.example/debian", "bookworm")
//!         .with_packages("main", "amd64", &[("foo", "1.0-1")])
//!         .install(&http);
//!
//!     // Use the mock in tests...
//! }
//! ```

pub mod fixtures;

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;

use chrono::{DateTime, TimeZone, Utc};
use url::Url;

use crate::ops::Clock;
use crate::sources::{HttpClient, TransportError};
use crate::verify::{IntegrityError, SignatureVerifier};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Mock HTTP response for testing downloads.
#[derive(Debug, Clone)]
pub struct MockHttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
    /// Connection drops after the body was sent.
    pub truncated: bool,
}

impl MockHttpResponse {
    /// Create a successful response with the given body.
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        MockHttpResponse {
            status: 200,
            body: body.into(),
            truncated: false,
        }
    }

    /// Create a not found response.
    pub fn not_found() -> Self {
        MockHttpResponse {
            status: 404,
            body: b"Not Found".to_vec(),
            truncated: false,
        }
    }

    /// Create a server error response.
    pub fn server_error(message: &str) -> Self {
        MockHttpResponse {
            status: 500,
            body: message.as_bytes().to_vec(),
            truncated: false,
        }
    }

    /// A 200 response whose connection fails after `body` was written.
    pub fn truncated(body: impl Into<Vec<u8>>) -> Self {
        MockHttpResponse {
            status: 200,
            body: body.into(),
            truncated: true,
        }
    }

    /// Check if this is a successful response.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Mock HTTP client for testing mirror downloads.
///
/// Unmatched URLs get the default response, or a request error when no
/// default is set.
#[derive(Debug, Default)]
pub struct MockHttpClient {
    responses: RefCell<HashMap<String, MockHttpResponse>>,
    requests: RefCell<Vec<String>>,
    default_response: RefCell<Option<MockHttpResponse>>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        MockHttpClient::default()
    }

    /// Add a response for a URL.
    pub fn mock_url(&self, url: &str, response: MockHttpResponse) -> &Self {
        self.responses.borrow_mut().insert(url.to_string(), response);
        self
    }

    /// Set a default response for unmatched URLs.
    pub fn set_default(&self, response: MockHttpResponse) -> &Self {
        *self.default_response.borrow_mut() = Some(response);
        self
    }

    /// Get all requested URLs, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    /// Clear request history.
    pub fn clear_requests(&self) {
        self.requests.borrow_mut().clear();
    }

    fn response_for(&self, url: &str) -> Option<MockHttpResponse> {
        self.responses
            .borrow()
            .get(url)
            .cloned()
            .or_else(|| self.default_response.borrow().clone())
    }
}

impl HttpClient for MockHttpClient {
    fn download(&self, url: &Url, dest: &mut dyn Write) -> Result<u64, TransportError> {
        self.requests.borrow_mut().push(url.to_string());

        let Some(response) = self.response_for(url.as_str()) else {
            return Err(TransportError::Request {
                url: url.to_string(),
                message: "no mock response".to_string(),
            });
        };

        if !response.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: response.status,
            });
        }

        dest.write_all(&response.body)?;
        if response.truncated {
            return Err(TransportError::Request {
                url: url.to_string(),
                message: "connection reset".to_string(),
            });
        }
        Ok(response.body.len() as u64)
    }
}

/// Signature verifier with a fixed trust decision.
#[derive(Debug)]
pub struct StaticVerifier {
    accept: bool,
    checked: RefCell<Vec<String>>,
}

impl StaticVerifier {
    /// Trust every signature.
    pub fn accept_all() -> Self {
        StaticVerifier {
            accept: true,
            checked: RefCell::new(Vec::new()),
        }
    }

    /// Reject every signature.
    pub fn reject_all() -> Self {
        StaticVerifier {
            accept: false,
            checked: RefCell::new(Vec::new()),
        }
    }

    /// Names of the documents checked so far.
    pub fn checked(&self) -> Vec<String> {
        self.checked.borrow().clone()
    }
}

impl SignatureVerifier for StaticVerifier {
    fn verify_detached(
        &self,
        name: &str,
        _document: &[u8],
        _signature: &[u8],
    ) -> Result<(), IntegrityError> {
        self.checked.borrow_mut().push(name.to_string());
        if self.accept {
            Ok(())
        } else {
            Err(IntegrityError::BadSignature {
                name: name.to_string(),
                reason: "untrusted test signature".to_string(),
            })
        }
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// 2024-02-10 10:23:41 UTC.
    pub fn default_instant() -> Self {
        FixedClock(
            Utc.with_ymd_and_hms(2024, 2, 10, 10, 23, 41)
                .single()
                .unwrap_or_default(),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Assertion helpers for testing.
pub mod assertions {
    /// Assert that an error's chain contains a substring.
    pub fn assert_error_contains<T: std::fmt::Debug>(
        result: Result<T, anyhow::Error>,
        substring: &str,
    ) {
        match result {
            Ok(v) => panic!("expected Err containing '{}', got Ok: {:?}", substring, v),
            Err(e) => {
                let msg = format!("{:#}", e);
                assert!(
                    msg.contains(substring),
                    "error '{}' does not contain '{}'",
                    msg,
                    substring
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_mock_http_client() {
        let client = MockHttpClient::new();
        client.mock_url(
            "https://example.com/Release",
            MockHttpResponse::ok(b"Origin: test".to_vec()),
        );

        let mut body = Vec::new();
        let n = client
            .download(&url("https://example.com/Release"), &mut body)
            .unwrap();
        assert_eq!(n, 12);
        assert_eq!(body, b"Origin: test");
        assert_eq!(client.requests(), vec!["https://example.com/Release"]);
    }

    #[test]
    fn test_mock_http_status_and_default() {
        let client = MockHttpClient::new();
        let mut sink = Vec::new();
        assert!(client
            .download(&url("https://example.com/missing"), &mut sink)
            .is_err());

        client.set_default(MockHttpResponse::not_found());
        match client.download(&url("https://example.com/missing"), &mut sink) {
            Err(TransportError::Status { status, .. }) => assert_eq!(status, 404),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(client.requests().len(), 2);

        client.clear_requests();
        assert!(client.requests().is_empty());
    }

    #[test]
    fn test_mock_http_truncated_writes_then_fails() {
        let client = MockHttpClient::new();
        client.set_default(MockHttpResponse::truncated("part"));

        let mut sink = Vec::new();
        assert!(client
            .download(&url("https://example.com/x"), &mut sink)
            .is_err());
        assert_eq!(sink, b"part");
    }

    #[test]
    fn test_static_verifier() {
        assert!(StaticVerifier::accept_all()
            .verify_detached("Release", b"doc", b"sig")
            .is_ok());

        let reject = StaticVerifier::reject_all();
        assert!(reject.verify_detached("Release", b"doc", b"sig").is_err());
        assert_eq!(reject.checked(), vec!["Release"]);
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::default_instant();
        assert_eq!(
            clock.now().format("%Y%m%dT%H%M%SZ").to_string(),
            "20240210T102341Z"
        );
    }
}
