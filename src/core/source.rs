//! Repository sources declared by a rule.

use url::Url;

use crate::core::errors::ParseError;

/// One apt repository: a distribution on an ordered list of mirrors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Mirror base URLs, tried in order.
    pub base_urls: Vec<Url>,
    /// Distribution (suite or codename), e.g. `bookworm`.
    pub distribution: String,
    /// Component allow-list; empty means every component.
    pub components: Vec<String>,
}

impl Source {
    /// Parse `<mirror-base-url> <distribution> [<component> ...]`.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let invalid = |reason: String| ParseError::InvalidSource {
            source_str: s.to_string(),
            reason,
        };

        let tokens: Vec<&str> = s.split_whitespace().collect();
        if tokens.len() < 2 {
            return Err(invalid(
                "expected at least a mirror URL and a distribution".to_string(),
            ));
        }

        let base_url = parse_base_url(tokens[0]).map_err(|e| invalid(e.to_string()))?;

        Ok(Source {
            base_urls: vec![base_url],
            distribution: tokens[1].to_string(),
            components: tokens[2..].iter().map(|c| c.to_string()).collect(),
        })
    }

    /// Append fallback mirrors behind the ones already configured.
    ///
    /// Mirrors already present are skipped so no mirror is tried twice.
    pub fn with_fallback_mirrors<'a>(mut self, mirrors: impl IntoIterator<Item = &'a Url>) -> Self {
        for mirror in mirrors {
            if !self.base_urls.contains(mirror) {
                self.base_urls.push(mirror.clone());
            }
        }
        self
    }

    /// Whether a Release-relative path belongs to an accepted component.
    ///
    /// A component matches whole leading path segments, so `main` accepts
    /// `main/binary-amd64/Packages.gz` but not `main-extra/...`, and
    /// `updates/main` accepts `updates/main/binary-amd64/Packages.gz`.
    pub fn accepts_component(&self, path: &str) -> bool {
        if self.components.is_empty() {
            return true;
        }
        self.components
            .iter()
            .any(|c| path.starts_with(&format!("{}/", c.trim_end_matches('/'))))
    }
}

/// Parse a mirror base URL, trimming trailing slashes.
pub fn parse_base_url(s: &str) -> Result<Url, url::ParseError> {
    Url::parse(s.trim_end_matches('/'))
}
