//! Debian control file paragraphs.
//!
//! Both `Release` and `Packages` files are sequences of RFC 822 style
//! paragraphs separated by blank lines. A field starts with `Name:` at the
//! beginning of a line; lines starting with a space or tab continue the
//! previous field.

use std::collections::HashMap;

use crate::core::errors::ParseError;

/// A single paragraph of `Field: value` pairs.
///
/// Field names are matched case-insensitively, as dpkg does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlParagraph {
    fields: Vec<(String, String)>,
    lookup: HashMap<String, usize>,
}

impl ControlParagraph {
    fn push(&mut self, name: String, value: String) {
        self.lookup.insert(name.to_ascii_lowercase(), self.fields.len());
        self.fields.push((name, value));
    }

    fn append_continuation(&mut self, line: &str) -> bool {
        match self.fields.last_mut() {
            Some((_, value)) => {
                value.push('\n');
                value.push_str(line.trim());
                true
            }
            None => false,
        }
    }

    /// Get the value of a field.
    ///
    /// Multi-line values keep their line structure: the text on the field's
    /// own line comes first, followed by one line per continuation line with
    /// surrounding whitespace trimmed.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.lookup
            .get(&name.to_ascii_lowercase())
            .map(|&i| self.fields[i].1.as_str())
    }

    /// Get a field that must be present and non-empty.
    pub fn required_field(&self, name: &str, context: &str) -> Result<&str, ParseError> {
        match self.field(name) {
            Some(value) if !value.trim().is_empty() => Ok(value.trim()),
            _ => Err(ParseError::MissingField {
                field: name.to_string(),
                context: context.to_string(),
            }),
        }
    }

    /// Number of fields in this paragraph.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the paragraph has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parse a whole control document into paragraphs.
///
/// `source` names the document in error messages.
pub fn parse_paragraphs(text: &str, source: &str) -> Result<Vec<ControlParagraph>, ParseError> {
    let mut paragraphs = Vec::new();
    let mut current = ControlParagraph::default();

    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim_end_matches('\r');

        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
            continue;
        }

        // deb822 comment
        if line.starts_with('#') {
            continue;
        }

        if line.starts_with(' ') || line.starts_with('\t') {
            if !current.append_continuation(line) {
                return Err(ParseError::Malformed {
                    source_name: source.to_string(),
                    line: lineno + 1,
                    message: "continuation line without a field".to_string(),
                });
            }
            continue;
        }

        let Some((name, value)) = line.split_once(':') else {
            return Err(ParseError::Malformed {
                source_name: source.to_string(),
                line: lineno + 1,
                message: format!("expected `Field: value`, found `{}`", line),
            });
        };

        let name = name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return Err(ParseError::Malformed {
                source_name: source.to_string(),
                line: lineno + 1,
                message: format!("invalid field name `{}`", name),
            });
        }

        current.push(name.to_string(), value.trim().to_string());
    }

    if !current.is_empty() {
        paragraphs.push(current);
    }

    Ok(paragraphs)
}
