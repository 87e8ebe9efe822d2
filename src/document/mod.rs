//! Build configuration documents.
//!
//! The updater only needs a narrow view of the document that declares its
//! rules: enumerate rules of a kind, read string / string-list / mapping
//! attributes, write mapping and string attributes, and render the whole
//! document back to text. [`BuildDocument`] and [`Rule`] are that view;
//! [`TomlDocument`] implements it on top of `toml_edit` so everything the
//! updater does not touch keeps its original formatting.

pub mod toml_file;

use std::collections::BTreeMap;

use miette::Diagnostic;
use thiserror::Error;

pub use toml_file::TomlDocument;

/// A rule attribute has the wrong shape, or the rule is inconsistent.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("attribute `{attr}` of rule {rule} must be {expected}")]
    #[diagnostic(code(debpin::config::attribute_type))]
    AttributeType {
        rule: String,
        attr: String,
        expected: &'static str,
    },

    #[error("rule {rule} is missing the `{attr}` attribute")]
    #[diagnostic(code(debpin::config::missing_attribute))]
    MissingAttribute { rule: String, attr: String },

    #[error("`{kind}` must be an array of tables (`[[{kind}]]`)")]
    #[diagnostic(code(debpin::config::rule_kind))]
    RuleKind { kind: String },

    #[error(
        "mismatch between package names in packages and packages_sha256 in rule {rule}.\n\
         packages: {packages:?}\npackages_sha256: {packages_sha256:?}"
    )]
    #[diagnostic(
        code(debpin::config::pin_key_mismatch),
        help("Every pin in `packages` needs an entry in `packages_sha256` and vice versa")
    )]
    PinKeyMismatch {
        rule: String,
        packages: Vec<String>,
        packages_sha256: Vec<String>,
    },
}

/// One rule of a build document.
pub trait Rule {
    /// The rule's name, used in diagnostics.
    fn name(&self) -> String;

    /// A plain string attribute; `None` when absent.
    fn attr_string(&self, attr: &str) -> Result<Option<String>, ConfigError>;

    /// A list-of-strings attribute; empty when absent.
    fn attr_strings(&self, attr: &str) -> Result<Vec<String>, ConfigError>;

    /// A string-to-string mapping attribute; empty when absent.
    fn attr_map(&self, attr: &str) -> Result<BTreeMap<String, String>, ConfigError>;

    /// Set a plain string attribute.
    fn set_attr_string(&mut self, attr: &str, value: &str);

    /// Replace a mapping attribute, entries in key order.
    ///
    /// With `force_multiline` every entry goes on its own line.
    fn set_attr_map(&mut self, attr: &str, map: &BTreeMap<String, String>, force_multiline: bool);
}

/// An editable build document.
pub trait BuildDocument {
    /// All rules of `kind`, in document order.
    fn rules_mut(&mut self, kind: &str) -> Result<Vec<&mut dyn Rule>, ConfigError>;

    /// Render the document back to text.
    fn render(&self) -> String;
}
