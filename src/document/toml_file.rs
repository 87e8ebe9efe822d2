//! TOML build documents.
//!
//! Rules are entries of an array of tables named after the rule kind:
//!
//! ```toml
//! [[deb_packages]]
//! name = "debian_bookworm_amd64"
//! arch = "amd64"
//! sources = ["http://deb.debian.org/debian bookworm main"]
//! timestamp = "20240210T102341Z"
//!
//! [deb_packages.packages]
//! libc6 = "pool/main/g/glibc/libc6_2.36-9+deb12u4_amd64.deb"
//!
//! [deb_packages.packages_sha256]
//! libc6 = "..."
//! ```

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use toml_edit::{DocumentMut, InlineTable, Item, Table, Value};

use crate::document::{BuildDocument, ConfigError, Rule};

/// A parsed TOML document that renders back byte-for-byte except where
/// attributes were written.
#[derive(Debug, Clone)]
pub struct TomlDocument {
    doc: DocumentMut,
}

impl TomlDocument {
    /// Parse document text. `origin` names the document in errors.
    pub fn parse(text: &str, origin: &str) -> Result<Self> {
        let doc: DocumentMut = text
            .parse()
            .with_context(|| format!("failed to parse {}", origin))?;
        Ok(TomlDocument { doc })
    }
}

impl BuildDocument for TomlDocument {
    fn rules_mut(&mut self, kind: &str) -> Result<Vec<&mut dyn Rule>, ConfigError> {
        match self.doc.get_mut(kind) {
            None => Ok(Vec::new()),
            Some(Item::ArrayOfTables(rules)) => {
                Ok(rules.iter_mut().map(|t| t as &mut dyn Rule).collect())
            }
            Some(_) => Err(ConfigError::RuleKind {
                kind: kind.to_string(),
            }),
        }
    }

    fn render(&self) -> String {
        self.doc.to_string()
    }
}

fn type_error(rule: &Table, attr: &str, expected: &'static str) -> ConfigError {
    ConfigError::AttributeType {
        rule: rule.name(),
        attr: attr.to_string(),
        expected,
    }
}

impl Rule for Table {
    fn name(&self) -> String {
        self.get("name")
            .and_then(Item::as_str)
            .unwrap_or("<unnamed>")
            .to_string()
    }

    fn attr_string(&self, attr: &str) -> Result<Option<String>, ConfigError> {
        match self.get(attr) {
            None => Ok(None),
            Some(item) => item
                .as_str()
                .map(|s| Some(s.to_string()))
                .ok_or_else(|| type_error(self, attr, "a string")),
        }
    }

    fn attr_strings(&self, attr: &str) -> Result<Vec<String>, ConfigError> {
        let Some(item) = self.get(attr) else {
            return Ok(Vec::new());
        };
        let array = item
            .as_array()
            .ok_or_else(|| type_error(self, attr, "a list of strings"))?;

        array
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| type_error(self, attr, "a list of strings"))
            })
            .collect()
    }

    fn attr_map(&self, attr: &str) -> Result<BTreeMap<String, String>, ConfigError> {
        let Some(item) = self.get(attr) else {
            return Ok(BTreeMap::new());
        };
        let table = item
            .as_table_like()
            .ok_or_else(|| type_error(self, attr, "a table of strings"))?;

        table
            .iter()
            .map(|(k, v)| {
                v.as_str()
                    .map(|s| (k.to_string(), s.to_string()))
                    .ok_or_else(|| type_error(self, attr, "a table of strings"))
            })
            .collect()
    }

    fn set_attr_string(&mut self, attr: &str, value: &str) {
        match self.get_mut(attr).and_then(Item::as_value_mut) {
            Some(existing) => {
                // Keep surrounding whitespace and trailing comments.
                let decor = existing.decor().clone();
                *existing = Value::from(value);
                *existing.decor_mut() = decor;
            }
            None => {
                self.insert(attr, toml_edit::value(value));
            }
        }
    }

    fn set_attr_map(&mut self, attr: &str, map: &BTreeMap<String, String>, force_multiline: bool) {
        if !force_multiline {
            let mut inline = InlineTable::new();
            for (k, v) in map {
                inline.insert(k.as_str(), Value::from(v.as_str()));
            }
            self.insert(attr, toml_edit::value(inline));
            return;
        }

        // Reuse an existing sub-table so it stays where it was written.
        if let Some(table) = self.get_mut(attr).and_then(Item::as_table_mut) {
            table.clear();
            fill_table(table, map);
            return;
        }

        let mut table = Table::new();
        fill_table(&mut table, map);
        self.insert(attr, Item::Table(table));
    }
}

fn fill_table(table: &mut Table, map: &BTreeMap<String, String>) {
    for (k, v) in map {
        table.insert(k, toml_edit::value(v.as_str()));
    }
}
