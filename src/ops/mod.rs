//! High-level operations.
//!
//! This module contains the update pipeline behind the `debpin` command.

pub mod merge;
pub mod update_files;
pub mod update_rules;

use chrono::{DateTime, Utc};

use crate::sources::HttpClient;
use crate::util::config::{UpdateConfig, DEFAULT_MANUAL_TAG, DEFAULT_RULE_KIND};
use crate::verify::SignatureVerifier;

pub use merge::{build_rule_index, fetch_source_index};
pub use update_files::{update_files, FileUpdate, UpdateOptions};
pub use update_rules::{
    check_pin_keys, plan_rule, update_document, update_rule, RuleOutcome, RuleUpdate,
};

/// Format of the `timestamp` attribute, always in UTC.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Everything an update run shares across rules and files.
pub struct UpdateContext<'a> {
    pub http: &'a dyn HttpClient,
    pub verifier: &'a dyn SignatureVerifier,
    pub clock: &'a dyn Clock,
    /// Array-of-tables name of the rules to update.
    pub rule_kind: String,
    /// Rules tagged with this are never touched.
    pub manual_tag: String,
}

impl<'a> UpdateContext<'a> {
    pub fn new(
        http: &'a dyn HttpClient,
        verifier: &'a dyn SignatureVerifier,
        clock: &'a dyn Clock,
    ) -> Self {
        UpdateContext {
            http,
            verifier,
            clock,
            rule_kind: DEFAULT_RULE_KIND.to_string(),
            manual_tag: DEFAULT_MANUAL_TAG.to_string(),
        }
    }

    /// Take the rule kind and manual tag from configuration.
    pub fn with_update_config(mut self, config: &UpdateConfig) -> Self {
        self.rule_kind = config.rule_kind().to_string();
        self.manual_tag = config.manual_tag().to_string();
        self
    }
}
