//! Updating the pins stored in rules.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use url::Url;

use crate::core::source::parse_base_url;
use crate::core::{ParseError, PinSpec, Source};
use crate::document::{BuildDocument, ConfigError, Rule};
use crate::ops::merge::build_rule_index;
use crate::ops::{UpdateContext, TIMESTAMP_FORMAT};
use crate::resolver::{resolve_pins, ResolvedMapping};
use crate::sources::MirrorFetcher;

/// What happened to one rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// Tagged for manual maintenance; not touched.
    Skipped,
    /// Same hashes as before; only formatting may have changed.
    Unchanged,
    /// At least one hash changed and the timestamp was stamped.
    Updated,
}

/// Attribute values to write back into a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleUpdate {
    pub packages: BTreeMap<String, String>,
    pub packages_sha256: BTreeMap<String, String>,
    /// New `timestamp`, present only when the hashes changed.
    pub timestamp: Option<String>,
}

impl RuleUpdate {
    fn from_resolved(resolved: &ResolvedMapping) -> Self {
        RuleUpdate {
            packages: resolved
                .iter()
                .map(|(spec, pin)| (spec.clone(), pin.filename.clone()))
                .collect(),
            packages_sha256: resolved
                .iter()
                .map(|(spec, pin)| (spec.clone(), pin.sha256.clone()))
                .collect(),
            timestamp: None,
        }
    }

    pub fn outcome(&self) -> RuleOutcome {
        if self.timestamp.is_some() {
            RuleOutcome::Updated
        } else {
            RuleOutcome::Unchanged
        }
    }

    /// Write the new values into `rule`.
    pub fn apply(&self, rule: &mut dyn Rule) {
        if let Some(timestamp) = &self.timestamp {
            rule.set_attr_string("timestamp", timestamp);
        }
        rule.set_attr_map("packages", &self.packages, true);
        rule.set_attr_map("packages_sha256", &self.packages_sha256, true);
    }
}

/// Check that `packages` and `packages_sha256` pin the same specs.
pub fn check_pin_keys(
    rule: &str,
    packages: &BTreeMap<String, String>,
    packages_sha256: &BTreeMap<String, String>,
) -> Result<(), ConfigError> {
    if packages.keys().eq(packages_sha256.keys()) {
        return Ok(());
    }
    Err(ConfigError::PinKeyMismatch {
        rule: rule.to_string(),
        packages: packages.keys().cloned().collect(),
        packages_sha256: packages_sha256.keys().cloned().collect(),
    })
}

/// Parse the rule's sources, each followed by the rule's fallback mirrors.
fn rule_sources(rule: &dyn Rule) -> Result<Vec<Source>> {
    let name = rule.name();

    let mirrors = rule
        .attr_strings("mirrors")?
        .iter()
        .map(|m| {
            parse_base_url(m).map_err(|e| ParseError::InvalidSource {
                source_str: m.clone(),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<Url>, _>>()
        .with_context(|| format!("invalid `mirrors` in rule {}", name))?;

    let sources = rule.attr_strings("sources")?;
    sources
        .iter()
        .map(|s| {
            Source::parse(s)
                .map(|source| source.with_fallback_mirrors(&mirrors))
                .with_context(|| format!("invalid `sources` in rule {}", name))
        })
        .collect()
}

/// Work out the new attribute values of a rule without modifying it.
///
/// Returns `None` for rules carrying the manual tag. Attribute shapes and
/// the pin key sets are checked before anything is fetched.
pub fn plan_rule(ctx: &UpdateContext<'_>, rule: &dyn Rule) -> Result<Option<RuleUpdate>> {
    let name = rule.name();

    if rule
        .attr_strings("tags")?
        .iter()
        .any(|t| *t == ctx.manual_tag)
    {
        tracing::info!("Skipping {} (tagged {})", name, ctx.manual_tag);
        return Ok(None);
    }

    let packages = rule.attr_map("packages")?;
    let packages_sha256 = rule.attr_map("packages_sha256")?;
    check_pin_keys(&name, &packages, &packages_sha256)?;

    let arch = rule
        .attr_string("arch")?
        .ok_or_else(|| ConfigError::MissingAttribute {
            rule: name.clone(),
            attr: "arch".to_string(),
        })?;
    let sources = rule_sources(rule)?;
    let pins = packages
        .keys()
        .map(|spec| PinSpec::parse(spec))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("invalid pin in rule {}", name))?;

    tracing::info!("Updating {} ({} pin(s), {})", name, pins.len(), arch);

    let resolved = if pins.is_empty() {
        tracing::debug!("{}: nothing pinned, not fetching", name);
        ResolvedMapping::new()
    } else {
        let fetcher = MirrorFetcher::new(ctx.http);
        let index = build_rule_index(&fetcher, ctx.verifier, &sources, &arch)
            .with_context(|| format!("failed to build package index for rule {}", name))?;
        resolve_pins(&name, &pins, &index)?
    };

    let mut update = RuleUpdate::from_resolved(&resolved);
    if update.packages_sha256 != packages_sha256 {
        let now = ctx.clock.now().format(TIMESTAMP_FORMAT).to_string();
        tracing::info!("{}: pinned packages changed, timestamp {}", name, now);
        update.timestamp = Some(now);
    }
    Ok(Some(update))
}

/// Update a single rule in place.
pub fn update_rule(ctx: &UpdateContext<'_>, rule: &mut dyn Rule) -> Result<RuleOutcome> {
    match plan_rule(ctx, rule)? {
        None => Ok(RuleOutcome::Skipped),
        Some(update) => {
            update.apply(rule);
            Ok(update.outcome())
        }
    }
}

/// Update every rule of the configured kind.
///
/// Every rule is planned before any is written, so an error leaves the
/// document exactly as it was.
pub fn update_document(
    ctx: &UpdateContext<'_>,
    doc: &mut dyn BuildDocument,
) -> Result<Vec<(String, RuleOutcome)>> {
    let mut rules = doc.rules_mut(&ctx.rule_kind)?;

    let plans = rules
        .iter()
        .map(|rule| plan_rule(ctx, &**rule))
        .collect::<Result<Vec<_>>>()?;

    let mut outcomes = Vec::with_capacity(plans.len());
    for (rule, plan) in rules.iter_mut().zip(plans) {
        let outcome = match plan {
            None => RuleOutcome::Skipped,
            Some(update) => {
                update.apply(&mut **rule);
                update.outcome()
            }
        };
        outcomes.push((rule.name(), outcome));
    }
    Ok(outcomes)
}
