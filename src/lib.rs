//! debpin - Pin Debian packages in build documents
//!
//! This crate provides the core library functionality for debpin:
//! fetching signed apt repository metadata with mirror fallback, verifying
//! it, resolving package pins with dpkg version ordering, and rewriting the
//! pins stored in build documents.

pub mod core;
pub mod document;
pub mod ops;
pub mod resolver;
pub mod sources;
pub mod util;
pub mod verify;

/// Test utilities and mocks for debpin unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides an in-memory HTTP client, a fixed trust
/// decision, a fixed clock and repository fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{DebVersion, IndexEntry, PinSpec, Source};
pub use document::{BuildDocument, Rule, TomlDocument};
pub use resolver::{ResolvedMapping, ResolvedPin};
pub use util::Config;
