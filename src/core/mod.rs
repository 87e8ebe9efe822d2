//! Core data structures for debpin.
//!
//! This module contains the foundational types used throughout debpin:
//! - Debian control paragraphs, `Release` files and `Packages` indices
//! - Debian versions and their ordering
//! - Pins and repository sources declared by rules

pub mod control;
pub mod errors;
pub mod index;
pub mod pin;
pub mod release;
pub mod source;
pub mod version;

pub use errors::ParseError;
pub use index::{parse_packages_index, IndexEntry};
pub use pin::{PinSpec, VersionConstraint};
pub use release::{ReleaseEntry, ReleaseFile};
pub use source::Source;
pub use version::DebVersion;
