//! Repository access.
//!
//! Sources are responsible for fetching repository files from mirrors.

pub mod http;
pub mod mirror;

pub use http::{HttpClient, ReqwestClient, TransportError};
pub use mirror::MirrorFetcher;
