//! API clients for external services
//!
//! - Catalog: playback records by video id
//! - Manifest: HLS master playlists

pub mod catalog;
pub mod manifest;

pub use catalog::{CatalogClient, CatalogError};
pub use manifest::ManifestClient;
