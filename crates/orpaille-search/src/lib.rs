//! # orpaille-search
//!
//! Gold-location enrichment pipeline for orpaille.
//!
//! This crate provides:
//! - [`GoldSearchService`] — the full search operation: fixture bypass,
//!   result cache, geocoding, area scan, prompt composition, remote-model
//!   call, validation, and the synthetic-fallback path
//! - [`validate`] — the reply validator/normalizer (clamping, placeholder
//!   substitution, coordinate reconciliation, sorting, pagination)
//! - [`fixtures`] — the seeded known-rivers table
//!
//! The pipeline treats the remote model as an untrusted producer and the
//! map data as ground truth for coordinates.

pub mod fixtures;
pub mod prompt;
pub mod search;
pub mod sources;
pub mod validate;

pub use search::{normalize_location, GoldSearchService, SearchOptions};
pub use sources::{combined_sources, gold_sources_for, SourceNarratives};
pub use validate::{PageRequest, SortBy};
