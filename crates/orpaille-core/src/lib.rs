//! # orpaille-core
//!
//! Core types, traits, and abstractions for the orpaille library.
//!
//! This crate provides the foundational data structures and trait
//! definitions that the other orpaille crates depend on: the domain
//! models, the shared error type, the TTL result cache, and the backend
//! seams for geo lookup and remote-model inference.

pub mod cache;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use cache::{CacheKey, Clock, ManualClock, SystemClock, TtlCache};
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
