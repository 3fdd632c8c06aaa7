//! # orpaille-assistant
//!
//! Conversational assistant and image-analysis flows for orpaille.
//!
//! This crate provides:
//! - [`Assistant`] — the chat flow: persona prompt, transcript
//!   forwarding, optional image-analysis note, apology fallback
//! - [`analysis`] — the image, rock, river, geological, and gold-line
//!   flows over the remote-model seams
//! - [`ImageAttachment`] — images normalized to portable `data:` payloads
//!
//! These flows run beside the search pipeline and never touch its cache
//! or the geo lookups.

pub mod analysis;
pub mod chat;
pub mod image;

pub use analysis::{
    analyze_geology, analyze_image, analyze_river, analyze_rocks, combine_analysis,
    trace_gold_line, GoldLineAnalysis, RiverAnalysis, RiverPoint, RiverPointKind, RockAnalysis,
    RockType, IMAGE_ANALYSIS_FALLBACK,
};
pub use chat::{Assistant, Conversation, APOLOGY, PERSONA_PROMPT};
pub use image::ImageAttachment;
