//! Para Extractor - Parsers and analysis over language-model output
//!
//! Model responses follow a line-oriented `MARKER: value` grammar. This
//! crate holds the marker dispatch machinery, the three parsers built on
//! it (report extraction, sighting analysis, haunting severity), the
//! prompts that request each format, and the [`Analyzer`] service that
//! ties prompt, model and parser together.
//!
//! Author: hephaex@gmail.com

pub mod analysis;
pub mod analyzer;
pub mod markers;
pub mod prompts;
pub mod report;
pub mod severity;

pub use analysis::parse_sighting_analysis;
pub use analyzer::Analyzer;
pub use report::parse_extraction;
pub use severity::parse_severity;
