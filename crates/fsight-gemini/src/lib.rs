//! Gemini AI client for video technique analysis.
//!
//! This crate covers the full analysis pipeline against the Gemini API:
//! - Prompt construction from movement context and characteristic names
//! - Video analysis invocation with an ordered model fallback chain
//! - Response parsing (embedded JSON extraction, free-text feedback
//!   augmentation) with a synthetic fallback when the model's output
//!   cannot be parsed

pub mod client;
pub mod config;
pub mod error;
pub mod parser;
pub mod prompt;

pub use client::{GeminiAnalysis, GeminiClient};
pub use config::GeminiConfig;
pub use error::{GeminiError, GeminiResult};
pub use parser::{parse_analysis_text, parse_or_fallback, ParseFailure, ParseOutcome};
pub use prompt::build_analysis_prompt;
