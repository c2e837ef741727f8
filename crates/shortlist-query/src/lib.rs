//! Query understanding: which skills a query mentions and which assessment
//! categories it calls for.
//!
//! The external language model sits behind [`shortlist_core::traits::QueryExtractor`];
//! [`QueryAnalyzer`] turns whatever it returns (or fails to return) into a
//! usable [`shortlist_core::types::QueryAnalysis`].

mod analyzer;
mod gemini;
mod payload;
mod prompt;

pub use analyzer::QueryAnalyzer;
pub use gemini::GeminiClient;
pub use payload::parse_extraction;
pub use prompt::build_prompt;
