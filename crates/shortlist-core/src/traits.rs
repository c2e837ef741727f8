use crate::error::Result;
use crate::types::{EmbeddingVector, RawExtraction};

/// Maps free text to a unit-length vector with one pinned model.
///
/// The catalog index and every query must be encoded by the same model,
/// so `dim` is checked against the index at startup and `model_id` is logged.
pub trait Embedder: Send + Sync {
    fn model_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn encode(&self, text: &str) -> Result<EmbeddingVector>;
}

/// Narrow seam over the external text-understanding service.
///
/// Implementations return the service's structured answer or an explicit
/// `Error::Extraction`; they never decide on fallbacks themselves.
pub trait QueryExtractor: Send + Sync {
    fn extract(&self, query: &str) -> Result<RawExtraction>;
}
