//! Domain types shared by the index, analyzer and ranking crates.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::{Error, Result};

/// One catalog entry (an assessment) as stored next to its embedding.
///
/// - `name`/`url`: stable identity of the item
/// - `category`: coarse category code (e.g. "K" or "P"), resolved against
///   the configured [`crate::category::CategorySet`]
/// - `description`: free text used for lexical matching
/// - `tags`: optional comma separated tags carried through from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub name: String,
    pub url: String,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub tags: Option<String>,
}

/// Fixed-length L2-normalized embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingVector {
    data: Vec<f32>,
}

impl EmbeddingVector {
    /// Normalize `data` to unit length.
    ///
    /// Fails on an empty vector, non-finite components or a zero vector,
    /// none of which can take part in inner-product search.
    pub fn new(mut data: Vec<f32>) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::Encoding("embedding has no components".to_string()));
        }
        if data.iter().any(|x| !x.is_finite()) {
            return Err(Error::Encoding("embedding has non-finite components".to_string()));
        }
        let norm = data.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm <= f32::EPSILON {
            return Err(Error::Encoding("embedding has zero norm".to_string()));
        }
        let inv = 1.0 / norm;
        for x in &mut data {
            *x *= inv;
        }
        Ok(Self { data })
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[must_use]
    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }

    /// Inner product; for unit vectors this is the cosine similarity.
    #[inline]
    #[must_use]
    pub fn dot(&self, other: &[f32]) -> f32 {
        self.data.iter().zip(other).map(|(a, b)| a * b).sum()
    }
}

/// A raw nearest-neighbour hit returned by the index store.
///
/// `row` is the item's row in the catalog table.
#[derive(Debug, Clone, Copy)]
pub struct SearchHit<'a> {
    pub item: &'a CatalogItem,
    pub row: usize,
    pub score: f32,
}

/// A catalog item paired with its per-query scores.
///
/// `position` is the rank the index returned the item at; equal fused
/// scores keep this order.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub item: &'a CatalogItem,
    pub position: usize,
    pub similarity: f32,
    pub lexical: f32,
    pub fused: f32,
}

/// What the analyzer understood about a query.
///
/// `required` is never empty and follows the configured category order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryAnalysis {
    pub skills: Vec<String>,
    pub required: Vec<Category>,
}

/// Structured output of the text-understanding service before
/// normalization. `None` marks a field the service did not return.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawExtraction {
    pub skills: Option<Vec<String>>,
    pub categories: Option<Vec<String>>,
}
