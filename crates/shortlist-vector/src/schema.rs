//! Arrow layout of the catalog table.
//!
//! One row per catalog item; the `vector` column holds the item's
//! normalized embedding. Row order is the index-scan order.
use anyhow::{anyhow, Result};
use arrow_array::{FixedSizeListArray, RecordBatch, StringArray};
use arrow_schema::{DataType, Field, Schema};
use std::sync::Arc;

use shortlist_core::types::{CatalogItem, EmbeddingVector};

pub const NAME: &str = "name";
pub const URL: &str = "url";
pub const CATEGORY: &str = "category";
pub const DESCRIPTION: &str = "description";
pub const TAGS: &str = "tags";
pub const VECTOR: &str = "vector";

pub fn catalog_schema(dim: i32) -> Arc<Schema> {
	Arc::new(Schema::new(vec![
		Field::new(NAME, DataType::Utf8, false),
		Field::new(URL, DataType::Utf8, false),
		Field::new(CATEGORY, DataType::Utf8, false),
		Field::new(DESCRIPTION, DataType::Utf8, false),
		Field::new(TAGS, DataType::Utf8, true),
		Field::new(VECTOR, DataType::FixedSizeList(Arc::new(Field::new("item", DataType::Float32, true)), dim), true),
	]))
}

/// Build one record batch in the catalog layout, for offline builders and
/// test fixtures.
pub fn catalog_batch(items: &[CatalogItem], vectors: &[EmbeddingVector]) -> Result<RecordBatch> {
	if items.len() != vectors.len() {
		return Err(anyhow!("{} items but {} vectors", items.len(), vectors.len()));
	}
	let dim = vectors.first().map(EmbeddingVector::dim).ok_or_else(|| anyhow!("empty catalog batch"))?;
	if let Some(bad) = vectors.iter().find(|v| v.dim() != dim) {
		return Err(anyhow!("mixed vector dimensions: {} and {}", dim, bad.dim()));
	}
	let dim = i32::try_from(dim)?;
	let vectors: Vec<Option<Vec<Option<f32>>>> =
		vectors.iter().map(|v| Some(v.as_slice().iter().map(|&x| Some(x)).collect())).collect();
	let batch = RecordBatch::try_new(
		catalog_schema(dim),
		vec![
			Arc::new(StringArray::from_iter_values(items.iter().map(|i| i.name.as_str()))),
			Arc::new(StringArray::from_iter_values(items.iter().map(|i| i.url.as_str()))),
			Arc::new(StringArray::from_iter_values(items.iter().map(|i| i.category.as_str()))),
			Arc::new(StringArray::from_iter_values(items.iter().map(|i| i.description.as_str()))),
			Arc::new(StringArray::from(items.iter().map(|i| i.tags.clone()).collect::<Vec<Option<String>>>())),
			Arc::new(FixedSizeListArray::from_iter_primitive::<arrow_array::types::Float32Type, _, _>(vectors, dim)),
		],
	)?;
	Ok(batch)
}
