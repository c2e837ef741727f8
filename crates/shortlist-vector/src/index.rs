use tracing::{info, warn};

use shortlist_core::error::{Error, Result};
use shortlist_core::types::{CatalogItem, EmbeddingVector, SearchHit};

use crate::table::{open_db, read_catalog};

/// Read-only flat inner-product index over the catalog.
///
/// Built once at startup and never mutated; share it behind an `Arc` and
/// search from as many threads as needed without locking.
#[derive(Debug)]
pub struct VectorIndex {
    items: Vec<CatalogItem>,
    vectors: Vec<f32>,
    dim: usize,
}

impl VectorIndex {
    /// Assemble an index from items and their embeddings, paired by position.
    ///
    /// An empty catalog is a valid index with no dimension of its own; it
    /// answers every query with no hits.
    pub fn from_parts(items: Vec<CatalogItem>, vectors: Vec<EmbeddingVector>) -> Result<Self> {
        if items.len() != vectors.len() {
            return Err(Error::IndexUnavailable(format!(
                "{} metadata rows but {} vectors",
                items.len(),
                vectors.len()
            )));
        }
        let Some(dim) = vectors.first().map(EmbeddingVector::dim) else {
            return Ok(Self { items, vectors: Vec::new(), dim: 0 });
        };
        let mut flat = Vec::with_capacity(dim * vectors.len());
        for (row, v) in vectors.iter().enumerate() {
            if v.dim() != dim {
                return Err(Error::IndexUnavailable(format!("row {row} has {} dims, expected {dim}", v.dim())));
            }
            flat.extend_from_slice(v.as_slice());
        }
        Ok(Self { items, vectors: flat, dim })
    }

    /// Load the catalog table from LanceDB.
    pub async fn load(uri: &str, table: &str) -> Result<Self> {
        let conn = open_db(uri).await?;
        let rows = read_catalog(&conn, table).await?;
        let vectors = rows
            .vectors
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                EmbeddingVector::new(v).map_err(|e| Error::IndexUnavailable(format!("row {row}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        let index = Self::from_parts(rows.items, vectors)?;
        if index.is_empty() {
            warn!(uri, table, "catalog table has no rows; every query will return nothing");
        }
        info!(uri, table, rows = index.len(), dim = index.dim(), "catalog index loaded");
        Ok(index)
    }

    /// Blocking wrapper around [`VectorIndex::load`] on a private runtime.
    ///
    /// Must not be called from inside an async context.
    pub fn open(uri: &str, table: &str) -> Result<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| Error::IndexUnavailable(format!("cannot start loader runtime: {e}")))?;
        rt.block_on(Self::load(uri, table))
    }

    /// Up to `top_k` items by descending inner product with `query`.
    /// Equal scores keep table order.
    pub fn search(&self, query: &EmbeddingVector, top_k: usize) -> Result<Vec<SearchHit<'_>>> {
        if self.is_empty() {
            return Ok(Vec::new());
        }
        if query.dim() != self.dim {
            return Err(Error::DimensionMismatch { expected: self.dim, actual: query.dim() });
        }
        let mut scored: Vec<(usize, f32)> =
            self.vectors.chunks_exact(self.dim).map(|row| query.dot(row)).enumerate().collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(top_k);
        Ok(scored
            .into_iter()
            .map(|(row, score)| SearchHit { item: &self.items[row], row, score })
            .collect())
    }

    /// Vector dimension; 0 for an empty index.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> CatalogItem {
        CatalogItem {
            name: name.to_string(),
            url: format!("https://example.test/{name}"),
            category: "K".to_string(),
            description: String::new(),
            tags: None,
        }
    }

    fn unit(x: f32, y: f32) -> EmbeddingVector {
        EmbeddingVector::new(vec![x, y]).unwrap()
    }

    #[test]
    fn search_orders_by_inner_product_and_respects_top_k() {
        let index = VectorIndex::from_parts(
            vec![item("a"), item("b"), item("c")],
            vec![unit(0.0, 1.0), unit(1.0, 0.0), unit(1.0, 1.0)],
        )
        .unwrap();
        let hits = index.search(&unit(1.0, 0.0), 2).unwrap();
        let names: Vec<&str> = hits.iter().map(|h| h.item.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
        assert!((hits[0].score - 1.0).abs() < 1e-6);
        assert_eq!(hits[0].row, 1);
    }

    #[test]
    fn ties_keep_table_order_and_large_k_is_clamped() {
        let index =
            VectorIndex::from_parts(vec![item("a"), item("b")], vec![unit(1.0, 0.0), unit(1.0, 0.0)]).unwrap();
        let hits = index.search(&unit(1.0, 0.0), 50).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].item.name, "a");
        assert_eq!(hits[1].item.name, "b");
        assert!(index.search(&unit(1.0, 0.0), 0).unwrap().is_empty());
    }

    #[test]
    fn wrong_query_dimension_is_rejected() {
        let index = VectorIndex::from_parts(vec![item("a")], vec![unit(1.0, 0.0)]).unwrap();
        let q = EmbeddingVector::new(vec![1.0, 0.0, 0.0]).unwrap();
        assert!(matches!(index.search(&q, 1), Err(Error::DimensionMismatch { expected: 2, actual: 3 })));
    }

    #[test]
    fn empty_catalog_has_no_hits_for_any_query() {
        let index = VectorIndex::from_parts(vec![], vec![]).unwrap();
        assert!(index.is_empty());
        assert_eq!(index.dim(), 0);
        assert!(index.search(&unit(1.0, 0.0), 10).unwrap().is_empty());
        let wide = EmbeddingVector::new(vec![0.0, 0.0, 1.0]).unwrap();
        assert!(index.search(&wide, 10).unwrap().is_empty());
    }

    #[test]
    fn inconsistent_parts_are_unavailable() {
        assert!(matches!(VectorIndex::from_parts(vec![], vec![unit(1.0, 0.0)]), Err(Error::IndexUnavailable(_))));
        assert!(matches!(
            VectorIndex::from_parts(vec![item("a"), item("b")], vec![unit(1.0, 0.0)]),
            Err(Error::IndexUnavailable(_))
        ));
        assert!(matches!(
            VectorIndex::from_parts(
                vec![item("a"), item("b")],
                vec![unit(1.0, 0.0), EmbeddingVector::new(vec![1.0, 0.0, 0.0]).unwrap()]
            ),
            Err(Error::IndexUnavailable(_))
        ));
    }
}
