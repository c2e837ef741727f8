//! LanceDB access for the catalog table.
//!
//! Reads the whole table once; every structural problem is reported as
//! `Error::IndexUnavailable` so the caller can refuse to serve.
use arrow_array::cast::AsArray;
use arrow_array::{Array, FixedSizeListArray, RecordBatch, StringArray};
use futures::TryStreamExt;
use lancedb::query::ExecutableQuery;
use lancedb::{connect, Connection};
use tracing::debug;

use shortlist_core::error::{Error, Result};
use shortlist_core::types::CatalogItem;

use crate::schema::{CATEGORY, DESCRIPTION, NAME, TAGS, URL, VECTOR};

/// Items and their raw vectors, both in table order.
pub struct CatalogRows {
    pub items: Vec<CatalogItem>,
    pub vectors: Vec<Vec<f32>>,
}

pub async fn open_db(uri: &str) -> Result<Connection> {
    connect(uri)
        .execute()
        .await
        .map_err(|e| Error::IndexUnavailable(format!("cannot open database {uri}: {e}")))
}

pub async fn read_catalog(conn: &Connection, table: &str) -> Result<CatalogRows> {
    let names = conn
        .table_names()
        .execute()
        .await
        .map_err(|e| Error::IndexUnavailable(format!("cannot list tables: {e}")))?;
    if !names.iter().any(|n| n == table) {
        return Err(Error::IndexUnavailable(format!("table '{table}' not found")));
    }
    let t = conn
        .open_table(table)
        .execute()
        .await
        .map_err(|e| Error::IndexUnavailable(format!("cannot open table '{table}': {e}")))?;
    let mut stream = t
        .query()
        .execute()
        .await
        .map_err(|e| Error::IndexUnavailable(format!("cannot scan table '{table}': {e}")))?;

    let mut rows = CatalogRows { items: Vec::new(), vectors: Vec::new() };
    while let Some(batch) = stream
        .try_next()
        .await
        .map_err(|e| Error::IndexUnavailable(format!("scan of '{table}' failed: {e}")))?
    {
        append_batch(&batch, &mut rows)?;
        debug!(rows = rows.items.len(), "read catalog batch");
    }
    Ok(rows)
}

fn append_batch(batch: &RecordBatch, rows: &mut CatalogRows) -> Result<()> {
    let names = string_column(batch, NAME)?;
    let urls = string_column(batch, URL)?;
    let categories = string_column(batch, CATEGORY)?;
    let descriptions = string_column(batch, DESCRIPTION)?;
    // tags are optional metadata; tolerate tables built without them
    let tags = batch.column_by_name(TAGS).and_then(|c| c.as_any().downcast_ref::<StringArray>());
    let vectors = batch
        .column_by_name(VECTOR)
        .and_then(|c| c.as_any().downcast_ref::<FixedSizeListArray>())
        .ok_or_else(|| missing(VECTOR, "FixedSizeList<Float32>"))?;

    for i in 0..batch.num_rows() {
        if !vectors.is_valid(i) {
            return Err(Error::IndexUnavailable(format!("row {} has no vector", rows.items.len())));
        }
        let list = vectors.value(i);
        let values = list
            .as_primitive_opt::<arrow_array::types::Float32Type>()
            .ok_or_else(|| missing(VECTOR, "FixedSizeList<Float32>"))?;
        rows.vectors.push(values.values().iter().copied().collect());
        rows.items.push(CatalogItem {
            name: names.value(i).to_string(),
            url: urls.value(i).to_string(),
            category: categories.value(i).to_string(),
            description: descriptions.value(i).to_string(),
            tags: tags.filter(|t| t.is_valid(i)).map(|t| t.value(i).to_string()),
        });
    }
    Ok(())
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| missing(name, "Utf8"))
}

fn missing(column: &str, ty: &str) -> Error {
    Error::IndexUnavailable(format!("column '{column}' missing or not {ty}"))
}
