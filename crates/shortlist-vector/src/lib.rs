//! Vector index store for the assessment catalog.
//!
//! The catalog lives in a LanceDB table (see [`schema`]); [`VectorIndex`]
//! loads it once into memory and answers exact inner-product queries.

pub mod index;
pub mod schema;
pub mod table;

pub use index::VectorIndex;
