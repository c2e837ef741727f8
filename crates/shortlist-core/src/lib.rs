#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod category;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use category::{Category, CategorySet};
pub use error::{Error, Result};
