//! Parquet input tables and output artifact
//!
//! - [`reader`] - Reads identifier/text columns from the lookup and reference tables
//! - [`writer`] - Writes the enriched table atomically and fingerprints it

pub mod reader;
pub mod writer;

pub use reader::{read_identifiers, read_lookup, LookupTable};
pub use writer::{encode_table, write_table_atomic};
