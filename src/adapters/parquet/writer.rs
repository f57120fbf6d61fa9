//! Writing the enriched table
//!
//! The table is encoded fully in memory, then handed to
//! [`write_atomic`](crate::adapters::atomic::write_atomic), so a reader of
//! the output path sees either the previous file or the complete new one.

use crate::adapters::atomic::write_atomic;
use crate::domain::{QuillError, Result, TableRow};
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;

/// Encode rows as a two-column SNAPPY parquet file in a single row group
///
/// Rows are written in the order given. Both columns are nullable so
/// pass-through rows keep their nulls. Identical input produces identical
/// bytes.
pub fn encode_table(id_column: &str, text_column: &str, records: &[TableRow]) -> Result<Vec<u8>> {
    let schema = Arc::new(Schema::new(vec![
        Field::new(id_column, DataType::Utf8, true),
        Field::new(text_column, DataType::Utf8, true),
    ]));

    let ids: StringArray = records.iter().map(|r| r.id.as_deref()).collect();
    let texts: StringArray = records.iter().map(|r| r.text.as_deref()).collect();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![Arc::new(ids) as ArrayRef, Arc::new(texts) as ArrayRef],
    )
    .map_err(output_error)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .set_max_row_group_size(records.len().max(1))
        .build();

    let mut writer = ArrowWriter::try_new(Vec::new(), schema, Some(props)).map_err(output_error)?;
    writer.write(&batch).map_err(output_error)?;
    writer.into_inner().map_err(output_error)
}

/// Encode and atomically write the output table
///
/// Returns the hex SHA-256 of the bytes written.
///
/// # Errors
///
/// Returns an output error if encoding fails or the file cannot be
/// written. The previous file at `path`, if any, is left untouched.
pub fn write_table_atomic(
    path: &Path,
    id_column: &str,
    text_column: &str,
    records: &[TableRow],
) -> Result<String> {
    let bytes = encode_table(id_column, text_column, records)?;
    let digest = format!("{:x}", Sha256::digest(&bytes));

    write_atomic(path, &bytes).map_err(|e| {
        QuillError::Output(format!("Failed to write {}: {e}", path.display()))
    })?;

    tracing::debug!(
        path = %path.display(),
        rows = records.len(),
        bytes = bytes.len(),
        sha256 = %digest,
        "Wrote output table"
    );
    Ok(digest)
}

fn output_error(err: impl std::fmt::Display) -> QuillError {
    QuillError::Output(format!("Failed to encode output table: {err}"))
}
