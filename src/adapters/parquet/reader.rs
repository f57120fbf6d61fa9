//! Reading string columns out of parquet tables

use crate::domain::{CodeId, Item, QuillError, Result, TableRow};
use arrow::array::{Array, ArrayRef, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Schema};
use parquet::arrow::arrow_reader::{ParquetRecordBatchReader, ParquetRecordBatchReaderBuilder};
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

/// Rows of a lookup table
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
    /// Rows with an identifier and a text, in file order
    pub items: Vec<Item>,

    /// Rows with a null or blank identifier, or a null text, in file order
    pub pass_through: Vec<TableRow>,
}

impl LookupTable {
    /// Number of rows read
    pub fn len(&self) -> usize {
        self.items.len() + self.pass_through.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read every `(id, text)` row of a lookup table
///
/// No row is dropped. Rows that cannot become an [`Item`] are returned as
/// pass-through rows with their values untouched. Duplicate detection is
/// left to the caller.
///
/// # Errors
///
/// Returns a source error if the file cannot be opened, a column is missing
/// or is not a string column.
pub fn read_lookup(path: &Path, id_column: &str, text_column: &str) -> Result<LookupTable> {
    let reader = open(path, &[id_column, text_column])?;
    let mut table = LookupTable::default();

    for batch in reader {
        let batch = batch.map_err(|e| source_error(path, e))?;
        let ids = string_column(path, batch.column_by_name(id_column), id_column)?;
        let texts = string_column(path, batch.column_by_name(text_column), text_column)?;

        for row in 0..batch.num_rows() {
            let id = (!ids.is_null(row)).then(|| ids.value(row));
            let text = (!texts.is_null(row)).then(|| texts.value(row));

            match (id.map(CodeId::new), text) {
                (Some(Ok(id)), Some(text)) => table.items.push(Item::new(id, text)),
                _ => table.pass_through.push(TableRow::new(
                    id.map(str::to_string),
                    text.map(str::to_string),
                )),
            }
        }
    }

    if !table.pass_through.is_empty() {
        tracing::warn!(
            path = %path.display(),
            rows = table.pass_through.len(),
            "Rows without an identifier or text are passed through unchanged"
        );
    }

    tracing::debug!(path = %path.display(), rows = table.len(), "Read lookup table");
    Ok(table)
}

/// Read the distinct identifiers of one column
///
/// # Errors
///
/// Same conditions as [`read_lookup`].
pub fn read_identifiers(path: &Path, column: &str) -> Result<HashSet<CodeId>> {
    let reader = open(path, &[column])?;
    let mut ids = HashSet::new();

    for batch in reader {
        let batch = batch.map_err(|e| source_error(path, e))?;
        let values = string_column(path, batch.column_by_name(column), column)?;
        for row in 0..batch.num_rows() {
            if values.is_null(row) {
                continue;
            }
            if let Ok(id) = CodeId::new(values.value(row)) {
                ids.insert(id);
            }
        }
    }

    tracing::debug!(path = %path.display(), distinct = ids.len(), "Read reference identifiers");
    Ok(ids)
}

fn open(path: &Path, columns: &[&str]) -> Result<ParquetRecordBatchReader> {
    let file = File::open(path).map_err(|e| {
        QuillError::Source(format!("Failed to open {}: {e}", path.display()))
    })?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).map_err(|e| source_error(path, e))?;

    check_columns(path, builder.schema(), columns)?;

    builder.build().map_err(|e| source_error(path, e))
}

fn check_columns(path: &Path, schema: &Schema, columns: &[&str]) -> Result<()> {
    for name in columns {
        let field = schema.field_with_name(name).map_err(|_| {
            let available: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
            QuillError::Source(format!(
                "{} has no column '{name}' (available: {})",
                path.display(),
                available.join(", ")
            ))
        })?;
        if !matches!(
            field.data_type(),
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View
        ) {
            return Err(QuillError::Source(format!(
                "{}: column '{name}' must be a string column, found {}",
                path.display(),
                field.data_type()
            )));
        }
    }
    Ok(())
}

/// Normalise any string encoding to a plain `StringArray`
fn string_column(path: &Path, column: Option<&ArrayRef>, name: &str) -> Result<StringArray> {
    let column = column.ok_or_else(|| {
        QuillError::Source(format!("{}: column '{name}' missing from batch", path.display()))
    })?;
    let converted = cast(column, &DataType::Utf8).map_err(|e| source_error(path, e))?;
    converted
        .as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .ok_or_else(|| {
            QuillError::Source(format!(
                "{}: column '{name}' could not be read as text",
                path.display()
            ))
        })
}

fn source_error(path: &Path, err: impl std::fmt::Display) -> QuillError {
    QuillError::Source(format!("Failed to read {}: {err}", path.display()))
}
