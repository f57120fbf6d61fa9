//! Output merging
//!
//! The output holds one row per identifier: the checkpointed cleaned text
//! for items that were cleaned, the original text for everything else.
//! Pass-through rows from the lookup table are written back verbatim.

use crate::adapters::parquet::write_table_atomic;
use crate::config::SourceConfig;
use crate::core::checkpoint::Checkpoint;
use crate::domain::{Item, OutputRecord, Result, TableRow};
use std::path::PathBuf;

/// Combine checkpoint state with both item sets, ordered by identifier
///
/// Checkpoint entries for identifiers outside `to_clean` are ignored, so a
/// keep-as-is item always carries its original text.
pub fn merge_output(checkpoint: &Checkpoint, to_clean: &[Item], keep_as_is: &[Item]) -> Vec<OutputRecord> {
    let cleaned = to_clean.iter().map(|item| {
        let text = checkpoint.get(&item.id).unwrap_or(item.original_text.as_str());
        OutputRecord::new(item.id.clone(), text)
    });
    let kept = keep_as_is
        .iter()
        .map(|item| OutputRecord::new(item.id.clone(), item.original_text.as_str()));

    let mut records: Vec<OutputRecord> = cleaned.chain(kept).collect();
    records.sort_by(|a, b| a.id.cmp(&b.id));
    records
}

/// Combine merged records with pass-through rows into the rows to write
///
/// Rows are ordered by identifier, rows without one last. The sort is
/// stable, so pass-through rows sharing an identifier keep their file order.
pub fn assemble_rows(records: &[OutputRecord], pass_through: &[TableRow]) -> Vec<TableRow> {
    let mut rows: Vec<TableRow> = records
        .iter()
        .map(TableRow::from)
        .chain(pass_through.iter().cloned())
        .collect();
    rows.sort_by(TableRow::output_order);
    rows
}

/// A written output table
#[derive(Debug, Clone)]
pub struct OutputArtifact {
    pub path: PathBuf,
    pub rows: usize,
    pub sha256: String,
}

/// Write assembled rows to the configured output path atomically
///
/// # Errors
///
/// Returns an output error if the table cannot be encoded or written.
pub fn write_output(source: &SourceConfig, records: &[TableRow]) -> Result<OutputArtifact> {
    let path = source.output().clone();
    let sha256 = write_table_atomic(&path, &source.id_column, &source.text_column, records)?;

    tracing::info!(
        path = %path.display(),
        rows = records.len(),
        sha256 = %sha256,
        "Output table written"
    );

    Ok(OutputArtifact {
        path,
        rows: records.len(),
        sha256,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CodeId;

    fn item(id: &str, text: &str) -> Item {
        Item::new(CodeId::new(id).unwrap(), text)
    }

    #[test]
    fn test_merge_prefers_checkpoint_for_cleaned_items() {
        let to_clean = vec![item("A0428", "AMBULANCE SERVICE BLS"), item("J3490", "DRUGS UNCLASSIFIED")];
        let keep = vec![item("99213", "OFFICE O/P EST LOW")];
        let checkpoint: Checkpoint = [(CodeId::new("A0428").unwrap(), "Ambulance service, basic life support".to_string())]
            .into_iter()
            .collect();

        let records = merge_output(&checkpoint, &to_clean, &keep);

        let rows: Vec<(&str, &str)> = records
            .iter()
            .map(|r| (r.id.as_str(), r.description.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("99213", "OFFICE O/P EST LOW"),
                ("A0428", "Ambulance service, basic life support"),
                ("J3490", "DRUGS UNCLASSIFIED"),
            ]
        );
    }

    #[test]
    fn test_keep_as_is_never_takes_checkpoint_text() {
        let keep = vec![item("99213", "OFFICE O/P EST LOW")];
        let checkpoint: Checkpoint = [(CodeId::new("99213").unwrap(), "Rewritten".to_string())]
            .into_iter()
            .collect();

        let records = merge_output(&checkpoint, &[], &keep);
        assert_eq!(records[0].description, "OFFICE O/P EST LOW");
    }

    #[test]
    fn test_assemble_rows_orders_unkeyed_rows_last() {
        let records = merge_output(
            &Checkpoint::new(),
            &[],
            &[item("99213", "OFFICE O/P EST LOW"), item("A0428", "AMBULANCE SERVICE BLS")],
        );
        let pass_through = vec![
            TableRow::new(None, Some("NO CODE".to_string())),
            TableRow::new(Some("J3490".to_string()), None),
            TableRow::new(Some(" ".to_string()), Some("BLANK CODE".to_string())),
        ];

        let rows = assemble_rows(&records, &pass_through);

        let ids: Vec<Option<&str>> = rows.iter().map(|r| r.id.as_deref()).collect();
        assert_eq!(ids, vec![Some(" "), Some("99213"), Some("A0428"), Some("J3490"), None]);
        assert_eq!(rows[3].text, None);
        assert_eq!(rows[4].text.as_deref(), Some("NO CODE"));
    }
}
