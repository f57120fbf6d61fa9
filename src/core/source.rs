//! Item source: splits the lookup table into items to clean and items to keep
//!
//! An item needs cleaning when its identifier appears in the reference table
//! (semi-join); every other item is kept as-is (anti-join). Both sides are
//! ordered by identifier. Rows without a usable identifier or text are kept
//! as-is too, as raw pass-through rows.

use crate::adapters::parquet::{read_identifiers, read_lookup};
use crate::config::SourceConfig;
use crate::domain::context::ResultExt;
use crate::domain::{CodeId, Item, QuillError, Result, TableRow};
use std::collections::HashSet;

/// Lookup items split by reference membership
#[derive(Debug, Clone, Default)]
pub struct PartitionedItems {
    /// Items whose identifier is in the reference set, ordered by identifier
    pub to_clean: Vec<Item>,

    /// All other items, ordered by identifier
    pub keep_as_is: Vec<Item>,

    /// Lookup rows with a null or blank identifier or a null text, in file
    /// order. Never sent to the service, written back unchanged.
    pub pass_through: Vec<TableRow>,
}

impl PartitionedItems {
    /// Total number of lookup rows, pass-through rows included
    pub fn total(&self) -> usize {
        self.to_clean.len() + self.keep_as_is.len() + self.pass_through.len()
    }
}

/// Reads the input tables and partitions them
pub struct ItemSource {
    config: SourceConfig,
}

impl ItemSource {
    /// Create a new item source
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    /// Load and partition the lookup table against the reference table
    ///
    /// # Errors
    ///
    /// Returns a source error if either table cannot be read or the lookup
    /// table contains the same identifier twice.
    pub fn load(&self) -> Result<PartitionedItems> {
        let lookup = read_lookup(
            &self.config.lookup_path,
            &self.config.id_column,
            &self.config.text_column,
        )
        .context("lookup table")?;
        let reference = read_identifiers(
            &self.config.reference_path,
            self.config.reference_column(),
        )
        .context("reference table")?;

        let mut partitioned = partition_items(lookup.items, &reference)?;
        check_pass_through_ids(&partitioned, &lookup.pass_through)?;
        partitioned.pass_through = lookup.pass_through;

        tracing::info!(
            total = partitioned.total(),
            to_clean = partitioned.to_clean.len(),
            keep_as_is = partitioned.keep_as_is.len(),
            pass_through = partitioned.pass_through.len(),
            reference_ids = reference.len(),
            "Loaded items"
        );

        Ok(partitioned)
    }
}

/// Split items by membership in `reference`
///
/// # Errors
///
/// Returns a source error naming the first duplicated identifier.
pub fn partition_items(mut items: Vec<Item>, reference: &HashSet<CodeId>) -> Result<PartitionedItems> {
    items.sort_by(|a, b| a.id.cmp(&b.id));

    if let Some(pair) = items.windows(2).find(|pair| pair[0].id == pair[1].id) {
        return Err(QuillError::Source(format!(
            "Identifier '{}' appears more than once in the lookup table",
            pair[0].id
        )));
    }

    let (to_clean, keep_as_is): (Vec<Item>, Vec<Item>) = items
        .into_iter()
        .partition(|item| reference.contains(&item.id));

    Ok(PartitionedItems {
        to_clean,
        keep_as_is,
        pass_through: Vec::new(),
    })
}

/// Reject keyed pass-through rows (null text) whose identifier is already
/// taken by another row
fn check_pass_through_ids(items: &PartitionedItems, pass_through: &[TableRow]) -> Result<()> {
    let mut seen: HashSet<&str> = items
        .to_clean
        .iter()
        .chain(items.keep_as_is.iter())
        .map(|item| item.id.as_str())
        .collect();

    let keyed = pass_through
        .iter()
        .filter_map(|row| row.id.as_deref())
        .filter(|id| !id.trim().is_empty());
    for id in keyed {
        if !seen.insert(id) {
            return Err(QuillError::Source(format!(
                "Identifier '{id}' appears more than once in the lookup table"
            )));
        }
    }
    Ok(())
}
