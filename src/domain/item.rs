//! Records flowing through an enrichment run

use crate::domain::ids::CodeId;
use serde::{Deserialize, Serialize};

/// One coded record read from the lookup table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Stable identifier, unique within the lookup table
    pub id: CodeId,
    /// Abbreviated text as found in the lookup table
    pub original_text: String,
}

impl Item {
    /// Create a new item
    pub fn new(id: CodeId, original_text: impl Into<String>) -> Self {
        Self {
            id,
            original_text: original_text.into(),
        }
    }
}

/// One row of the output artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub id: CodeId,
    pub description: String,
}

impl OutputRecord {
    /// Create a new output record
    pub fn new(id: CodeId, description: impl Into<String>) -> Self {
        Self {
            id,
            description: description.into(),
        }
    }
}

/// One raw lookup row, as stored
///
/// Rows the job cannot turn into an [`Item`] (null or blank identifier, null
/// text) travel to the output in this form and are written back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub id: Option<String>,
    pub text: Option<String>,
}

impl TableRow {
    /// Create a new row
    pub fn new(id: Option<String>, text: Option<String>) -> Self {
        Self { id, text }
    }

    /// Output ordering: by identifier, rows without one last
    pub fn output_order(&self, other: &Self) -> std::cmp::Ordering {
        match (&self.id, &other.id) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    }
}

impl From<&OutputRecord> for TableRow {
    fn from(record: &OutputRecord) -> Self {
        Self::new(
            Some(record.id.as_str().to_string()),
            Some(record.description.clone()),
        )
    }
}
