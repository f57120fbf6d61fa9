//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use quill::adapters::parquet::{read_lookup, write_table_atomic, LookupTable};
use quill::adapters::{ResultMapping, TransformService};
use quill::config::{parse_config, QuillConfig};
use quill::core::checkpoint::CheckpointStore;
use quill::domain::{CodeId, Item, OutputRecord, TableRow, TransformError};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Identifier of the n-th to-clean fixture item
pub fn clean_id(n: usize) -> String {
    format!("A{n:04}")
}

/// Identifier of the n-th keep-as-is fixture item
pub fn keep_id(n: usize) -> String {
    format!("K{n:04}")
}

pub fn original_text(id: &str) -> String {
    format!("{id} SVC W/O CONTRAST")
}

pub fn cleaned_text(id: &str) -> String {
    format!("{id} service without contrast")
}

/// Paths of one fixture workspace
pub struct Fixture {
    pub lookup: PathBuf,
    pub reference: PathBuf,
    pub checkpoint: PathBuf,

    /// Separate output path; the lookup table is overwritten when unset
    pub output: Option<PathBuf>,
}

impl Fixture {
    /// Write a lookup table with `to_clean + keep` rows and a reference table
    /// naming the first `to_clean` of them
    pub fn create(dir: &Path, to_clean: usize, keep: usize) -> Self {
        let lookup = dir.join("hcpcs_lookup.parquet");
        let reference = dir.join("hcpcs_summary.parquet");

        // Written out of order on purpose; the source sorts
        let mut rows: Vec<TableRow> = (0..keep)
            .rev()
            .map(keep_id)
            .chain((0..to_clean).rev().map(clean_id))
            .map(|id| TableRow::from(&OutputRecord::new(CodeId::new(id.clone()).unwrap(), original_text(&id))))
            .collect();
        write_table_atomic(&lookup, "hcpcs_code", "description", &rows).unwrap();

        rows.retain(|r| r.id.as_deref().is_some_and(|id| id.starts_with('A')));
        write_table_atomic(&reference, "hcpcs_code", "description", &rows).unwrap();

        Self {
            lookup,
            reference,
            checkpoint: dir.join(".checkpoint.json"),
            output: None,
        }
    }

    pub fn config(&self, extra: &str) -> QuillConfig {
        let output = match &self.output {
            Some(path) => format!("output_path = \"{}\"", path.display()),
            None => String::new(),
        };
        let text = format!(
            r#"
[source]
lookup_path = "{}"
reference_path = "{}"
{output}

[checkpoint]
path = "{}"

{extra}
"#,
            self.lookup.display(),
            self.reference.display(),
            self.checkpoint.display()
        );
        let config = parse_config(&text).unwrap();
        config.validate().unwrap();
        config
    }

    pub fn store(&self) -> CheckpointStore {
        CheckpointStore::new(&self.checkpoint)
    }

    pub fn output_rows(&self) -> Vec<Item> {
        self.output_table().items
    }

    pub fn output_table(&self) -> LookupTable {
        read_lookup(&self.lookup, "hcpcs_code", "description").unwrap()
    }

    /// Append raw rows to the lookup table
    pub fn add_lookup_rows(&self, extra: &[TableRow]) {
        let table = self.output_table();
        let mut rows: Vec<TableRow> = table
            .items
            .iter()
            .map(|item| TableRow::new(Some(item.id.to_string()), Some(item.original_text.clone())))
            .chain(table.pass_through)
            .collect();
        rows.extend_from_slice(extra);
        write_table_atomic(&self.lookup, "hcpcs_code", "description", &rows).unwrap();
    }
}

/// What the scripted service does on one call
#[derive(Debug, Clone)]
pub enum Step {
    Succeed,
    Fail(TransformError),
}

/// A transform service that replays a script, then succeeds forever
///
/// Successful calls return `cleaned_text(id)` for every item. Each call
/// records the identifiers it received and the size of the checkpoint file
/// on disk at that moment.
pub struct ScriptedService {
    script: Mutex<VecDeque<Step>>,
    checkpoint: Option<CheckpointStore>,
    calls: Mutex<Vec<Vec<String>>>,
    checkpoint_sizes: Mutex<Vec<usize>>,
}

impl ScriptedService {
    pub fn new(script: Vec<Step>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            checkpoint: None,
            calls: Mutex::new(Vec::new()),
            checkpoint_sizes: Mutex::new(Vec::new()),
        }
    }

    pub fn always_succeeds() -> Self {
        Self::new(Vec::new())
    }

    pub fn observing(mut self, store: CheckpointStore) -> Self {
        self.checkpoint = Some(store);
        self
    }

    /// Identifiers received, one vector per call
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_sizes(&self) -> Vec<usize> {
        self.calls().iter().map(Vec::len).collect()
    }

    pub fn checkpoint_sizes(&self) -> Vec<usize> {
        self.checkpoint_sizes.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransformService for ScriptedService {
    async fn transform(&self, items: &[Item]) -> Result<ResultMapping, TransformError> {
        self.calls
            .lock()
            .unwrap()
            .push(items.iter().map(|i| i.id.to_string()).collect());

        if let Some(store) = &self.checkpoint {
            let size = store.load().map(|c| c.len()).unwrap_or(0);
            self.checkpoint_sizes.lock().unwrap().push(size);
        }

        let step = self.script.lock().unwrap().pop_front().unwrap_or(Step::Succeed);
        match step {
            Step::Succeed => Ok(items
                .iter()
                .map(|item| (item.id.clone(), cleaned_text(item.id.as_str())))
                .collect()),
            Step::Fail(err) => Err(err),
        }
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}
