//! Batching and per-batch processing
//!
//! [`partition`] cuts the remaining items into contiguous, order-preserving
//! batches. [`BatchProcessor`] runs one batch through the retry controller,
//! merges the accepted results into the checkpoint and persists it.

use crate::adapters::{ResultMapping, TransformService};
use crate::core::checkpoint::{Checkpoint, CheckpointStore};
use crate::core::retry::{RetryController, RetryPolicy};
use crate::domain::{CodeId, Item, Result};
use std::collections::HashSet;
use std::sync::Arc;

/// One slice of the remaining items
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    /// 1-based position within the run
    pub index: usize,
    pub items: Vec<Item>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Split `items` into batches of at most `max_batch_size`, keeping order
///
/// Only the last batch may be short. A size of 0 is treated as 1.
pub fn partition(items: &[Item], max_batch_size: usize) -> Vec<Batch> {
    items
        .chunks(max_batch_size.max(1))
        .enumerate()
        .map(|(i, chunk)| Batch {
            index: i + 1,
            items: chunk.to_vec(),
        })
        .collect()
}

/// What one batch contributed to the checkpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub index: usize,

    /// Items sent to the service
    pub dispatched: usize,

    /// Results merged into the checkpoint
    pub accepted: usize,

    /// Identifiers added to the checkpoint for the first time
    pub newly_checkpointed: usize,

    /// Batch items the service returned nothing usable for
    pub missing: usize,

    /// Results dropped because the identifier was not in the batch
    pub unexpected: usize,

    pub attempts: u32,
    pub rate_limit_waits: u32,
}

/// Runs single batches and persists their results
pub struct BatchProcessor {
    service: Arc<dyn TransformService>,
    retry: RetryController,
    store: CheckpointStore,
}

impl BatchProcessor {
    pub fn new(service: Arc<dyn TransformService>, policy: RetryPolicy, store: CheckpointStore) -> Self {
        Self {
            service,
            retry: RetryController::new(policy),
            store,
        }
    }

    /// Process one batch and persist the updated checkpoint
    ///
    /// On error the checkpoint is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`QuillError::BatchFailed`](crate::domain::QuillError::BatchFailed)
    /// when retries are exhausted, or a checkpoint error if saving fails.
    pub async fn process(&self, batch: &Batch, checkpoint: &mut Checkpoint) -> Result<BatchResult> {
        tracing::debug!(batch = batch.index, items = batch.len(), "Dispatching batch");

        let outcome = self
            .retry
            .call(batch.index, &batch.items, self.service.as_ref())
            .await?;

        let returned = outcome.mapping.len();
        let accepted = filter_mapping(batch, outcome.mapping);
        let unexpected = returned - accepted.len();
        if unexpected > 0 {
            tracing::warn!(
                batch = batch.index,
                dropped = unexpected,
                "Discarded results that were empty or not part of the batch"
            );
        }

        let missing = batch.len() - accepted.len();
        if missing > 0 {
            let missing_ids: Vec<&str> = batch
                .items
                .iter()
                .filter(|item| !accepted.contains_key(&item.id))
                .map(|item| item.id.as_str())
                .collect();
            tracing::debug!(
                batch = batch.index,
                missing = missing,
                ids = ?missing_ids,
                "Service returned no result for some items"
            );
        }

        let accepted_count = accepted.len();
        let mut updated = checkpoint.clone();
        let newly_checkpointed = updated.merge(accepted);
        self.store.save(&updated)?;
        *checkpoint = updated;

        Ok(BatchResult {
            index: batch.index,
            dispatched: batch.len(),
            accepted: accepted_count,
            newly_checkpointed,
            missing,
            unexpected,
            attempts: outcome.attempts,
            rate_limit_waits: outcome.rate_limit_waits,
        })
    }
}

/// Keep only non-blank results for identifiers that were in the batch
fn filter_mapping(batch: &Batch, mapping: ResultMapping) -> ResultMapping {
    let wanted: HashSet<&CodeId> = batch.items.iter().map(|item| &item.id).collect();
    mapping
        .into_iter()
        .filter(|(id, text)| wanted.contains(id) && !text.trim().is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QuillError, TransformError};
    use async_trait::async_trait;
    use tempfile::TempDir;
    use test_case::test_case;

    fn items(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| Item::new(CodeId::new(format!("C{i:04}")).unwrap(), format!("TEXT {i}")))
            .collect()
    }

    #[test_case(250, 100, &[100, 100, 50] ; "uneven tail")]
    #[test_case(200, 100, &[100, 100] ; "exact multiple")]
    #[test_case(3, 100, &[3] ; "single short batch")]
    #[test_case(0, 100, &[] ; "no items")]
    #[test_case(2, 0, &[1, 1] ; "zero size treated as one")]
    fn test_partition_sizes(n: usize, size: usize, expected: &[usize]) {
        let batches = partition(&items(n), size);
        let sizes: Vec<usize> = batches.iter().map(Batch::len).collect();
        assert_eq!(sizes, expected);
    }

    #[test]
    fn test_partition_covers_items_once_in_order() {
        let all = items(23);
        let batches = partition(&all, 5);

        let indexes: Vec<usize> = batches.iter().map(|b| b.index).collect();
        assert_eq!(indexes, vec![1, 2, 3, 4, 5]);

        let flattened: Vec<Item> = batches.into_iter().flat_map(|b| b.items).collect();
        assert_eq!(flattened, all);
    }

    struct Echo {
        extra: Option<(CodeId, String)>,
        skip_first: bool,
        fail: bool,
    }

    #[async_trait]
    impl TransformService for Echo {
        async fn transform(&self, items: &[Item]) -> std::result::Result<ResultMapping, TransformError> {
            if self.fail {
                return Err(TransformError::Transient("down".to_string()));
            }
            let skip = usize::from(self.skip_first);
            let mut mapping: ResultMapping = items
                .iter()
                .skip(skip)
                .map(|item| (item.id.clone(), item.original_text.to_lowercase()))
                .collect();
            if let Some((id, text)) = &self.extra {
                mapping.insert(id.clone(), text.clone());
            }
            Ok(mapping)
        }

        fn describe(&self) -> String {
            "echo".to_string()
        }
    }

    fn processor(dir: &TempDir, service: Echo) -> (BatchProcessor, CheckpointStore) {
        let store = CheckpointStore::new(dir.path().join("checkpoint.json"));
        let policy = RetryPolicy {
            max_attempts: 1,
            ..RetryPolicy::default()
        };
        (BatchProcessor::new(Arc::new(service), policy, store.clone()), store)
    }

    #[tokio::test]
    async fn test_process_merges_and_persists() {
        let dir = TempDir::new().unwrap();
        let (processor, store) = processor(&dir, Echo { extra: None, skip_first: false, fail: false });
        let batch = partition(&items(3), 100).remove(0);
        let mut checkpoint = Checkpoint::new();

        let result = processor.process(&batch, &mut checkpoint).await.unwrap();

        assert_eq!(result.accepted, 3);
        assert_eq!(result.newly_checkpointed, 3);
        assert_eq!(store.load().unwrap(), checkpoint);
        assert_eq!(checkpoint.get(&CodeId::new("C0001").unwrap()), Some("text 1"));
    }

    #[tokio::test]
    async fn test_process_drops_foreign_ids_and_tolerates_partial_results() {
        let dir = TempDir::new().unwrap();
        let foreign = (CodeId::new("99213").unwrap(), "Office visit".to_string());
        let (processor, _) = processor(&dir, Echo { extra: Some(foreign), skip_first: true, fail: false });
        let batch = partition(&items(3), 100).remove(0);
        let mut checkpoint = Checkpoint::new();

        let result = processor.process(&batch, &mut checkpoint).await.unwrap();

        assert_eq!(result.accepted, 2);
        assert_eq!(result.missing, 1);
        assert_eq!(result.unexpected, 1);
        assert!(!checkpoint.contains(&CodeId::new("99213").unwrap()));
        assert!(!checkpoint.contains(&CodeId::new("C0000").unwrap()));
    }

    #[tokio::test]
    async fn test_failed_batch_leaves_checkpoint_untouched() {
        let dir = TempDir::new().unwrap();
        let (processor, store) = processor(&dir, Echo { extra: None, skip_first: false, fail: true });
        let batch = partition(&items(2), 100).remove(0);
        let mut checkpoint: Checkpoint = [(CodeId::new("X1").unwrap(), "kept".to_string())].into_iter().collect();
        store.save(&checkpoint).unwrap();

        let err = processor.process(&batch, &mut checkpoint).await.unwrap_err();

        assert!(matches!(err, QuillError::BatchFailed { batch: 1, .. }));
        assert_eq!(checkpoint.len(), 1);
        assert_eq!(store.load().unwrap(), checkpoint);
    }
}
