//! The process queue: a pending sequence plus the set of items checked out.
//!
//! The queue owns both collections outright. Read operations hand back
//! copies and claims move items out, so callers never hold live references
//! into queue state.

use std::collections::{HashMap, VecDeque};

use opentelemetry::KeyValue;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::QueueConfig;
use crate::error::{Error, Result};
use crate::model::{ItemId, ItemState, QueueItem};
use crate::telemetry::metrics;

/// Pending items in serve order, plus the items currently being processed.
///
/// An id is never pending and in process at the same time: queueing an id
/// that is checked out is refused until [`ProcessQueue::done_processing`]
/// releases it.
#[derive(Debug, Clone)]
pub struct ProcessQueue<T> {
    pending: VecDeque<T>,
    in_process: HashMap<ItemId, T>,
    config: QueueConfig,
}

impl<T: QueueItem + Clone> Default for ProcessQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: QueueItem + Clone> ProcessQueue<T> {
    /// Queue with the default configuration: head insertion, 1000 item cap.
    pub fn new() -> Self {
        Self::with_config(QueueConfig::default())
    }

    pub fn with_config(config: QueueConfig) -> Self {
        Self {
            pending: VecDeque::new(),
            in_process: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &QueueConfig {
        &self.config
    }

    /// Is this id checked out for processing?
    pub fn is_processing(&self, id: impl Into<ItemId>) -> bool {
        self.in_process.contains_key(&id.into())
    }

    /// Add or refresh an item in the pending sequence.
    ///
    /// Returns `Ok(false)` without touching anything if the id is currently
    /// in process. Otherwise any pending entry with the same id is replaced:
    /// in place when `emplace` is set (new ids go to the tail), or by moving
    /// the new item to the head when it is not.
    ///
    /// # Errors
    /// `Error::Validation` for an empty string id, `Error::Capacity` when the
    /// pending sequence is at `max_size`. Neither mutates the queue.
    pub fn queue_item(&mut self, item: T) -> Result<bool> {
        let id = item.id();

        if let Err(e) = id.validate() {
            warn!(%id, "rejected queue item: {e}");
            record_queued("invalid");
            return Err(e);
        }

        // Checked before dedup, so refreshing a pending id also needs room.
        if let Some(max_size) = self.config.max_size
            && self.pending.len() >= max_size
        {
            warn!(%id, max_size, "rejected queue item: queue full");
            record_queued("full");
            return Err(Error::Capacity { max_size });
        }

        if self.in_process.contains_key(&id) {
            warn!(%id, "rejected queue item: already in process");
            record_queued("in_process");
            return Ok(false);
        }

        let existing = self.position(&id);

        if self.config.emplace {
            match existing {
                Some(idx) => {
                    self.pending[idx] = item;
                    debug!(%id, position = idx, "replaced pending item in place");
                }
                None => {
                    self.pending.push_back(item);
                    debug!(%id, "queued item at tail");
                }
            }
        } else {
            if let Some(idx) = existing {
                self.pending.remove(idx);
                debug!(%id, from = idx, "moved pending item to head");
            } else {
                debug!(%id, "queued item at head");
            }
            self.pending.push_front(item);
        }

        record_queued("ok");
        Ok(true)
    }

    /// Claim the head of the pending sequence. Returns None if it is empty.
    pub fn next_item(&mut self) -> Option<T> {
        let item = self.pending.pop_front()?;
        let id = item.id();
        debug!(%id, "claimed item");

        // Overwriting a stale entry for the same id is fine.
        self.in_process.insert(id, item.clone());

        metrics::items_claimed().add(1, &[KeyValue::new("operation", "next")]);
        Some(item)
    }

    /// Claim up to `batch_size` items from the head, in serve order.
    ///
    /// Returns fewer items (possibly none) when less are pending.
    pub fn process_batch(&mut self, batch_size: usize) -> Vec<T> {
        let n = batch_size.min(self.pending.len());
        let batch: Vec<T> = self.pending.drain(..n).collect();

        for item in &batch {
            self.in_process.insert(item.id(), item.clone());
        }

        if !batch.is_empty() {
            debug!(requested = batch_size, claimed = batch.len(), "claimed batch");
            metrics::items_claimed().add(
                batch.len() as u64,
                &[KeyValue::new("operation", "batch")],
            );
            metrics::batch_size().record(batch.len() as u64, &[]);
        }

        batch
    }

    /// Snapshot of the pending sequence in serve order.
    ///
    /// With `processing` set, every pending item is claimed instead and the
    /// pending sequence is left empty.
    pub fn get_queue(&mut self, processing: bool) -> Vec<T> {
        if processing {
            return self.process_batch(self.pending.len());
        }

        self.pending.iter().cloned().collect()
    }

    /// Drop a pending item without processing it.
    ///
    /// Returns false if no pending item has this id. In-process items are
    /// left alone.
    pub fn remove_from_queue(&mut self, id: impl Into<ItemId>) -> bool {
        let id = id.into();
        match self.position(&id) {
            Some(idx) => {
                self.pending.remove(idx);
                debug!(%id, "removed pending item");
                true
            }
            None => false,
        }
    }

    /// Release one in-process item so its id can be queued again.
    ///
    /// Releasing an id that is not in process is a no-op.
    pub fn done_processing(&mut self, id: impl Into<ItemId>) {
        let id = id.into();
        if self.in_process.remove(&id).is_some() {
            debug!(%id, "item done");
            metrics::items_done().add(1, &[]);
        }
    }

    /// Release every in-process item.
    pub fn done_all(&mut self) {
        let released = self.in_process.len();
        self.in_process.clear();
        if released > 0 {
            debug!(released, "all in-process items done");
            metrics::items_done().add(released as u64, &[]);
        }
    }

    /// Number of pending items. In-process items are not counted.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Pending count, optionally filtered to items whose `prop` equals `val`.
    ///
    /// The filter applies only when both `prop` and `val` are given and the
    /// head item has `prop` at all. If the head lacks `prop`, the unfiltered
    /// count is returned even when later items carry it. See
    /// [`ProcessQueue::count_where`] for a filter that checks every item.
    pub fn length(&self, prop: Option<&str>, val: Option<&Value>) -> usize {
        let Some(first) = self.pending.front() else {
            return 0;
        };

        match (prop, val) {
            (Some(prop), Some(val)) if first.field(prop).is_some() => self.count_where(prop, val),
            (Some(prop), Some(_)) => {
                debug!(prop, "head item has no such field, count is unfiltered");
                self.pending.len()
            }
            _ => self.pending.len(),
        }
    }

    /// Count pending items whose `prop` strictly equals `val`.
    ///
    /// Items without `prop` never match. Scalars compare by value (numbers
    /// numerically, so `10` equals `10.0`); arrays and objects never match.
    pub fn count_where(&self, prop: &str, val: &Value) -> usize {
        self.pending
            .iter()
            .filter(|item| item.field(prop).is_some_and(|v| strict_eq(&v, val)))
            .count()
    }

    /// Empty both the pending sequence and the in-process set.
    pub fn clear(&mut self) {
        debug!(
            pending = self.pending.len(),
            in_process = self.in_process.len(),
            "cleared queue"
        );
        self.pending.clear();
        self.in_process.clear();
    }

    /// No pending items? In-process items are not considered.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Is anything checked out?
    pub fn busy(&self) -> bool {
        !self.in_process.is_empty()
    }

    pub fn process_size(&self) -> usize {
        self.in_process.len()
    }

    /// Is this id in the pending sequence?
    pub fn contains(&self, id: impl Into<ItemId>) -> bool {
        self.position(&id.into()).is_some()
    }

    /// Where an id currently sits, if anywhere.
    pub fn state_of(&self, id: impl Into<ItemId>) -> Option<ItemState> {
        let id = id.into();
        if self.in_process.contains_key(&id) {
            Some(ItemState::InProcess)
        } else if self.position(&id).is_some() {
            Some(ItemState::Pending)
        } else {
            None
        }
    }

    /// The item `next_item` would claim, without claiming it.
    pub fn peek(&self) -> Option<&T> {
        self.pending.front()
    }

    /// Copies of every in-process item, in no particular order.
    pub fn in_process(&self) -> Vec<T> {
        self.in_process.values().cloned().collect()
    }

    fn position(&self, id: &ItemId) -> Option<usize> {
        self.pending.iter().position(|item| item.id() == *id)
    }
}

fn record_queued(result: &'static str) {
    metrics::items_queued().add(1, &[KeyValue::new("result", result)]);
}

/// Equality for filter values: scalars by value, composites never.
fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strict_eq_compares_numbers_numerically() {
        assert!(strict_eq(&json!(10), &json!(10.0)));
        assert!(strict_eq(&json!(-3), &json!(-3)));
        assert!(!strict_eq(&json!(10), &json!("10")));
    }

    #[test]
    fn strict_eq_never_matches_composites() {
        assert!(!strict_eq(&json!([1, 2]), &json!([1, 2])));
        assert!(!strict_eq(&json!({"a": 1}), &json!({"a": 1})));
        assert!(strict_eq(&json!(null), &json!(null)));
    }
}
