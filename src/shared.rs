//! Cloneable, lock-guarded handle for hosts that share one queue.
//!
//! Each call is one critical section over the whole queue. Nothing here
//! waits for items to arrive; an empty queue answers immediately.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::config::QueueConfig;
use crate::error::Result;
use crate::model::{ItemId, ItemState, QueueItem};
use crate::queue::ProcessQueue;

/// A [`ProcessQueue`] behind an `Arc<Mutex<_>>`.
#[derive(Debug)]
pub struct SharedQueue<T> {
    inner: Arc<Mutex<ProcessQueue<T>>>,
}

impl<T> Clone for SharedQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: QueueItem + Clone> From<ProcessQueue<T>> for SharedQueue<T> {
    fn from(queue: ProcessQueue<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(queue)),
        }
    }
}

impl<T: QueueItem + Clone> SharedQueue<T> {
    pub fn new(config: QueueConfig) -> Self {
        ProcessQueue::with_config(config).into()
    }

    // Every queue operation leaves both collections consistent before it
    // can panic, so a poisoned lock still guards a valid queue.
    fn lock(&self) -> MutexGuard<'_, ProcessQueue<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run several operations under a single lock acquisition.
    pub fn with<R>(&self, f: impl FnOnce(&mut ProcessQueue<T>) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn queue_item(&self, item: T) -> Result<bool> {
        self.lock().queue_item(item)
    }

    pub fn next_item(&self) -> Option<T> {
        self.lock().next_item()
    }

    pub fn process_batch(&self, batch_size: usize) -> Vec<T> {
        self.lock().process_batch(batch_size)
    }

    pub fn get_queue(&self, processing: bool) -> Vec<T> {
        self.lock().get_queue(processing)
    }

    pub fn remove_from_queue(&self, id: impl Into<ItemId>) -> bool {
        self.lock().remove_from_queue(id)
    }

    pub fn done_processing(&self, id: impl Into<ItemId>) {
        self.lock().done_processing(id)
    }

    pub fn done_all(&self) {
        self.lock().done_all()
    }

    pub fn is_processing(&self, id: impl Into<ItemId>) -> bool {
        self.lock().is_processing(id)
    }

    pub fn state_of(&self, id: impl Into<ItemId>) -> Option<ItemState> {
        self.lock().state_of(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn length(&self, prop: Option<&str>, val: Option<&Value>) -> usize {
        self.lock().length(prop, val)
    }

    pub fn count_where(&self, prop: &str, val: &Value) -> usize {
        self.lock().count_where(prop, val)
    }

    pub fn clear(&self) {
        self.lock().clear()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn busy(&self) -> bool {
        self.lock().busy()
    }

    pub fn process_size(&self) -> usize {
        self.lock().process_size()
    }
}
