//! # process-queue
//!
//! In-process staging for uniquely identified work items.
//!
//! Callers queue items, claim them one at a time or in batches, and mark
//! them done. While an id is claimed it cannot be queued again. The queue
//! tracks membership only; it never processes anything itself.

pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod queue;
pub mod shared;
pub mod telemetry;

pub use config::QueueConfig;
pub use error::{Error, Result};
pub use model::{ItemId, ItemState, QueueItem, Record};
pub use queue::ProcessQueue;
pub use shared::SharedQueue;
