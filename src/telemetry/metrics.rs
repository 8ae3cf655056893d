//! Metric instrument factories for process-queue.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! Without a registered provider every instrument is a no-op.

use opentelemetry::metrics::{Counter, Histogram, Meter};

fn meter() -> Meter {
    opentelemetry::global::meter("process-queue")
}

/// Counter: queue_item calls.
/// Labels: `result` ("ok" | "in_process" | "invalid" | "full").
pub fn items_queued() -> Counter<u64> {
    meter()
        .u64_counter("process_queue.items.queued")
        .with_description("Number of queue_item calls by outcome")
        .build()
}

/// Counter: items moved from pending to in-process.
/// Labels: `operation` ("next" | "batch").
pub fn items_claimed() -> Counter<u64> {
    meter()
        .u64_counter("process_queue.items.claimed")
        .with_description("Number of items claimed for processing")
        .build()
}

/// Counter: items released from the in-process mapping.
pub fn items_done() -> Counter<u64> {
    meter()
        .u64_counter("process_queue.items.done")
        .with_description("Number of items marked done")
        .build()
}

/// Histogram: items returned per batch claim.
pub fn batch_size() -> Histogram<u64> {
    meter()
        .u64_histogram("process_queue.batch.size")
        .with_description("Items returned per batch claim")
        .build()
}
