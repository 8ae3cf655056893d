//! Item processing span helpers.
//!
//! For hosts that process claimed items: one span per item, with its
//! state transitions recorded as events on that span.

use tracing::Span;

use crate::model::{ItemId, ItemState};

/// Start a span for processing one claimed item.
///
/// The `item.state` field is declared empty and is filled by
/// [`record_state_transition`].
pub fn start_item_span(worker: &str, id: &ItemId) -> Span {
    tracing::info_span!(
        "item.process",
        "item.worker" = worker,
        "item.id" = %id,
        "item.state" = tracing::field::Empty,
    )
}

/// Record a state transition on the given span.
///
/// `to` is `None` once the item has left the queue entirely.
pub fn record_state_transition(span: &Span, from: ItemState, to: Option<ItemState>) {
    let to = to.map_or_else(|| "done".to_string(), |s| s.to_string());
    span.record("item.state", to.as_str());
    span.in_scope(|| {
        tracing::info!(from = %from, to = %to, "state_transition");
    });
}
