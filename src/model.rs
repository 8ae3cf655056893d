//! Core data model.
//!
//! An item is anything that carries an identifier. Identity is the id alone;
//! two items with the same id are the same logical item whatever else they hold.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Item ID
// ---------------------------------------------------------------------------

/// Identifier of a queued item: a string or a number.
///
/// Numbers compare with same-value-zero semantics, so `-0.0` equals `0.0`
/// and `NaN` equals `NaN`. `Hash` agrees with that equality. This holds for
/// pending lookups too, so queueing a NaN id twice keeps a single entry
/// rather than two.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Str(String),
    Num(f64),
}

impl ItemId {
    /// Check that this id may be queued. Empty strings are rejected;
    /// every number is accepted.
    pub fn validate(&self) -> Result<()> {
        match self {
            ItemId::Str(s) if s.is_empty() => Err(Error::Validation(
                "id must be a non-empty string or a number".to_string(),
            )),
            _ => Ok(()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ItemId::Str(s) => Some(s),
            ItemId::Num(_) => None,
        }
    }
}

/// Canonical bit pattern for a numeric id.
fn num_key(n: f64) -> u64 {
    if n.is_nan() {
        f64::NAN.to_bits()
    } else if n == 0.0 {
        0
    } else {
        n.to_bits()
    }
}

impl PartialEq for ItemId {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ItemId::Str(a), ItemId::Str(b)) => a == b,
            (ItemId::Num(a), ItemId::Num(b)) => num_key(*a) == num_key(*b),
            _ => false,
        }
    }
}

impl Eq for ItemId {}

impl Hash for ItemId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            ItemId::Str(s) => {
                0u8.hash(state);
                s.hash(state);
            }
            ItemId::Num(n) => {
                1u8.hash(state);
                num_key(*n).hash(state);
            }
        }
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemId::Str(s) => write!(f, "{s}"),
            ItemId::Num(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId::Str(s.to_string())
    }
}

impl From<&String> for ItemId {
    fn from(s: &String) -> Self {
        ItemId::Str(s.clone())
    }
}

impl From<&ItemId> for ItemId {
    fn from(id: &ItemId) -> Self {
        id.clone()
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        ItemId::Str(s)
    }
}

impl From<f64> for ItemId {
    fn from(n: f64) -> Self {
        ItemId::Num(n)
    }
}

impl From<i32> for ItemId {
    fn from(n: i32) -> Self {
        ItemId::Num(f64::from(n))
    }
}

impl From<i64> for ItemId {
    fn from(n: i64) -> Self {
        ItemId::Num(n as f64)
    }
}

impl From<u64> for ItemId {
    fn from(n: u64) -> Self {
        ItemId::Num(n as f64)
    }
}

// ---------------------------------------------------------------------------
// Queue Item
// ---------------------------------------------------------------------------

/// Capability every queued item provides: a readable id.
///
/// `field` exposes named members for the filtered counts.
///
/// **The default `field` reports every field as absent.** An item type that
/// keeps it never matches `count_where`, and `ProcessQueue::length` with a
/// filter falls back to the unfiltered count. Types that derive `Serialize`
/// can override it with [`field_via_serde`].
pub trait QueueItem {
    fn id(&self) -> ItemId;

    fn field(&self, _name: &str) -> Option<Value> {
        None
    }
}

/// Read a top-level member of any serializable item.
///
/// Handy for `QueueItem::field` on plain `#[derive(Serialize)]` structs.
pub fn field_via_serde<T: Serialize>(item: &T, name: &str) -> Option<Value> {
    match serde_json::to_value(item).ok()? {
        Value::Object(mut map) => map.remove(name),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// An open-shaped item: an id plus arbitrary named fields.
///
/// `fields` never holds an `"id"` entry; the id lives only in `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: ItemId,

    /// Everything besides the id. Opaque to the queue except for filtering.
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl Record {
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Set a field. `"id"` replaces the id itself when the value is a
    /// string or number, and is ignored otherwise.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        if name == "id" {
            if let Ok(id) = serde_json::from_value::<ItemId>(value) {
                self.id = id;
            }
            return self;
        }
        self.fields.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Every field besides the id.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Remove a field, returning its value. The id cannot be removed.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }
}

impl QueueItem for Record {
    fn id(&self) -> ItemId {
        self.id.clone()
    }

    fn field(&self, name: &str) -> Option<Value> {
        if name == "id" {
            return serde_json::to_value(&self.id).ok();
        }
        self.fields.get(name).cloned()
    }
}

// ---------------------------------------------------------------------------
// Item State
// ---------------------------------------------------------------------------

/// Where a known item currently sits.
///
/// Absent items have no state. An item enters as `Pending`, may be claimed
/// into `InProcess`, and leaves from either state; it never goes back from
/// `InProcess` to `Pending` without first leaving the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemState {
    /// Queued, waiting to be claimed.
    Pending,
    /// Claimed for processing, not yet done.
    InProcess,
}

impl ItemState {
    /// Can transition from self to `to`?
    pub fn can_transition_to(self, to: ItemState) -> bool {
        matches!((self, to), (ItemState::Pending, ItemState::InProcess))
    }
}

impl std::fmt::Display for ItemState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ItemState::Pending => "pending",
            ItemState::InProcess => "in_process",
        };
        write!(f, "{s}")
    }
}
