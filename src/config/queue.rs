//! Queue construction options.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Pending-sequence cap used when none is configured.
pub const DEFAULT_MAX_SIZE: usize = 1000;

/// Options fixed when a queue is built.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueConfig {
    /// Re-queueing a pending id replaces it in place and new ids go to the
    /// tail. When false, re-queued and new ids both go to the head.
    pub emplace: bool,

    /// Cap on the pending sequence. `None` means unbounded; config files
    /// spell that `max_size = "unbounded"`.
    #[serde(deserialize_with = "deserialize_max_size")]
    pub max_size: Option<usize>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MaxSize {
    Limit(usize),
    Named(String),
}

fn deserialize_max_size<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<usize>, D::Error> {
    match MaxSize::deserialize(deserializer)? {
        MaxSize::Limit(n) => Ok(Some(n)),
        MaxSize::Named(s) if s.eq_ignore_ascii_case("unbounded") => Ok(None),
        MaxSize::Named(s) => Err(D::Error::custom(format!(
            "max_size must be an integer or \"unbounded\", got \"{s}\""
        ))),
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            emplace: false,
            max_size: Some(DEFAULT_MAX_SIZE),
        }
    }
}

impl QueueConfig {
    pub fn emplace(mut self, emplace: bool) -> Self {
        self.emplace = emplace;
        self
    }

    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn unbounded(mut self) -> Self {
        self.max_size = None;
        self
    }
}
