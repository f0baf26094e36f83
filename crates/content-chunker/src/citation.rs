//! Citation identifiers for emitted chunks.
//!
//! Every chunk gets an opaque id so later consumers can say "which chunk"
//! without re-sending its content. Generation sits behind [`IdGenerator`] so
//! tests and reproducible pipelines can swap random UUIDs for a counter.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Source of unique chunk identifiers
pub trait IdGenerator: Send + Sync + fmt::Debug {
    /// Produce a fresh identifier
    fn next_id(&self) -> String;
}

/// Random UUID v4 identifiers
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic `prefix-N` identifiers, counting from zero
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: AtomicU64::new(0),
        }
    }

    /// Number of ids handed out so far
    #[must_use]
    pub fn issued(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("chunk")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}-{n}", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_uuid_ids_are_unique() {
        let ids = UuidIds;
        let seen: HashSet<String> = (0..100).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 100);
        assert!(seen.iter().all(|id| Uuid::parse_str(id).is_ok()));
    }

    #[test]
    fn test_sequential_ids_count_up() {
        let ids = SequentialIds::new("cite");
        assert_eq!(ids.next_id(), "cite-0");
        assert_eq!(ids.next_id(), "cite-1");
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn test_sequential_ids_default_prefix() {
        assert_eq!(SequentialIds::default().next_id(), "chunk-0");
    }
}
