//! Id generation for nodes created through the details form.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How new node ids are produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Random UUID v4
    #[default]
    Uuid,
    /// Process-local counter, deterministic across runs
    Sequence,
}

pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// `<prefix>-<uuid v4>`
#[derive(Debug, Clone)]
pub struct UuidGenerator {
    prefix: String,
}

impl UuidGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        format!("{}-{}", self.prefix, Uuid::new_v4())
    }
}

/// `<prefix>-<n>` with `n` starting at 1.
#[derive(Debug)]
pub struct SequenceGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequenceGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self::starting_at(prefix, 1)
    }

    pub fn starting_at(prefix: impl Into<String>, start: u64) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(start),
        }
    }
}

impl IdGenerator for SequenceGenerator {
    fn next_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}

/// Build the generator selected by `strategy`.
pub fn generator_for(strategy: IdStrategy, prefix: &str) -> Arc<dyn IdGenerator> {
    match strategy {
        IdStrategy::Uuid => Arc::new(UuidGenerator::new(prefix)),
        IdStrategy::Sequence => Arc::new(SequenceGenerator::new(prefix)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn given_rapid_calls_when_generating_uuids_then_ids_are_distinct() {
        let ids = UuidGenerator::new("new");
        let generated: HashSet<String> = (0..1000).map(|_| ids.next_id()).collect();
        assert_eq!(generated.len(), 1000);
        assert!(generated.iter().all(|id| id.starts_with("new-")));
    }

    #[test]
    fn given_sequence_when_generating_then_counts_up() {
        let ids = SequenceGenerator::new("node");
        assert_eq!(ids.next_id(), "node-1");
        assert_eq!(ids.next_id(), "node-2");
    }
}
