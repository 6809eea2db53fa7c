//! The in-memory observation buffer.
//!
//! Keys observations by `(filename, offset)`; each key holds the set of
//! distinct serialised values seen since the last flush, in arrival order.
//! The key count is hard-capped; observations past the cap are dropped
//! (at-most-once delivery already tolerates loss).

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use typetrace_core::model::{BatchRecord, ObservationMetadata, Provenance};

struct PendingEntry {
    metadata: ObservationMetadata,
    seen: HashSet<String>,
    values: Vec<(Value, Option<Provenance>)>,
}

/// Dedup buffer between `twiz` calls and the flush timer.
pub struct ObservationBuffer {
    entries: HashMap<(String, u64), PendingEntry>,
    order: Vec<(String, u64)>,
    max_keys: usize,
    dropped: u64,
}

impl ObservationBuffer {
    pub fn new(max_keys: usize) -> Self {
        Self { entries: HashMap::new(), order: Vec::new(), max_keys, dropped: 0 }
    }

    /// Record one observation. Returns true when this is the first
    /// observation since the buffer was last drained (the caller starts
    /// the flush timer on that transition).
    pub fn record(
        &mut self,
        filename: &str,
        offset: u64,
        surrogate: Value,
        serialised: String,
        provenance: Option<Provenance>,
        metadata: &ObservationMetadata,
    ) -> bool {
        let was_empty = self.entries.is_empty();
        let key = (filename.to_string(), offset);

        if !self.entries.contains_key(&key) {
            if self.entries.len() >= self.max_keys {
                self.dropped += 1;
                return false;
            }
            self.order.push(key.clone());
            self.entries.insert(
                key.clone(),
                PendingEntry {
                    metadata: metadata.clone(),
                    seen: HashSet::new(),
                    values: Vec::new(),
                },
            );
        }

        let entry = self.entries.get_mut(&key).expect("entry just ensured");
        if entry.seen.insert(serialised) {
            entry.values.push((surrogate, provenance));
        }
        was_empty
    }

    /// Drain the buffer into wire records, leaving it empty.
    pub fn take_batch(&mut self) -> Vec<BatchRecord> {
        let mut entries = std::mem::take(&mut self.entries);
        let order = std::mem::take(&mut self.order);

        let mut batch = Vec::with_capacity(order.len());
        for key in order {
            if let Some(entry) = entries.remove(&key) {
                let values = entry
                    .values
                    .into_iter()
                    .map(|(value, provenance)| {
                        typetrace_core::model::ValueEntry(value, provenance)
                    })
                    .collect();
                batch.push(BatchRecord::Positional(key.0, key.1, values, entry.metadata));
            }
        }
        batch
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.dropped = 0;
    }
}
