//! Weak provenance tracking for composite values.
//!
//! `track` remembers where the instrumenter first saw a composite value;
//! when the same value later arrives as a parameter, the stored
//! `(filename, offset)` pair rides along with the observation. Entries
//! hold only `Weak` references and never keep the tracked object alive.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use typetrace_core::model::Provenance;

use crate::value::{HostValue, SharedArray, SharedObject};

enum WeakComposite {
    Array(Weak<RefCell<Vec<HostValue>>>),
    Object(Weak<RefCell<Vec<(String, HostValue)>>>),
}

impl WeakComposite {
    fn is_alive(&self) -> bool {
        match self {
            WeakComposite::Array(weak) => weak.strong_count() > 0,
            WeakComposite::Object(weak) => weak.strong_count() > 0,
        }
    }
}

struct TrackedOrigin {
    value: WeakComposite,
    filename: String,
    offset: u64,
}

/// Pointer-keyed registry of tracked composites. Thread-local in practice:
/// host values are bound to their event-processing thread.
#[derive(Default)]
pub struct ProvenanceRegistry {
    entries: HashMap<usize, TrackedOrigin>,
}

const PURGE_THRESHOLD: usize = 1024;

impl ProvenanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the origin of a composite value. Non-composites are ignored.
    pub fn track(&mut self, value: &HostValue, filename: &str, offset: u64) {
        let Some(ptr) = value.composite_ptr() else { return };
        let weak = match value {
            HostValue::Array(rc) => WeakComposite::Array(downgrade_array(rc)),
            HostValue::Object(rc) => WeakComposite::Object(downgrade_object(rc)),
            _ => return,
        };
        if self.entries.len() >= PURGE_THRESHOLD {
            self.purge();
        }
        self.entries.insert(
            ptr,
            TrackedOrigin { value: weak, filename: filename.to_string(), offset },
        );
    }

    /// Look up the stored origin of a composite value, if it is still the
    /// same allocation.
    pub fn lookup(&self, value: &HostValue) -> Option<Provenance> {
        let ptr = value.composite_ptr()?;
        let origin = self.entries.get(&ptr)?;
        // A dead weak means the address was recycled by a new allocation.
        if !origin.value.is_alive() {
            return None;
        }
        Some(Provenance(origin.filename.clone(), origin.offset))
    }

    /// Drop entries whose tracked object has been reclaimed.
    pub fn purge(&mut self) {
        self.entries.retain(|_, origin| origin.value.is_alive());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn downgrade_array(rc: &SharedArray) -> Weak<RefCell<Vec<HostValue>>> {
    Rc::downgrade(rc)
}

fn downgrade_object(rc: &SharedObject) -> Weak<RefCell<Vec<(String, HostValue)>>> {
    Rc::downgrade(rc)
}
