//! Shared sort selection.
//!
//! The key and the direction are packed into one byte and swapped as a unit, so
//! the refresh task never observes the key of one intent with the direction of
//! another.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::types::{SortDirection, SortKey, SortSpec};

fn pack(spec: SortSpec) -> u8 {
    let dir = match spec.direction {
        SortDirection::Ascending => 0,
        SortDirection::Descending => 1,
    };
    (spec.key.index() << 1) | dir
}

fn unpack(v: u8) -> SortSpec {
    let key = SortKey::from_index(v >> 1).unwrap_or(SortKey::Cpu);
    let direction = if v & 1 == 0 {
        SortDirection::Ascending
    } else {
        SortDirection::Descending
    };
    SortSpec::new(key, direction)
}

#[derive(Debug, Clone)]
pub struct SortHandle {
    packed: Arc<AtomicU8>,
}

impl SortHandle {
    pub fn new(initial: SortSpec) -> Self {
        Self {
            packed: Arc::new(AtomicU8::new(pack(initial))),
        }
    }

    pub fn get(&self) -> SortSpec {
        unpack(self.packed.load(Ordering::Acquire))
    }

    pub fn set(&self, spec: SortSpec) {
        self.packed.store(pack(spec), Ordering::Release);
    }

    /// Switch to `key` with that key's natural direction.
    pub fn select_key(&self, key: SortKey) -> SortSpec {
        let spec = SortSpec::for_key(key);
        self.set(spec);
        spec
    }

    /// Flip the direction, keeping the key.
    pub fn toggle_direction(&self) -> SortSpec {
        let prev = self.packed.fetch_xor(1, Ordering::AcqRel);
        unpack(prev ^ 1)
    }
}

impl Default for SortHandle {
    fn default() -> Self {
        Self::new(SortSpec::default())
    }
}
