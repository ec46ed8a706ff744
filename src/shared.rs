//! Thread-safe access to one collector instance.
//!
//! The spaces keep invariants across several fields (sweep list links,
//! semispace occupancy, root sets), so the whole collector sits behind a
//! single lock and every operation runs to completion while holding it.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::{
    error::Result, generational::Generational, object::ObjectRef, statistics::MemoryUsage,
    Config, HeapStatistics,
};

#[derive(Clone)]
pub struct SharedHeap {
    heap: Arc<Mutex<Generational>>,
}

impl SharedHeap {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self::from(Generational::new(config)?))
    }

    /// Locks the collector for a sequence of operations that must not
    /// interleave with other threads.
    pub fn lock(&self) -> MutexGuard<'_, Generational> {
        self.heap.lock()
    }

    pub fn allocate(&self, description: &str) -> Result<ObjectRef> {
        self.heap.lock().allocate(description)
    }

    pub fn allocate_child(&self, description: &str, parent: ObjectRef) -> Result<ObjectRef> {
        self.heap.lock().allocate_child(description, parent)
    }

    pub fn add_root(&self, object: ObjectRef) -> Result<bool> {
        self.heap.lock().add_root(object)
    }

    pub fn end_lifetime(&self, object: ObjectRef) -> bool {
        self.heap.lock().end_lifetime(object)
    }

    pub fn trigger_collection(&self) {
        self.heap.lock().trigger_collection()
    }

    pub fn memory_usage(&self) -> MemoryUsage {
        self.heap.lock().memory_usage()
    }

    pub fn statistics(&self) -> HeapStatistics {
        self.heap.lock().statistics()
    }
}

impl From<Generational> for SharedHeap {
    fn from(heap: Generational) -> Self {
        Self {
            heap: Arc::new(Mutex::new(heap)),
        }
    }
}
