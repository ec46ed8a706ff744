//! # Hybrid
//!
//! Simulation of a two-generation garbage collector over a graph of chained
//! objects. New objects are allocated in a young space collected by copying;
//! roots that survive enough young cycles are promoted into a tenured space
//! collected by mark & sweep.
//!
//! - [Young space](semispace): two semispaces, copy reachable chains, swap.
//! - [Tenured space](marksweep): intrusive object list, mark from roots, sweep.
//! - [Promotion](promotion): rebuilds an aged root's chain in the tenured space.
//! - [Generational](generational): the single entry point for allocation,
//!   root tracking, collection and memory usage queries.
//!
//! Objects are identified by [`ObjectRef`] handles. Each object has at most one
//! child, and the graph is acyclic by construction.
//!
//! ```
//! use hybrid::{Config, Generational};
//!
//! let mut heap = Generational::new(Config::default().with_young_capacity(8)).unwrap();
//! let root = heap.allocate("root").unwrap();
//! heap.allocate_child("leaf", root).unwrap();
//! heap.trigger_collection();
//! assert_eq!(heap.age(root), Some(1));
//! assert_eq!(heap.memory_usage().young.used, 2);
//! ```

pub mod arena;
pub mod error;
pub mod generational;
pub mod header;
pub mod marksweep;
pub mod object;
pub mod promotion;
pub mod semispace;
pub mod shared;
pub mod statistics;


pub use error::{GcError, Result};
pub use generational::Generational;
pub use object::{Generation, Object, ObjectRef};
pub use shared::SharedHeap;
pub use statistics::{HeapStatistics, MemoryUsage, SpaceUsage};

use header::MAX_AGE;

/// Configuration for heap constructor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of live tenured objects.
    pub tenured_capacity: usize,
    /// Maximum number of objects in the active young semispace.
    pub young_capacity: usize,
    /// A young root is promoted once its age exceeds this many cycles. Also
    /// bounds how many collections a full young space runs before reporting
    /// out of memory.
    pub promotion_threshold: u32,
    /// Log a summary line for every collection cycle.
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tenured_capacity: 100,
            young_capacity: 100,
            promotion_threshold: 3,
            verbose: false,
        }
    }
}

impl Config {
    pub fn new(tenured_capacity: usize, young_capacity: usize, promotion_threshold: u32) -> Self {
        Self {
            tenured_capacity,
            young_capacity,
            promotion_threshold,
            verbose: false,
        }
    }

    pub fn with_tenured_capacity(mut self, capacity: usize) -> Self {
        self.tenured_capacity = capacity;
        self
    }

    pub fn with_young_capacity(mut self, capacity: usize) -> Self {
        self.young_capacity = capacity;
        self
    }

    pub fn with_promotion_threshold(mut self, threshold: u32) -> Self {
        self.promotion_threshold = threshold;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Checks that every tunable is positive and that the age counter can
    /// still exceed the threshold.
    pub fn validate(&self) -> Result<()> {
        if self.tenured_capacity == 0 {
            return Err(GcError::InvalidConfig(
                "tenured capacity must be positive".to_string(),
            ));
        }
        if self.young_capacity == 0 {
            return Err(GcError::InvalidConfig(
                "young capacity must be positive".to_string(),
            ));
        }
        if self.promotion_threshold == 0 || self.promotion_threshold >= MAX_AGE {
            return Err(GcError::InvalidConfig(format!(
                "promotion threshold must be in 1..{}, got {}",
                MAX_AGE, self.promotion_threshold
            )));
        }
        Ok(())
    }
}
