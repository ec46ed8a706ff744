use std::fmt;

/// Occupancy of one space, counted in objects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpaceUsage {
    pub used: usize,
    pub free: usize,
    pub capacity: usize,
}

impl SpaceUsage {
    pub fn new(used: usize, capacity: usize) -> Self {
        Self {
            used,
            free: capacity.saturating_sub(used),
            capacity,
        }
    }
}

/// Answer to a memory usage query: the young space (active semispace only),
/// the tenured space, and their sum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryUsage {
    pub young: SpaceUsage,
    pub tenured: SpaceUsage,
    pub total: SpaceUsage,
}

impl MemoryUsage {
    pub fn new(young: SpaceUsage, tenured: SpaceUsage) -> Self {
        Self {
            young,
            tenured,
            total: SpaceUsage::new(young.used + tenured.used, young.capacity + tenured.capacity),
        }
    }
}

impl fmt::Display for SpaceUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Used Memory: {}", self.used)?;
        writeln!(f, "Free Memory: {}", self.free)?;
        write!(f, "------------------")
    }
}

impl fmt::Display for MemoryUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.total)?;
        writeln!(f, "MarkSweep heap:")?;
        writeln!(f, "{}", self.tenured)?;
        writeln!(f, "StopCopy heap:")?;
        write!(f, "{}", self.young)
    }
}

/// Cumulative counters since the collector was created.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeapStatistics {
    pub young_collections: usize,
    pub tenured_collections: usize,
    pub promoted_roots: usize,
    pub promoted_objects: usize,
    pub promotion_failures: usize,
    pub young_reclaimed: usize,
    pub tenured_swept: usize,
    pub young_allocated: usize,
    pub tenured_allocated: usize,
    pub allocation_failures: usize,
}

impl HeapStatistics {
    pub fn total_collections(&self) -> usize {
        self.young_collections + self.tenured_collections
    }
}

impl fmt::Display for HeapStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Heap statistics:")?;
        writeln!(
            f,
            "  GC cycles: {} young, {} tenured",
            self.young_collections, self.tenured_collections
        )?;
        writeln!(
            f,
            "  Promoted: {} roots ({} objects), {} refused",
            self.promoted_roots, self.promoted_objects, self.promotion_failures
        )?;
        writeln!(
            f,
            "  Objects allocated: {} young, {} tenured",
            self.young_allocated, self.tenured_allocated
        )?;
        writeln!(
            f,
            "  Objects reclaimed: {} young, {} tenured",
            self.young_reclaimed, self.tenured_swept
        )?;
        writeln!(f, "  Failed allocations: {}", self.allocation_failures)?;
        Ok(())
    }
}
