use std::collections::HashMap;
use std::time::Instant;

use crate::{
    error::{GcError, Result},
    marksweep::{MajorCycle, TenuredSpace},
    object::{Generation, Object, ObjectRef},
    promotion::PromotionController,
    semispace::{MinorCycle, YoungSpace},
    statistics::{HeapStatistics, MemoryUsage, SpaceUsage},
    Config,
};

/// Generational collector. This GC divides the heap into two generations: young and tenured.
///
/// ## Young
///
/// Pair of semispaces collected by copying. Every allocation starts here. A
/// cycle ages each root by one; roots older than the promotion threshold are
/// promoted, the chains of all other roots are copied to the other semispace
/// and everything left behind is reclaimed.
///
/// ## Tenured
///
/// Linked list of promoted objects collected by mark & sweep.
///
/// # Collection
///
/// [`Generational::trigger_collection`] runs a young cycle whenever the young
/// space holds any object and a tenured cycle only when it is empty. The
/// tenured space is otherwise only collected when one of its own allocations
/// finds it full, so dead tenured roots can keep it occupied for as long as
/// young objects exist.
///
/// # Handles
///
/// Promotion rebuilds objects in the tenured space, so the young handles of a
/// promoted chain go stale. The collector remembers where each promoted
/// object went, and every operation taking an [`ObjectRef`] follows that
/// forwarding first (see [`Generational::resolve`]).
pub struct Generational {
    config: Config,
    young: YoungSpace,
    tenured: TenuredSpace,
    forwarding: HashMap<ObjectRef, ObjectRef>,
    promoted_roots: usize,
    promoted_objects: usize,
    promotion_failures: usize,
    allocation_failures: usize,
}

impl Generational {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: Config) -> Self {
        Self {
            young: YoungSpace::new(config.young_capacity),
            tenured: TenuredSpace::new(config.tenured_capacity),
            config,
            forwarding: HashMap::new(),
            promoted_roots: 0,
            promoted_objects: 0,
            promotion_failures: 0,
            allocation_failures: 0,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn young(&self) -> &YoungSpace {
        &self.young
    }

    pub fn tenured(&self) -> &TenuredSpace {
        &self.tenured
    }

    /// Allocates a new young root.
    ///
    /// A full young space is collected up to `promotion_threshold` times,
    /// giving aged roots the chance to be promoted out of it, before
    /// `OutOfMemory` is reported.
    pub fn allocate(&mut self, description: &str) -> Result<ObjectRef> {
        self.make_young_room();
        let result = self.young.allocate(description);
        self.note_failure(&result);
        result
    }

    /// Allocates a new object as `parent`'s child, in `parent`'s generation.
    ///
    /// `parent` may be a handle to a young object that has since been
    /// promoted; the child then goes to the promoted object in the tenured
    /// space. A parent that no longer exists is `InvalidArgument`.
    pub fn allocate_child(&mut self, description: &str, parent: ObjectRef) -> Result<ObjectRef> {
        let mut parent = self.resolve(parent)?;
        if parent.is_young() {
            self.make_young_room();
            // collecting may have promoted or reclaimed the parent
            parent = self.resolve(parent)?;
        }
        let result = match parent.generation() {
            Generation::Young => self.young.allocate_child(description, parent),
            Generation::Tenured => {
                let tenured_cycles = self.tenured.collections();
                let result = self.tenured.allocate_child(description, parent);
                if self.tenured.collections() != tenured_cycles {
                    self.prune_forwarding();
                }
                result
            }
        };
        self.note_failure(&result);
        result
    }

    /// Makes an existing object a root of its generation. Returns `false` if
    /// it already was one.
    pub fn add_root(&mut self, object: ObjectRef) -> Result<bool> {
        let object = self.resolve(object)?;
        match object.generation() {
            Generation::Young => self.young.add_root(object),
            Generation::Tenured => self.tenured.add_root(object),
        }
    }

    /// Removes `object` from the young root set, or failing that from the
    /// tenured one. The object is reclaimed by whichever cycle next finds it
    /// unreachable. Returns whether a root was removed.
    pub fn end_lifetime(&mut self, object: ObjectRef) -> bool {
        let object = match self.resolve(object) {
            Ok(object) => object,
            Err(_) => return false,
        };
        self.young.end_lifetime(object) || self.tenured.end_lifetime(object)
    }

    /// Collects the young space if it holds any object, the tenured space otherwise.
    pub fn trigger_collection(&mut self) {
        if !self.young.is_empty() {
            self.minor_collection();
        } else {
            self.major_collection();
        }
    }

    /// Runs one young copying cycle, promoting aged roots.
    pub fn minor_collection(&mut self) -> MinorCycle {
        let time = if self.config.verbose {
            Some(Instant::now())
        } else {
            None
        };
        let tenured_before = self.tenured.len();
        let tenured_cycles = self.tenured.collections();

        let mut promoter =
            PromotionController::new(self.config.promotion_threshold, &mut self.tenured);
        let cycle = self.young.collect(&mut promoter);
        self.promoted_roots += promoter.promoted_roots();
        self.promoted_objects += promoter.promoted_objects();
        self.promotion_failures += promoter.failures();
        if self.tenured.collections() != tenured_cycles {
            self.prune_forwarding();
        }
        self.forwarding.extend(cycle.forwarded.iter().copied());

        if let Some(time) = time {
            log::info!(
                "[gc] GC({}) Pause Young promoted {} (tenured: {}->{}) survivors {} reclaimed {} {:.4}ms",
                self.total_gcs(),
                cycle.promoted,
                tenured_before,
                self.tenured.len(),
                cycle.survivors,
                cycle.reclaimed,
                time.elapsed().as_micros() as f64 / 1000.0
            );
        }
        cycle
    }

    /// Runs one tenured mark-sweep cycle.
    pub fn major_collection(&mut self) -> MajorCycle {
        let time = if self.config.verbose {
            Some(Instant::now())
        } else {
            None
        };
        let prev = self.tenured.len();
        let cycle = self.tenured.collect();
        self.prune_forwarding();

        if let Some(time) = time {
            log::info!(
                "[gc] GC({}) Pause Old {}->{} swept {} {:.4}ms",
                self.total_gcs(),
                prev,
                cycle.live,
                cycle.swept,
                time.elapsed().as_micros() as f64 / 1000.0
            );
        }
        cycle
    }

    /// Current handle for `object`: the handle itself while it is live,
    /// otherwise the tenured object it was promoted to.
    pub fn resolve(&self, object: ObjectRef) -> Result<ObjectRef> {
        if self.is_live(object) {
            return Ok(object);
        }
        match self.forwarding.get(&object) {
            Some(&target) if self.is_live(target) => Ok(target),
            _ => Err(GcError::InvalidArgument(format!(
                "{:?} does not refer to a live object",
                object
            ))),
        }
    }

    pub fn memory_usage(&self) -> MemoryUsage {
        MemoryUsage::new(
            SpaceUsage::new(self.young.len(), self.young.capacity()),
            SpaceUsage::new(self.tenured.len(), self.tenured.capacity()),
        )
    }

    pub fn statistics(&self) -> HeapStatistics {
        HeapStatistics {
            young_collections: self.young.collections(),
            tenured_collections: self.tenured.collections(),
            promoted_roots: self.promoted_roots,
            promoted_objects: self.promoted_objects,
            promotion_failures: self.promotion_failures,
            young_reclaimed: self.young.reclaimed_total(),
            tenured_swept: self.tenured.swept_total(),
            young_allocated: self.young.allocated_total(),
            tenured_allocated: self.tenured.allocated_total(),
            allocation_failures: self.allocation_failures,
        }
    }

    pub fn young_roots(&self) -> &[ObjectRef] {
        self.young.roots()
    }

    pub fn tenured_roots(&self) -> &[ObjectRef] {
        self.tenured.roots()
    }

    /// Active young semispace, in order.
    pub fn young_objects(&self) -> &[ObjectRef] {
        self.young.objects()
    }

    /// Tenured objects in sweep-list order.
    pub fn tenured_objects(&self) -> Vec<ObjectRef> {
        self.tenured.objects()
    }

    /// Looks the handle up without following promotions.
    pub fn object(&self, object: ObjectRef) -> Option<&Object> {
        match object.generation() {
            Generation::Young => self.young.get(object),
            Generation::Tenured => self.tenured.get(object),
        }
    }

    pub fn is_live(&self, object: ObjectRef) -> bool {
        self.object(object).is_some()
    }

    /// Whether the object (after following promotions) lives in the young space.
    pub fn is_young(&self, object: ObjectRef) -> bool {
        self.resolve(object).map_or(false, ObjectRef::is_young)
    }

    pub fn age(&self, object: ObjectRef) -> Option<u32> {
        self.lookup(object).map(Object::age)
    }

    pub fn child(&self, object: ObjectRef) -> Option<ObjectRef> {
        self.lookup(object).and_then(Object::child)
    }

    pub fn description(&self, object: ObjectRef) -> Option<&str> {
        self.lookup(object).map(Object::description)
    }

    /// `object` followed by every descendant reachable through `child`.
    /// Empty if the object does not exist.
    pub fn chain(&self, object: ObjectRef) -> Vec<ObjectRef> {
        let mut chain = Vec::new();
        let mut cursor = self.resolve(object).ok();
        while let Some(current) = cursor {
            let object = match self.object(current) {
                Some(object) => object,
                None => break,
            };
            chain.push(current);
            cursor = object.child();
        }
        chain
    }

    fn lookup(&self, object: ObjectRef) -> Option<&Object> {
        self.resolve(object)
            .ok()
            .and_then(|object| self.object(object))
    }

    /// Forgets promotions whose tenured target has been swept.
    fn prune_forwarding(&mut self) {
        let tenured = &self.tenured;
        self.forwarding.retain(|_, target| tenured.contains(*target));
    }

    fn make_young_room(&mut self) {
        let mut attempts = 0;
        while self.young.is_full() && attempts < self.config.promotion_threshold {
            self.trigger_collection();
            attempts += 1;
        }
    }

    fn note_failure<T>(&mut self, result: &Result<T>) {
        if let Err(err) = result {
            if err.is_out_of_memory() {
                self.allocation_failures += 1;
                log::debug!("[gc] allocation failed: {}", err);
            }
        }
    }

    fn total_gcs(&self) -> usize {
        self.young.collections() + self.tenured.collections()
    }
}

impl Default for Generational {
    fn default() -> Self {
        Self::with_config(Config::default())
    }
}
