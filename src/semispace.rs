//! # SemiSpace
//!
//! Young space collector. The space is split into two semispaces; all
//! allocations are appended to the active one. A cycle ages every root, hands
//! roots that got too old to the promoter, and copies the chain of every other
//! root into the inactive semispace. Whatever was not copied is reclaimed and
//! the two semispaces swap roles.
//!
//! Objects are never duplicated by a copy: the semispaces hold handles, so a
//! "copy" re-lists the object in to-space and the object keeps its identity.

use crate::{
    arena::Arena,
    error::{GcError, Result},
    object::{Generation, Object, ObjectRef},
    promotion::{ChainSnapshot, Promote},
};

/// Outcome of one copying cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MinorCycle {
    /// Objects listed in the new active semispace.
    pub survivors: usize,
    /// Objects destroyed because no remaining root reached them.
    pub reclaimed: usize,
    /// Roots handed over to the tenured space.
    pub promoted: usize,
    /// Aged roots that stayed young because the tenured space had no room.
    pub refused: usize,
    /// `(young, tenured)` handle pairs for every promoted object whose young
    /// original was reclaimed by this cycle.
    pub forwarded: Vec<(ObjectRef, ObjectRef)>,
}

pub struct YoungSpace {
    arena: Arena,
    semispaces: [Vec<ObjectRef>; 2],
    active: usize,
    roots: Vec<ObjectRef>,
    capacity: usize,
    collections: usize,
    reclaimed_total: usize,
    allocated_total: usize,
}

impl YoungSpace {
    pub fn new(capacity: usize) -> Self {
        Self {
            arena: Arena::with_capacity(Generation::Young, capacity),
            semispaces: [Vec::with_capacity(capacity), Vec::with_capacity(capacity)],
            active: 0,
            roots: Vec::new(),
            capacity,
            collections: 0,
            reclaimed_total: 0,
            allocated_total: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Objects in the active semispace.
    pub fn len(&self) -> usize {
        self.semispaces[self.active].len()
    }

    pub fn is_empty(&self) -> bool {
        self.semispaces[self.active].is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// Index (0 or 1) of the semispace receiving allocations.
    #[cfg(test)]
    pub(crate) fn active_index(&self) -> usize {
        self.active
    }

    /// Active semispace contents in allocation/copy order.
    pub fn objects(&self) -> &[ObjectRef] {
        &self.semispaces[self.active]
    }

    pub fn roots(&self) -> &[ObjectRef] {
        &self.roots
    }

    pub fn get(&self, object: ObjectRef) -> Option<&Object> {
        self.arena.get(object)
    }

    pub fn contains(&self, object: ObjectRef) -> bool {
        self.arena.contains(object)
    }

    /// Objects the arena still owns. Equals [`YoungSpace::len`] after every cycle.
    pub fn arena_len(&self) -> usize {
        self.arena.len()
    }

    pub fn collections(&self) -> usize {
        self.collections
    }

    pub fn reclaimed_total(&self) -> usize {
        self.reclaimed_total
    }

    pub fn allocated_total(&self) -> usize {
        self.allocated_total
    }

    /// Allocates a new young root. Fails without collecting if the active
    /// semispace is full; retrying after collection is the caller's decision.
    pub fn allocate(&mut self, description: &str) -> Result<ObjectRef> {
        self.check_capacity()?;
        let object = self.push(Object::new(description));
        self.roots.push(object);
        Ok(object)
    }

    /// Allocates a new young object and stores it as `parent`'s child.
    pub fn allocate_child(&mut self, description: &str, parent: ObjectRef) -> Result<ObjectRef> {
        self.arena.resolve_mut(parent)?;
        self.check_capacity()?;
        let object = self.push(Object::new(description));
        self.arena.resolve_mut(parent)?.child = Some(object);
        Ok(object)
    }

    /// Adds an existing young object to the root set. Returns `false` if it
    /// already is a root.
    pub fn add_root(&mut self, object: ObjectRef) -> Result<bool> {
        self.arena.resolve_mut(object)?;
        if self.roots.contains(&object) {
            return Ok(false);
        }
        self.roots.push(object);
        Ok(true)
    }

    /// Drops `object` from the root set. Returns whether it was a root.
    pub fn end_lifetime(&mut self, object: ObjectRef) -> bool {
        match self.roots.iter().position(|root| *root == object) {
            Some(pos) => {
                self.roots.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Runs one copying cycle.
    ///
    /// Roots are processed in root-set order. A promoted root is removed from
    /// the set and the same index is examined again, so the root that shifted
    /// into its place is not skipped.
    pub fn collect<P: Promote>(&mut self, promoter: &mut P) -> MinorCycle {
        let from = self.active;
        let to = 1 - from;
        debug_assert!(self.semispaces[to].is_empty());
        let mut cycle = MinorCycle::default();

        let mut i = 0;
        while i < self.roots.len() {
            let root = self.roots[i];
            let age = match self.arena.get_mut(root) {
                Some(object) => object.header.increment_age(),
                None => {
                    self.roots.remove(i);
                    continue;
                }
            };

            if promoter.should_promote(age) {
                let chain = self.snapshot(root);
                if let Some(promoted) = promoter.promote(&chain) {
                    self.roots.remove(i);
                    cycle.promoted += 1;
                    cycle.forwarded.extend(chain.members().zip(promoted));
                    continue;
                }
                cycle.refused += 1;
            }

            self.copy_chain(root, to);
            i += 1;
        }

        for object in std::mem::take(&mut self.semispaces[from]) {
            let copied = match self.arena.get_mut(object) {
                Some(object) => {
                    let copied = object.header.is_marked();
                    object.header.clear_marked();
                    copied
                }
                None => continue,
            };
            if !copied {
                self.arena.remove(object);
                cycle.reclaimed += 1;
            }
        }
        self.active = to;
        // promoted objects another root kept alive stay reachable under their young handle
        let arena = &self.arena;
        cycle.forwarded.retain(|(young, _)| !arena.contains(*young));

        cycle.survivors = self.semispaces[to].len();
        self.collections += 1;
        self.reclaimed_total += cycle.reclaimed;
        debug_assert_eq!(self.arena.len(), self.len());
        cycle
    }

    fn check_capacity(&self) -> Result<()> {
        if self.is_full() {
            return Err(GcError::OutOfMemory {
                generation: Generation::Young,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    fn push(&mut self, object: Object) -> ObjectRef {
        let object = self.arena.insert(object);
        self.semispaces[self.active].push(object);
        self.allocated_total += 1;
        object
    }

    /// Lists `root` and its descendants in to-space. The mark bit flags objects
    /// already copied this cycle; reaching one means the rest of its chain was
    /// copied with it.
    fn copy_chain(&mut self, root: ObjectRef, to: usize) {
        let mut cursor = Some(root);
        while let Some(current) = cursor {
            let object = match self.arena.get_mut(current) {
                Some(object) => object,
                None => break,
            };
            if !object.header.set_marked() {
                break;
            }
            cursor = object.child;
            self.semispaces[to].push(current);
        }
    }

    fn snapshot(&self, root: ObjectRef) -> ChainSnapshot {
        let mut chain = ChainSnapshot::default();
        let mut cursor = Some(root);
        while let Some(current) = cursor {
            let object = match self.arena.get(current) {
                Some(object) => object,
                None => break,
            };
            chain.push(current, object.description.clone());
            cursor = object.child;
        }
        chain
    }
}
