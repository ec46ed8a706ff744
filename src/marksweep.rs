//! # MarkSweep
//!
//! Tenured space collector. Every tenured object is threaded on an intrusive
//! singly linked list (`first` → `next` → … → `last`) in allocation order; the
//! list only serves as the sweep order and is independent of the root set.
//!
//! A cycle marks everything reachable from the roots by following `child`,
//! then walks the list, clearing marks on survivors and unlinking and
//! destroying everything else.
//!
//! The object graph must be acyclic. Marking stops at already marked objects,
//! so a cycle would not hang, but the allocator never creates one.

use crate::{
    arena::Arena,
    error::{GcError, Result},
    object::{Generation, Object, ObjectRef},
};

/// Outcome of one mark-sweep cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MajorCycle {
    pub marked: usize,
    pub swept: usize,
    pub live: usize,
}

pub struct TenuredSpace {
    arena: Arena,
    roots: Vec<ObjectRef>,
    first: Option<ObjectRef>,
    last: Option<ObjectRef>,
    num_objects: usize,
    capacity: usize,
    mark_stack: Vec<ObjectRef>,
    collections: usize,
    swept_total: usize,
    allocated_total: usize,
}

impl TenuredSpace {
    pub fn new(capacity: usize) -> Self {
        Self {
            arena: Arena::with_capacity(Generation::Tenured, capacity),
            roots: Vec::new(),
            first: None,
            last: None,
            num_objects: 0,
            capacity,
            mark_stack: Vec::new(),
            collections: 0,
            swept_total: 0,
            allocated_total: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Live tenured objects.
    pub fn len(&self) -> usize {
        self.num_objects
    }

    pub fn is_empty(&self) -> bool {
        self.num_objects == 0
    }

    pub fn free(&self) -> usize {
        self.capacity - self.num_objects
    }

    pub fn is_full(&self) -> bool {
        self.num_objects >= self.capacity
    }

    pub fn roots(&self) -> &[ObjectRef] {
        &self.roots
    }

    pub fn first(&self) -> Option<ObjectRef> {
        self.first
    }

    pub fn last(&self) -> Option<ObjectRef> {
        self.last
    }

    pub fn get(&self, object: ObjectRef) -> Option<&Object> {
        self.arena.get(object)
    }

    pub fn contains(&self, object: ObjectRef) -> bool {
        self.arena.contains(object)
    }

    pub fn collections(&self) -> usize {
        self.collections
    }

    pub fn swept_total(&self) -> usize {
        self.swept_total
    }

    pub fn allocated_total(&self) -> usize {
        self.allocated_total
    }

    /// Tenured objects in sweep-list order.
    pub fn objects(&self) -> Vec<ObjectRef> {
        let mut objects = Vec::with_capacity(self.num_objects);
        let mut cursor = self.first;
        while let Some(object) = cursor {
            objects.push(object);
            cursor = self.arena.get(object).and_then(|o| o.next);
        }
        objects
    }

    /// Allocates a new tenured root. A full space is collected once before
    /// giving up.
    pub fn allocate(&mut self, description: &str) -> Result<ObjectRef> {
        self.make_room()?;
        let object = self.link(Object::new(description));
        self.roots.push(object);
        Ok(object)
    }

    /// Allocates a new tenured object and stores it as `parent`'s child. The
    /// previous child, if any, is only reachable through other roots from now on.
    pub fn allocate_child(&mut self, description: &str, parent: ObjectRef) -> Result<ObjectRef> {
        self.arena.resolve_mut(parent)?;
        self.make_room()?;
        // The collection in make_room may have swept an unreachable parent.
        self.arena.resolve_mut(parent)?;
        let object = self.link(Object::new(description));
        self.arena.resolve_mut(parent)?.child = Some(object);
        Ok(object)
    }

    /// Runs a collection if fewer than `needed` slots are free. Returns whether
    /// `needed` slots are available afterwards.
    pub fn ensure_free(&mut self, needed: usize) -> bool {
        if self.free() < needed {
            self.collect();
        }
        self.free() >= needed
    }

    /// Adds an existing tenured object to the root set. Returns `false` if it
    /// already is a root.
    pub fn add_root(&mut self, object: ObjectRef) -> Result<bool> {
        self.arena.resolve_mut(object)?;
        if self.roots.contains(&object) {
            return Ok(false);
        }
        self.roots.push(object);
        Ok(true)
    }

    /// Drops `object` from the root set. The object itself stays in the list
    /// until a sweep finds it unmarked.
    pub fn end_lifetime(&mut self, object: ObjectRef) -> bool {
        match self.roots.iter().position(|root| *root == object) {
            Some(pos) => {
                self.roots.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn collect(&mut self) -> MajorCycle {
        let marked = self.mark();
        let swept = self.sweep();
        self.collections += 1;
        self.swept_total += swept;
        debug_assert_eq!(self.num_objects, self.arena.len());
        MajorCycle {
            marked,
            swept,
            live: self.num_objects,
        }
    }

    fn make_room(&mut self) -> Result<()> {
        if self.is_full() {
            self.collect();
        }
        if self.is_full() {
            log::debug!(
                "[gc] tenured space exhausted: {} of {} objects live",
                self.num_objects,
                self.capacity
            );
            return Err(GcError::OutOfMemory {
                generation: Generation::Tenured,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Appends a fresh object to the tail of the sweep list.
    fn link(&mut self, object: Object) -> ObjectRef {
        let object = self.arena.insert(object);
        match self.last.and_then(|last| self.arena.get_mut(last)) {
            Some(last) => last.next = Some(object),
            None => self.first = Some(object),
        }
        self.last = Some(object);
        self.num_objects += 1;
        self.allocated_total += 1;
        object
    }

    fn mark(&mut self) -> usize {
        let mut marked = 0;
        self.mark_stack.extend(self.roots.iter().copied());
        while let Some(object) = self.mark_stack.pop() {
            if let Some(object) = self.arena.get_mut(object) {
                if object.header.set_marked() {
                    marked += 1;
                    if let Some(child) = object.child {
                        self.mark_stack.push(child);
                    }
                }
            }
        }
        marked
    }

    fn sweep(&mut self) -> usize {
        let mut swept = 0;
        let mut prev: Option<ObjectRef> = None;
        let mut cursor = self.first;
        while let Some(current) = cursor {
            let (marked, next) = match self.arena.get_mut(current) {
                Some(object) => {
                    let marked = object.header.is_marked();
                    object.header.clear_marked();
                    (marked, object.next)
                }
                None => {
                    debug_assert!(false, "sweep list points at a dead object");
                    break;
                }
            };
            if marked {
                prev = Some(current);
                cursor = next;
                continue;
            }

            match prev.and_then(|prev| self.arena.get_mut(prev)) {
                // interior or tail node
                Some(prev) => prev.next = next,
                // head node
                None => self.first = next,
            }
            if next.is_none() {
                self.last = prev;
            }
            self.arena.remove(current);
            self.num_objects -= 1;
            swept += 1;
            cursor = next;
        }
        swept
    }
}
