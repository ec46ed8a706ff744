//! # Promotion
//!
//! Moves an aged young root into the tenured space. Promotion never relocates
//! the young objects: it rebuilds the root's chain inside the tenured space,
//! node for node and in the same order, and leaves the young originals to be
//! reclaimed by the copying cycle that asked for the promotion.
//!
//! The young collector talks to the tenured space only through [`Promote`].

use crate::{marksweep::TenuredSpace, object::ObjectRef};

/// Description given to the tenured root that replaces a promoted young root.
pub const MOVED: &str = "moved";

/// Snapshot of a young chain taken at promotion time: the root followed by
/// every descendant reachable through `child`, in chain order.
#[derive(Debug, Clone, Default)]
pub struct ChainSnapshot {
    links: Vec<(ObjectRef, String)>,
}

impl ChainSnapshot {
    pub(crate) fn push(&mut self, object: ObjectRef, description: String) {
        self.links.push((object, description));
    }
    pub(crate) fn root(&self) -> Option<ObjectRef> {
        self.links.first().map(|(object, _)| *object)
    }
    /// Young handles of the chain, root first.
    pub fn members(&self) -> impl Iterator<Item = ObjectRef> + '_ {
        self.links.iter().map(|(object, _)| *object)
    }
    /// Descriptions of the root's descendants, nearest first.
    pub fn descendants(&self) -> impl Iterator<Item = &str> + '_ {
        self.links.iter().skip(1).map(|(_, description)| description.as_str())
    }
    pub fn len(&self) -> usize {
        self.links.len()
    }
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Promotion policy consulted by the young collector for every root it ages.
pub trait Promote {
    /// Returns `true` when a root of the given (already incremented) age must
    /// leave the young space.
    fn should_promote(&self, age: u32) -> bool;

    /// Recreates `chain` in the tenured space. Returns the new tenured handles
    /// in chain order, or `None` if the tenured space cannot take the whole
    /// chain, in which case nothing was allocated.
    fn promote(&mut self, chain: &ChainSnapshot) -> Option<Vec<ObjectRef>>;
}

pub struct PromotionController<'a> {
    threshold: u32,
    tenured: &'a mut TenuredSpace,
    promoted_roots: usize,
    promoted_objects: usize,
    failures: usize,
}

impl<'a> PromotionController<'a> {
    pub fn new(threshold: u32, tenured: &'a mut TenuredSpace) -> Self {
        Self {
            threshold,
            tenured,
            promoted_roots: 0,
            promoted_objects: 0,
            failures: 0,
        }
    }

    pub fn promoted_roots(&self) -> usize {
        self.promoted_roots
    }

    pub fn promoted_objects(&self) -> usize {
        self.promoted_objects
    }

    /// Promotions refused for lack of tenured space.
    pub fn failures(&self) -> usize {
        self.failures
    }
}

impl Promote for PromotionController<'_> {
    #[inline]
    fn should_promote(&self, age: u32) -> bool {
        age > self.threshold
    }

    fn promote(&mut self, chain: &ChainSnapshot) -> Option<Vec<ObjectRef>> {
        if chain.is_empty() {
            return None;
        }
        if !self.tenured.ensure_free(chain.len()) {
            self.failures += 1;
            log::warn!(
                "[gc] cannot promote {:?}: chain of {} needs space, tenured has {} free",
                chain.root(),
                chain.len(),
                self.tenured.free()
            );
            return None;
        }

        // Room for the whole chain is reserved, so none of these allocations
        // can run a collection or fail halfway.
        let mut promoted = Vec::with_capacity(chain.len());
        let mut parent = self.tenured.allocate(MOVED).ok()?;
        promoted.push(parent);
        for description in chain.descendants() {
            parent = self.tenured.allocate_child(description, parent).ok()?;
            promoted.push(parent);
        }

        self.promoted_roots += 1;
        self.promoted_objects += promoted.len();
        log::debug!(
            "[gc] promoted {:?} -> {:?} ({} objects)",
            chain.root(),
            promoted.first(),
            promoted.len()
        );
        Some(promoted)
    }
}
