use slotmap::new_key_type;

use crate::header::ObjectHeader;

new_key_type! {
    /// Versioned slot key inside one generation's arena.
    pub struct ObjectKey;
}

/// Which space an object lives in. An object belongs to exactly one
/// generation at a time.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum Generation {
    Young,
    Tenured,
}

/// Handle to a managed object.
///
/// Handles are plain values: copying one does not keep the object alive. Once
/// the owning arena reclaims the slot the key's version no longer matches and
/// every lookup through the stale handle fails.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ObjectRef {
    pub(crate) generation: Generation,
    pub(crate) key: ObjectKey,
}

impl ObjectRef {
    #[inline]
    pub fn generation(self) -> Generation {
        self.generation
    }
    #[inline]
    pub fn is_young(self) -> bool {
        self.generation == Generation::Young
    }
}

/// Unit of allocation.
///
/// The object graph is a forest of chains: every object has at most one
/// `child`, and a child is only ever attached to a freshly allocated object,
/// so `child` links never form a cycle. `next` threads the tenured space's
/// sweep list and is always `None` for young objects.
#[derive(Debug)]
pub struct Object {
    pub(crate) header: ObjectHeader,
    pub(crate) child: Option<ObjectRef>,
    pub(crate) next: Option<ObjectRef>,
    pub(crate) description: String,
}

impl Object {
    pub(crate) fn new(description: impl Into<String>) -> Self {
        Self {
            header: ObjectHeader::new(),
            child: None,
            next: None,
            description: description.into(),
        }
    }
    pub fn age(&self) -> u32 {
        self.header.age()
    }
    pub fn child(&self) -> Option<ObjectRef> {
        self.child
    }
    pub fn next(&self) -> Option<ObjectRef> {
        self.next
    }
    pub fn description(&self) -> &str {
        &self.description
    }
    pub fn is_marked(&self) -> bool {
        self.header.is_marked()
    }
}
