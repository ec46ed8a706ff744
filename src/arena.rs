//! Owning object storage for one generation.
//!
//! Backed by a [`SlotMap`]: removing an object bumps its slot version, so an
//! [`ObjectRef`] minted for the previous occupant no longer resolves.
//! [`Arena::remove`] is the only place objects are destroyed.

use slotmap::SlotMap;

use crate::{
    error::{GcError, Result},
    object::{Generation, Object, ObjectKey, ObjectRef},
};

pub struct Arena {
    generation: Generation,
    objects: SlotMap<ObjectKey, Object>,
}

impl Arena {
    pub fn with_capacity(generation: Generation, capacity: usize) -> Self {
        Self {
            generation,
            objects: SlotMap::with_capacity_and_key(capacity),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn insert(&mut self, object: Object) -> ObjectRef {
        ObjectRef {
            generation: self.generation,
            key: self.objects.insert(object),
        }
    }

    pub fn contains(&self, object: ObjectRef) -> bool {
        object.generation == self.generation && self.objects.contains_key(object.key)
    }

    pub fn get(&self, object: ObjectRef) -> Option<&Object> {
        if object.generation != self.generation {
            return None;
        }
        self.objects.get(object.key)
    }

    pub fn get_mut(&mut self, object: ObjectRef) -> Option<&mut Object> {
        if object.generation != self.generation {
            return None;
        }
        self.objects.get_mut(object.key)
    }

    /// Like [`Arena::get_mut`] but reports a missing object as `InvalidArgument`.
    pub fn resolve_mut(&mut self, object: ObjectRef) -> Result<&mut Object> {
        let generation = self.generation;
        self.get_mut(object).ok_or_else(|| {
            GcError::InvalidArgument(format!(
                "{:?} is not a live {:?} object",
                object, generation
            ))
        })
    }

    /// Destroys the object and invalidates every handle to it.
    pub fn remove(&mut self, object: ObjectRef) -> Option<Object> {
        if object.generation != self.generation {
            return None;
        }
        self.objects.remove(object.key)
    }
}
