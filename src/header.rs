use modular_bitfield::prelude::*;

// ObjectHeader holds the per-object collector state and lives inline in every
// arena object.
//
// +-----------------+------+------------------------------------------------+
// | name            | bits |                                                |
// +-----------------+------+------------------------------------------------+
// | age             |   15 | Young cycles survived as a root. Saturates.   |
// | mark bit        |    1 | Tenured: reachable in the current mark phase. |
// |                 |      | Young: already copied in the current cycle.   |
// +-----------------+------+------------------------------------------------+
//
// Notes:
// - The mark bit is always clear between cycles. Both collectors reset it on
//   every survivor before returning.
// - Promotion threshold must stay below |MAX_AGE| so that an aged root can
//   still exceed it.
#[derive(Clone, Copy, Debug)]
pub struct ObjectHeader {
    encoded: Encoded,
}

/// Largest age the header can record.
pub const MAX_AGE: u32 = (1 << 15) - 1;

impl ObjectHeader {
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            encoded: Encoded::new(),
        }
    }
    #[inline(always)]
    pub fn age(self) -> u32 {
        self.encoded.age() as u32
    }
    /// Bumps the age by one and returns the new value.
    #[inline(always)]
    pub fn increment_age(&mut self) -> u32 {
        let age = (self.age() + 1).min(MAX_AGE);
        self.encoded.set_age(age as u16);
        age
    }
    #[inline(always)]
    pub fn is_marked(self) -> bool {
        self.encoded.marked()
    }
    /// Sets the mark bit. Returns `false` if it was already set.
    #[inline(always)]
    pub fn set_marked(&mut self) -> bool {
        if self.is_marked() {
            return false;
        }
        self.encoded.set_marked(true);
        true
    }
    #[inline(always)]
    pub fn clear_marked(&mut self) {
        self.encoded.set_marked(false);
    }
}

impl Default for ObjectHeader {
    fn default() -> Self {
        Self::new()
    }
}

#[bitfield(bits = 16)]
#[derive(Clone, Copy, Debug)]
struct Encoded {
    age: B15,
    marked: bool,
}
