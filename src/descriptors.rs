//! The fixed-width, binding-indexed pointer tables used to record
//! bound descriptor sets and vertex buffers on a render-pass state.
//!
//! Grounded on `original_source/core/src/context.cpp`'s
//! `current_vertex_buffer[256]` global array — this crate keeps the
//! 256-wide, `u8`-indexed table (the design notes call it an "ABI
//! concession" that avoids hashing or indirection) but makes it a
//! value owned by a [`crate::state::RenderPassState`] rather than a
//! process-wide global.

use crate::shader::SLOT_COUNT;

/// A 256-slot table of externally-owned byte pointers, indexed by
/// binding number.
///
/// All slots start null; binding a pointer at an out-of-range index
/// panics, the same way an out-of-range `location` in the shader
/// pointer tables would be a caller bug rather than a recoverable
/// condition.
#[derive(Clone, Copy)]
pub struct BindingTable {
    slots: [*const u8; SLOT_COUNT],
}

impl BindingTable {
    pub fn new() -> Self {
        BindingTable { slots: [std::ptr::null(); SLOT_COUNT] }
    }

    pub fn bind(&mut self, binding: u8, bytes: *const u8) {
        self.slots[binding as usize] = bytes;
    }

    pub fn get(&self, binding: u8) -> *const u8 {
        self.slots[binding as usize]
    }

    pub fn as_slots(&self) -> &[*const u8; SLOT_COUNT] {
        &self.slots
    }
}

impl Default for BindingTable {
    fn default() -> Self {
        Self::new()
    }
}
