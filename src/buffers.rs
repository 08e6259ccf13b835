//! Index-buffer fetch: the thin indirection layer `draw_indexed` adds
//! on top of `draw`.
//!
//! Grounded on `commands.rs`'s `cmd_bind_index_buffer` /
//! `cmd_draw_indexed` pairing in the teacher, generalized from a
//! recorded GPU command into a direct host-memory read: an indexed
//! draw fetches a `u32` index for logical vertex position `i` instead
//! of using `i` itself as the fetch offset.

/// Reads the `u32` index at logical vertex position `i` from an index
/// buffer bound as a raw byte pointer.
///
/// # Safety
/// `index_buffer` must point to at least `(i + 1) * 4` readable bytes.
pub unsafe fn fetch_index(index_buffer: *const u8, i: u32) -> u32 {
    let ptr = index_buffer.add(i as usize * 4) as *const u32;
    ptr.read_unaligned()
}

/// Resolves the vertex fetch offset for logical position `i`: the
/// index itself for non-indexed draws, or the value read from the
/// index buffer for indexed ones.
pub unsafe fn vertex_fetch_offset(index_buffer: Option<*const u8>, i: u32) -> u32 {
    match index_buffer {
        Some(buf) => fetch_index(buf, i),
        None => i,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_indexed_fetch_is_identity() {
        assert_eq!(unsafe { vertex_fetch_offset(None, 7) }, 7);
    }

    #[test]
    fn indexed_fetch_reads_u32_at_position() {
        let indices: [u32; 3] = [10, 20, 30];
        let ptr = indices.as_ptr() as *const u8;
        assert_eq!(unsafe { fetch_index(ptr, 1) }, 20);
        assert_eq!(unsafe { vertex_fetch_offset(Some(ptr), 2) }, 30);
    }
}
