//! 连续分配：一段连续的块，不做碎片整理

use alloc::vec::Vec;

use crate::layout::{Allocation, Bitmap, BlockId};

pub(super) fn reserve(count: u32, bitmap: &mut Bitmap) -> vfs::Result<Allocation> {
    if count == 0 {
        return Ok(Allocation::EMPTY);
    }

    let start = bitmap
        .alloc_contiguous(count as usize)
        .ok_or(vfs::Error::NoSpace)?;

    Ok(Allocation::Contiguous { start, count })
}

pub(super) fn blocks(start: BlockId, count: u32) -> Vec<BlockId> {
    if start.is_nil() {
        return Vec::new();
    }
    (0..count).map(|offset| start + offset).collect()
}
