//! 索引分配
//!
//! 一个索引块，整个块连续存储数据块编号，空槽为 [`BlockId::NIL`]。
//! 只有一级，文件最多`块大小 / 4`个数据块。

use alloc::vec::Vec;

use block_dev::{DiskStore, WORD_SIZE};

use super::rollback;
use crate::layout::{Allocation, Bitmap, BlockId};

/// 索引块的编号容量
#[inline]
pub fn capacity(block_size: usize) -> usize {
    block_size / WORD_SIZE
}

pub(super) fn reserve(
    count: u32,
    bitmap: &mut Bitmap,
    disk: &mut DiskStore,
) -> vfs::Result<Allocation> {
    if count as usize > capacity(disk.block_size()) {
        log::warn!(
            "indexed: {count} blocks exceed index capacity {}",
            capacity(disk.block_size())
        );
        return Err(vfs::Error::FileTooLarge);
    }

    let index_block = bitmap.alloc().ok_or(vfs::Error::NoSpace)?;
    let offset = disk.block_offset(index_block.index());
    disk.fill(offset, disk.block_size(), 0xFF);

    let mut data_blocks: Vec<BlockId> = Vec::with_capacity(count as usize + 1);
    for slot in 0..count as usize {
        let Some(block) = bitmap.alloc() else {
            log::debug!("indexed: ran out of blocks after {slot} of {count}");
            data_blocks.push(index_block);
            rollback(&data_blocks, bitmap, disk);
            return Err(vfs::Error::NoSpace);
        };
        disk.write_u32(offset + slot * WORD_SIZE, block.into());
        data_blocks.push(block);
    }

    Ok(Allocation::Indexed { index_block })
}

/// 读出前`count`个编号中非空的那些
pub(super) fn blocks(index_block: BlockId, count: u32, disk: &DiskStore) -> Vec<BlockId> {
    let offset = disk.block_offset(index_block.index());
    let count = (count as usize).min(capacity(disk.block_size()));

    (0..count)
        .map(|slot| BlockId::new(disk.read_u32(offset + slot * WORD_SIZE)))
        .filter(|block| !block.is_nil())
        .collect()
}
