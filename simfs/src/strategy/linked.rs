//! 链接分配
//!
//! 块逐个分配，前一块的最后一个字记录下一块的编号，
//! 尾块记录 [`BlockId::NIL`]。零长文件没有链，首尾皆为 NIL。

use alloc::vec::Vec;

use block_dev::DiskStore;

use super::rollback;
use crate::layout::{Allocation, Bitmap, BlockId};

pub(super) fn reserve(
    count: u32,
    bitmap: &mut Bitmap,
    disk: &mut DiskStore,
) -> vfs::Result<Allocation> {
    if count == 0 {
        return Ok(Allocation::Linked {
            start: BlockId::NIL,
            end: BlockId::NIL,
        });
    }

    let mut chain: Vec<BlockId> = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let Some(block) = bitmap.alloc() else {
            log::debug!("linked: ran out of blocks after {} of {count}", chain.len());
            rollback(&chain, bitmap, disk);
            return Err(vfs::Error::NoSpace);
        };

        if let Some(&tail) = chain.last() {
            link(disk, tail, block);
        }
        chain.push(block);
    }

    let (start, end) = (chain[0], chain[chain.len() - 1]);
    link(disk, end, BlockId::NIL);

    Ok(Allocation::Linked { start, end })
}

/// 沿链走到`end`为止，最多`count`块
pub(super) fn blocks(start: BlockId, end: BlockId, count: u32, disk: &DiskStore) -> Vec<BlockId> {
    let mut chain = Vec::with_capacity(count as usize);
    if start.is_nil() {
        return chain;
    }

    let mut current = start;
    loop {
        chain.push(current);
        if current == end || chain.len() >= count as usize {
            break;
        }

        current = next(disk, current);
        if current.is_nil() {
            log::error!("linked: chain from {start} ends before {end}");
            break;
        }
    }

    debug_assert_eq!(chain.last(), Some(&end));
    chain
}

#[inline]
fn next(disk: &DiskStore, block: BlockId) -> BlockId {
    BlockId::new(disk.read_u32(disk.tail_word_offset(block.index())))
}

#[inline]
fn link(disk: &mut DiskStore, block: BlockId, next: BlockId) {
    disk.write_u32(disk.tail_word_offset(block.index()), next.into());
}
