//! # 块分配策略
//!
//! 把声明的字节数映射为一组数据块，并且知道如何原样归还。
//!
//! - 预留（[`reserve`]）按**当前全局策略**进行；
//! - 释放（[`release`]）与遍历（[`blocks`]）按索引节点**记录的分配形态**进行，
//!   与当前全局策略无关。
//!
//! 预留中途失败时，本次调用已拿到的块全部归还，位图恢复原状。

mod contiguous;
mod indexed;
mod linked;

use alloc::vec::Vec;

use block_dev::DiskStore;
use vfs::AllocStrategy;

use crate::layout::{count_blocks, Allocation, Bitmap, BlockId};

/// 为`size`字节预留数据块
pub fn reserve(
    strategy: AllocStrategy,
    size: u64,
    bitmap: &mut Bitmap,
    disk: &mut DiskStore,
) -> vfs::Result<Allocation> {
    let count = count_blocks(size, disk.block_size());
    // 空盘都放不下的请求直接拒绝
    if count > bitmap.capacity() as u64 {
        log::warn!("{strategy}: {count} blocks requested, disk has {}", bitmap.capacity());
        return Err(vfs::Error::NoSpace);
    }
    let count = count as u32;

    let allocation = match strategy {
        AllocStrategy::Contiguous => contiguous::reserve(count, bitmap)?,
        AllocStrategy::Linked => linked::reserve(count, bitmap, disk)?,
        AllocStrategy::Indexed => indexed::reserve(count, bitmap, disk)?,
    };
    log::trace!("{strategy}: reserved {allocation:?} for {size} bytes");

    Ok(allocation)
}

/// 归还分配描述占用的全部块（含索引块）
pub fn release(allocation: &Allocation, size: u64, bitmap: &mut Bitmap, disk: &mut DiskStore) {
    for block in footprint(allocation, size, disk) {
        dealloc(block, bitmap, disk);
    }
}

/// 按逻辑顺序排列的数据块，不含索引块
pub fn blocks(allocation: &Allocation, size: u64, disk: &DiskStore) -> Vec<BlockId> {
    let count = count_blocks(size, disk.block_size()) as u32;

    match *allocation {
        Allocation::Contiguous { start, count } => contiguous::blocks(start, count),
        Allocation::Linked { start, end } => linked::blocks(start, end, count, disk),
        Allocation::Indexed { index_block } => indexed::blocks(index_block, count, disk),
    }
}

/// 分配描述实际占用的全部块：数据块，外加索引块
pub fn footprint(allocation: &Allocation, size: u64, disk: &DiskStore) -> Vec<BlockId> {
    let mut all = blocks(allocation, size, disk);
    if let Allocation::Indexed { index_block } = *allocation {
        all.push(index_block);
    }
    all
}

/// 清零后归还，保证新分配的块总是全零
fn dealloc(block: BlockId, bitmap: &mut Bitmap, disk: &mut DiskStore) {
    disk.zero_block(block.index());
    bitmap.dealloc(block);
}

/// 回滚：归还本次调用已分配的块
fn rollback(reserved: &[BlockId], bitmap: &mut Bitmap, disk: &mut DiskStore) {
    log::debug!("rollback {} reserved blocks", reserved.len());
    for &block in reserved {
        dealloc(block, bitmap, disk);
    }
}
