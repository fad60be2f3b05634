use alloc::vec;
use alloc::vec::Vec;

use super::BlockId;

/// 每组的位数
const GROUP_BITS: usize = u64::BITS as usize;

/// 数据块位图，每块一位，置位表示已分配
#[derive(Debug, Clone)]
pub struct Bitmap {
    groups: Vec<u64>,
    /// 位图所指示区域的总块数
    capacity: usize,
}

impl Bitmap {
    pub fn new(capacity: usize) -> Self {
        Self {
            groups: vec![0; capacity.div_ceil(GROUP_BITS)],
            capacity,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// 现数已分配的块，不做缓存
    pub fn used(&self) -> usize {
        self.groups.iter().map(|bits| bits.count_ones() as usize).sum()
    }

    #[inline]
    pub fn free(&self) -> usize {
        self.capacity - self.used()
    }

    pub fn is_allocated(&self, id: BlockId) -> bool {
        let (group_index, ingroup_index) = decode(id);
        id.index() < self.capacity && self.groups[group_index] & (1 << ingroup_index) != 0
    }

    /// 分配编号最小的空闲块。
    /// 若位图的空间用尽，则返回空。
    pub fn alloc(&mut self) -> Option<BlockId> {
        // 寻找还有剩余空间的组(即还有0)
        let (group_index, ingroup_index) =
            self.groups
                .iter()
                .enumerate()
                .find_map(|(group_index, &bits)| {
                    (bits != u64::MAX).then_some((group_index, bits.trailing_ones() as usize))
                })?;

        // 末组中超出容量的位不可用
        let index = encode(group_index, ingroup_index);
        if index >= self.capacity {
            return None;
        }

        self.groups[group_index] |= 1 << ingroup_index;
        log::trace!("bitmap: alloc block {index}");
        Some(BlockId::new(index as u32))
    }

    /// 分配最靠前的`count`个连续空闲块，返回首块。
    /// 要么全部分配，要么什么都不做。
    pub fn alloc_contiguous(&mut self, count: usize) -> Option<BlockId> {
        if count == 0 || count > self.capacity {
            return None;
        }

        let mut run_start = 0;
        let mut run_len = 0;
        for index in 0..self.capacity {
            if self.is_allocated(BlockId::new(index as u32)) {
                run_len = 0;
                continue;
            }

            if run_len == 0 {
                run_start = index;
            }
            run_len += 1;

            if run_len == count {
                for index in run_start..run_start + count {
                    let (group_index, ingroup_index) = decode(BlockId::new(index as u32));
                    self.groups[group_index] |= 1 << ingroup_index;
                }
                log::trace!("bitmap: alloc blocks [{run_start}, {})", run_start + count);
                return Some(BlockId::new(run_start as u32));
            }
        }

        None
    }

    /// 释放已释放的块什么也不做
    pub fn dealloc(&mut self, id: BlockId) {
        assert!(id.index() < self.capacity, "block {id} out of bitmap range");

        let (group_index, ingroup_index) = decode(id);
        if self.groups[group_index] & (1 << ingroup_index) == 0 {
            log::warn!("bitmap: double free of block {id}");
            return;
        }

        self.groups[group_index] &= !(1 << ingroup_index);
        log::trace!("bitmap: dealloc block {id}");
    }

    pub fn dealloc_range(&mut self, start: BlockId, count: u32) {
        for offset in 0..count {
            self.dealloc(start + offset);
        }
    }

    /// 全部置为空闲
    pub fn clear(&mut self) {
        self.groups.fill(0);
    }
}

/// 线性映射编码得到块ID
#[inline]
fn encode(group_index: usize, ingroup_index: usize) -> usize {
    group_index * GROUP_BITS + ingroup_index
}

#[inline]
fn decode(id: BlockId) -> (usize, usize) {
    (id.index() / GROUP_BITS, id.index() % GROUP_BITS)
}
