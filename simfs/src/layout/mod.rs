//! # 磁盘数据结构层
//!
//! 模拟磁盘的布局：
//! 数据块区域 | 根目录块
//!
//! 索引节点表位于另一块独立的存储（见 [`crate::inode_table`]），
//! 根目录块也不受位图管辖，所以空文件系统的已用空间为0。
//!
//! 所有结构都通过定长的编解码函数与字节互转，不直接把缓冲区当作结构体数组。

mod bitmap;
pub use bitmap::Bitmap;

mod inode;
pub use inode::{Allocation, DiskInode, DiskInodeKind};

/// 文件项，也属于磁盘文件系统数据结构
mod dir_entry;
pub use dir_entry::{DirEntry, NAME_MAX_LEN};

use derive_more::{Add, Display, From, Into};

/// 数据块编号
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Add, From, Into)]
#[repr(transparent)]
pub struct BlockId(u32);

impl BlockId {
    /// 空指针：链表尾、索引块的空槽、零长文件的起始块
    pub const NIL: Self = Self(u32::MAX);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn is_nil(self) -> bool {
        self == Self::NIL
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl core::ops::Add<u32> for BlockId {
    type Output = Self;

    fn add(self, rhs: u32) -> Self::Output {
        self + Self(rhs)
    }
}

/// 索引节点编号，0号恒为根目录
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into)]
#[repr(transparent)]
pub struct InodeId(u32);

impl InodeId {
    pub const ROOT: Self = Self(0);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

/// 容纳`size`字节需要多少个块
#[inline]
pub fn count_blocks(size: u64, block_size: usize) -> u64 {
    size.div_ceil(block_size as u64)
}
