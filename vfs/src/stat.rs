use alloc::string::String;
use alloc::vec::Vec;

use crate::{AllocStrategy, DirEntryType, Permissions};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    /// Inode number
    pub inode: u64,
    pub mode: DirEntryType,
    pub permissions: Permissions,
    /// 硬链接个数，恒为1
    pub links: u32,
    /// Optimal I/O block size
    pub block_size: u64,
    /// Occupying blocks（含索引块）
    pub blocks: u64,
    /// 文件为声明大小，目录为目录项个数
    pub size: u64,
    pub created_at: u64,
    pub modified_at: u64,
}

/// 读文件的结果。
///
/// 引擎只按块数模拟占用，`content`是依声明大小合成的占位文本，
/// 而非真实写入的字节。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub path: String,
    pub content: String,
    pub permissions: Permissions,
    /// 声明大小
    pub size: u64,
    pub created_at: u64,
    pub modified_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsStatus {
    /// 数据区总字节数
    pub total_space: u64,
    /// 由位图现算，不缓存
    pub used_space: u64,
    pub free_space: u64,
    pub total_files: u64,
    /// 包括根目录
    pub total_directories: u64,
    pub strategy: AllocStrategy,
    pub block_size: u64,
    pub total_blocks: u64,
    pub free_blocks: u64,
}

/// 文件的物理布局，与当前全局分配策略无关。
///
/// 三种描述至多有一个为`Some`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAddresses {
    pub path: String,
    /// 创建时采用的分配策略
    pub strategy: AllocStrategy,
    pub contiguous: Option<ContiguousExtent>,
    pub linked: Option<LinkedChain>,
    /// 索引块编号
    pub indexed: Option<u32>,
    /// 按逻辑顺序排列的数据块（不含索引块）
    pub blocks: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContiguousExtent {
    pub start: u32,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkedChain {
    pub start: u32,
    pub end: u32,
}
