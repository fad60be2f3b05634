//! 索引节点记录
//!
//! 记录定长40字节，小端序：
//!
//! | 偏移 | 宽度 | 字段                         |
//! |------|------|------------------------------|
//! | 0    | 1    | kind                         |
//! | 1    | 1    | 分配方式标签                 |
//! | 2    | 2    | permissions                  |
//! | 4    | 4    | links                        |
//! | 8    | 8    | size                         |
//! | 16   | 4    | 分配描述第一字               |
//! | 20   | 4    | 分配描述第二字               |
//! | 24   | 8    | created_at                   |
//! | 32   | 8    | modified_at                  |

use vfs::{AllocStrategy, DirEntryType, Permission, Permissions};

use super::BlockId;

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum DiskInodeKind {
    /// 空闲槽位
    #[default]
    Free = 0,
    File = 1,
    Directory = 2,
}

/// 数据块的分配描述，创建时由当时的全局策略决定，此后不变
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Allocation {
    /// `[start, start + count)`
    Contiguous { start: BlockId, count: u32 },
    /// 除尾块外，每块的最后一个字存放下一块的编号
    Linked { start: BlockId, end: BlockId },
    /// 索引块内顺序存放数据块编号
    Indexed { index_block: BlockId },
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct DiskInode {
    pub kind: DiskInodeKind,
    /// 文件为声明大小，目录为目录项个数
    pub size: u64,
    /// 硬链接个数
    pub links: u32,
    pub permissions: Permissions,
    pub allocation: Allocation,
    pub created_at: u64,
    pub modified_at: u64,
}

impl Allocation {
    /// 什么都没占
    pub const EMPTY: Self = Self::Contiguous {
        start: BlockId::NIL,
        count: 0,
    };

    pub fn strategy(&self) -> AllocStrategy {
        match self {
            Self::Contiguous { .. } => AllocStrategy::Contiguous,
            Self::Linked { .. } => AllocStrategy::Linked,
            Self::Indexed { .. } => AllocStrategy::Indexed,
        }
    }

    fn encode(&self) -> (u8, u32, u32) {
        match *self {
            Self::Contiguous { start, count } => (0, start.into(), count),
            Self::Linked { start, end } => (1, start.into(), end.into()),
            Self::Indexed { index_block } => (2, index_block.into(), 0),
        }
    }

    fn decode(tag: u8, first: u32, second: u32) -> Self {
        match tag {
            0 => Self::Contiguous {
                start: BlockId::new(first),
                count: second,
            },
            1 => Self::Linked {
                start: BlockId::new(first),
                end: BlockId::new(second),
            },
            2 => Self::Indexed {
                index_block: BlockId::new(first),
            },
            tag => panic!("corrupted inode: allocation tag {tag}"),
        }
    }
}

impl Default for DiskInode {
    fn default() -> Self {
        Self {
            kind: DiskInodeKind::Free,
            size: 0,
            links: 0,
            permissions: Permissions::empty(),
            allocation: Allocation::EMPTY,
            created_at: 0,
            modified_at: 0,
        }
    }
}

impl DiskInode {
    /// 记录大小恒为40字节
    pub const SIZE: usize = 40;

    #[inline]
    pub fn new(
        kind: DiskInodeKind,
        size: u64,
        permissions: Permissions,
        allocation: Allocation,
        now: u64,
    ) -> Self {
        Self {
            kind,
            size,
            links: 1,
            permissions,
            allocation,
            created_at: now,
            modified_at: now,
        }
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        self.kind == DiskInodeKind::Directory
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.kind == DiskInodeKind::Free
    }

    /// 对外的目录项类型，空闲槽位不应出现在这里
    pub fn entry_type(&self) -> DirEntryType {
        debug_assert!(!self.is_free());
        if self.is_dir() {
            DirEntryType::Directory
        } else {
            DirEntryType::Regular
        }
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0; Self::SIZE];
        let (tag, first, second) = self.allocation.encode();

        buf[0] = self.kind as u8;
        buf[1] = tag;
        buf[2..4].copy_from_slice(&self.permissions.bits().to_le_bytes());
        buf[4..8].copy_from_slice(&self.links.to_le_bytes());
        buf[8..16].copy_from_slice(&self.size.to_le_bytes());
        buf[16..20].copy_from_slice(&first.to_le_bytes());
        buf[20..24].copy_from_slice(&second.to_le_bytes());
        buf[24..32].copy_from_slice(&self.created_at.to_le_bytes());
        buf[32..40].copy_from_slice(&self.modified_at.to_le_bytes());

        buf
    }

    pub fn decode(buf: &[u8]) -> Self {
        assert_eq!(buf.len(), Self::SIZE);

        let kind = match buf[0] {
            0 => DiskInodeKind::Free,
            1 => DiskInodeKind::File,
            2 => DiskInodeKind::Directory,
            kind => panic!("corrupted inode: kind {kind}"),
        };

        Self {
            kind,
            size: u64::from_le_bytes(word(&buf[8..16])),
            links: u32::from_le_bytes(word(&buf[4..8])),
            permissions: Permission::from_mode(u16::from_le_bytes(word(&buf[2..4]))),
            allocation: Allocation::decode(
                buf[1],
                u32::from_le_bytes(word(&buf[16..20])),
                u32::from_le_bytes(word(&buf[20..24])),
            ),
            created_at: u64::from_le_bytes(word(&buf[24..32])),
            modified_at: u64::from_le_bytes(word(&buf[32..40])),
        }
    }
}

/// 切片转定长数组，长度由调用处的区间保证
#[inline]
fn word<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut arr = [0; N];
    arr.copy_from_slice(bytes);
    arr
}
