use alloc::string::String;

use derive_more::Display;

use crate::Permissions;

/// 列目录时交换的目录项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryContent {
    pub name: String,
    /// Inode number
    pub inode: u64,
    pub ty: DirEntryType,
    /// 文件为声明大小，目录为目录项个数
    pub size: u64,
    pub permissions: Permissions,
    pub created_at: u64,
    pub modified_at: u64,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DirEntryType {
    #[display(fmt = "directory")]
    Directory,
    #[default]
    #[display(fmt = "file")]
    Regular,
}
