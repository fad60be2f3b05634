use derive_more::Display;

/// 文件系统操作的错误。
///
/// 全部都是可恢复的：调用方可以换个请求重试，引擎本身不受影响。
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /* 路径 */
    #[display(fmt = "no such file or directory")]
    NotFound,
    #[display(fmt = "parent directory does not exist")]
    ParentNotFound,
    #[display(fmt = "file or directory already exists")]
    AlreadyExists,
    #[display(fmt = "not a directory")]
    NotADirectory,
    #[display(fmt = "is a directory")]
    IsADirectory,
    /// 按目录删除时，目标却是文件
    #[display(fmt = "is a file")]
    IsAFile,
    #[display(fmt = "directory not empty")]
    DirectoryNotEmpty,
    /// 路径不以`/`开头、含有`.`/`..`、名字过长等
    #[display(fmt = "invalid path")]
    InvalidPath,

    /* 容量 */
    #[display(fmt = "no free inode")]
    NoInode,
    /// 没有足够的空闲块（或连续分配时没有足够长的空闲段）
    #[display(fmt = "no space left on device")]
    NoSpace,
    /// 目录项只能存放在一个块内
    #[display(fmt = "directory is full")]
    DirectoryFull,
    /// 索引块放不下这么多数据块编号
    #[display(fmt = "file too large")]
    FileTooLarge,

    /// 块已释放，目录项却删不掉；该路径的状态不再可信
    #[display(fmt = "directory entry and blocks are out of sync")]
    Inconsistent,
}

impl Error {
    /// 是否属于容量耗尽
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            Self::NoInode | Self::NoSpace | Self::DirectoryFull | Self::FileTooLarge
        )
    }
}

impl core::error::Error for Error {}
