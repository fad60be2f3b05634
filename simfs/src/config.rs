//! 文件系统的默认参数与配置

use derive_more::Display;
use vfs::AllocStrategy;

use crate::layout::BlockId;

/// 模拟磁盘大小，10M
pub const DISK_BYTES: usize = 10 * 2usize.pow(20);
/// 块大小
pub const BLOCK_BYTES: usize = 512;
/// 索引节点表的槽位数
pub const MAX_INODES: usize = 1024;
/// 块不能小于两个目录项
pub const MIN_BLOCK_BYTES: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FsConfig {
    /// 数据区域字节数，根目录块另算
    pub disk_bytes: usize,
    pub block_bytes: usize,
    pub max_inodes: usize,
    /// 初始的全局分配策略
    pub strategy: AllocStrategy,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[display(fmt = "block size {} is not a power of two no smaller than {}", _0, MIN_BLOCK_BYTES)]
    BadBlockSize(usize),
    #[display(fmt = "disk size {} is not a positive multiple of the block size", _0)]
    BadDiskSize(usize),
    #[display(fmt = "disk has too many blocks: {}", _0)]
    TooManyBlocks(usize),
    #[display(fmt = "inode table slot count {} is out of range", _0)]
    BadInodeCount(usize),
}

impl core::error::Error for ConfigError {}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            disk_bytes: DISK_BYTES,
            block_bytes: BLOCK_BYTES,
            max_inodes: MAX_INODES,
            strategy: AllocStrategy::default(),
        }
    }
}

impl FsConfig {
    /// `blocks`个`block_bytes`大小的块
    pub fn with_blocks(blocks: usize, block_bytes: usize) -> Self {
        Self {
            disk_bytes: blocks * block_bytes,
            block_bytes,
            ..Default::default()
        }
    }

    pub fn strategy(self, strategy: AllocStrategy) -> Self {
        Self { strategy, ..self }
    }

    pub fn max_inodes(self, max_inodes: usize) -> Self {
        Self { max_inodes, ..self }
    }

    /// 数据块个数
    #[inline]
    pub fn data_blocks(&self) -> usize {
        self.disk_bytes / self.block_bytes
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.block_bytes.is_power_of_two() || self.block_bytes < MIN_BLOCK_BYTES {
            return Err(ConfigError::BadBlockSize(self.block_bytes));
        }
        if self.disk_bytes == 0 || self.disk_bytes % self.block_bytes != 0 {
            return Err(ConfigError::BadDiskSize(self.disk_bytes));
        }
        // 还要给根目录块留一个编号
        if self.data_blocks() >= u32::from(BlockId::NIL) as usize {
            return Err(ConfigError::TooManyBlocks(self.data_blocks()));
        }
        if self.max_inodes < 2 || self.max_inodes > u32::MAX as usize {
            return Err(ConfigError::BadInodeCount(self.max_inodes));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, FsConfig};

    #[test]
    fn defaults_are_valid() {
        let config = FsConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.data_blocks(), 20480);
    }

    #[test]
    fn reject_bad_geometry() {
        assert_eq!(
            FsConfig::with_blocks(16, 100).validate(),
            Err(ConfigError::BadBlockSize(100))
        );
        assert_eq!(
            FsConfig::with_blocks(16, 32).validate(),
            Err(ConfigError::BadBlockSize(32))
        );
        assert_eq!(
            FsConfig::with_blocks(0, 512).validate(),
            Err(ConfigError::BadDiskSize(0))
        );

        let ragged = FsConfig {
            disk_bytes: 1000,
            ..Default::default()
        };
        assert_eq!(ragged.validate(), Err(ConfigError::BadDiskSize(1000)));

        let tiny = FsConfig::default().max_inodes(1);
        assert_eq!(tiny.validate(), Err(ConfigError::BadInodeCount(1)));
    }
}
