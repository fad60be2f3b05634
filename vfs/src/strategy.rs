use core::fmt;
use core::str::FromStr;

use derive_more::Display;

/// 新建文件时采用的块分配算法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllocStrategy {
    /// 一段连续的块
    Contiguous,
    /// 块尾部记录下一块编号的链表
    Linked,
    /// 一个索引块记录全部数据块编号
    #[default]
    Indexed,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[display(fmt = "unknown allocation strategy")]
pub struct UnknownStrategy;

impl AllocStrategy {
    pub const ALL: [Self; 3] = [Self::Contiguous, Self::Linked, Self::Indexed];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Contiguous => "CONTIGUOUS",
            Self::Linked => "LINKED",
            Self::Indexed => "INDEXED",
        }
    }
}

impl fmt::Display for AllocStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AllocStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(s))
            .ok_or(UnknownStrategy)
    }
}
