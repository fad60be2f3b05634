#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

/* simfs 的整体架构，自上而下 */

// 门面层：编排下层完成创建、删除、列目录等操作，并记录操作日志
mod fs;
mod oplog;

// 目录引擎：目录项的存取与路径解析
pub mod directory;

// 分配策略层：连续、链接、索引三种分配方式
pub mod strategy;

// 索引节点表
pub mod inode_table;

// 磁盘数据结构层：位图、索引节点记录与目录项的编解码
pub mod layout;

pub mod clock;
pub mod config;

pub use self::{
    clock::{Clock, TickClock},
    config::{ConfigError, FsConfig},
    fs::{AuditReport, SharedFileSystem, SimFileSystem},
    layout::{Allocation, BlockId, InodeId},
    oplog::OpLog,
};

#[cfg(feature = "std")]
pub use self::clock::SystemClock;
