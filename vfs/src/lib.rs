//! 文件系统引擎与外部（传输层等）交换的类型

#![no_std]

extern crate alloc;

mod dirent;
mod error;
mod perm;
mod record;
mod stat;
mod strategy;

pub use self::{
    dirent::{DirEntryType, DirectoryContent},
    error::Error,
    perm::{Permission, Permissions},
    record::{LogEntry, LogFilter, Operation, Outcome},
    stat::{ContiguousExtent, FileAddresses, FileContent, FsStatus, LinkedChain, Stat},
    strategy::{AllocStrategy, UnknownStrategy},
};

pub type Result<T> = core::result::Result<T, Error>;
