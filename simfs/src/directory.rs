//! # 目录引擎
//!
//! 目录的全部目录项平铺在它唯一的数据块里，按追加顺序排列；
//! 目录索引节点的`size`记录目录项个数。目录不会增长到第二个块，
//! 装满后报 [`vfs::Error::DirectoryFull`]。
//!
//! 路径必须是以`/`开头的绝对路径，空段被忽略，不支持`.`与`..`。

use alloc::vec::Vec;

use block_dev::DiskStore;

use crate::inode_table::InodeTable;
use crate::layout::{Allocation, BlockId, DirEntry, DiskInode, InodeId, NAME_MAX_LEN};

/// 把绝对路径切分成各段；`/`得到空序列
pub fn split(path: &str) -> vfs::Result<Vec<&str>> {
    let Some(relat_path) = path.strip_prefix('/') else {
        return Err(vfs::Error::InvalidPath);
    };

    relat_path
        .split('/')
        .filter(|cmp| !cmp.is_empty())
        .map(|cmp| {
            if cmp == "." || cmp == ".." || cmp.len() > NAME_MAX_LEN || cmp.contains('\0') {
                log::warn!("invalid path component {cmp:?} in {path:?}");
                Err(vfs::Error::InvalidPath)
            } else {
                Ok(cmp)
            }
        })
        .collect()
}

/// 路径 → 索引节点编号
pub fn resolve(disk: &DiskStore, inodes: &InodeTable, path: &str) -> vfs::Result<InodeId> {
    walk(disk, inodes, &split(path)?)
}

/// 路径 → (父目录, 最后一段)。
///
/// 根目录没有父目录，视为非法路径；父目录不存在时报
/// [`vfs::Error::ParentNotFound`]。
pub fn resolve_parent<'p>(
    disk: &DiskStore,
    inodes: &InodeTable,
    path: &'p str,
) -> vfs::Result<(InodeId, &'p str)> {
    let mut cmps = split(path)?;
    let name = cmps.pop().ok_or(vfs::Error::InvalidPath)?;

    let parent = walk(disk, inodes, &cmps).map_err(|err| match err {
        vfs::Error::NotFound => vfs::Error::ParentNotFound,
        err => err,
    })?;
    if !inodes.get(parent).is_dir() {
        return Err(vfs::Error::NotADirectory);
    }

    Ok((parent, name))
}

/// 按磁盘上的顺序读出全部目录项
pub fn entries(disk: &DiskStore, inodes: &InodeTable, dir: InodeId) -> Vec<DirEntry> {
    let inode = inodes.get(dir);
    assert!(inode.is_dir(), "inode {dir} is not a directory");

    let count = inode.size as usize;
    debug_assert!(count <= capacity(disk));
    let offset = disk.block_offset(entries_block(&inode).index());

    disk.read(offset, count * DirEntry::SIZE)
        .chunks_exact(DirEntry::SIZE)
        .map(DirEntry::decode)
        .filter(|entry| !entry.is_empty())
        .collect()
}

/// 在目录下按名字查找
pub fn lookup(disk: &DiskStore, inodes: &InodeTable, dir: InodeId, name: &str) -> Option<InodeId> {
    entries(disk, inodes, dir)
        .iter()
        .find(|entry| entry.name() == name)
        .map(|entry| InodeId::new(entry.inode_id()))
}

/// 追加目录项并整体写回
pub fn add_entry(
    disk: &mut DiskStore,
    inodes: &mut InodeTable,
    dir: InodeId,
    child: InodeId,
    name: &str,
    now: u64,
) -> vfs::Result<()> {
    debug_assert!(!child.is_root());

    let mut dir_entries = entries(disk, inodes, dir);
    if dir_entries.len() + 1 > capacity(disk) {
        log::warn!("directory {dir} is full, cannot add {name:?}");
        return Err(vfs::Error::DirectoryFull);
    }

    dir_entries.push(DirEntry::new(name, child.into()));
    store(disk, inodes, dir, &dir_entries, now);
    log::debug!("directory {dir}: + {name:?} -> inode {child}");

    Ok(())
}

/// 删除目录项并返回它指向的索引节点
pub fn remove_entry(
    disk: &mut DiskStore,
    inodes: &mut InodeTable,
    dir: InodeId,
    name: &str,
    now: u64,
) -> vfs::Result<InodeId> {
    let mut dir_entries = entries(disk, inodes, dir);
    let index = dir_entries
        .iter()
        .position(|entry| entry.name() == name)
        .ok_or(vfs::Error::NotFound)?;

    let removed = dir_entries.remove(index);
    store(disk, inodes, dir, &dir_entries, now);
    log::debug!("directory {dir}: - {name:?}");

    Ok(InodeId::new(removed.inode_id()))
}

/// 一个目录最多容纳的目录项个数
#[inline]
pub fn capacity(disk: &DiskStore) -> usize {
    disk.block_size() / DirEntry::SIZE
}

/// 目录项所在的块
pub fn entries_block(inode: &DiskInode) -> BlockId {
    match inode.allocation {
        Allocation::Contiguous { start, count: 1 } => start,
        allocation => panic!("directory with unexpected allocation {allocation:?}"),
    }
}

/// 从根目录出发逐段查找
fn walk(disk: &DiskStore, inodes: &InodeTable, cmps: &[&str]) -> vfs::Result<InodeId> {
    cmps.iter().try_fold(InodeId::ROOT, |current, cmp| {
        if !inodes.get(current).is_dir() {
            log::debug!("middle segment before {cmp:?} isn't a directory");
            return Err(vfs::Error::NotADirectory);
        }
        lookup(disk, inodes, current, cmp).ok_or(vfs::Error::NotFound)
    })
}

/// 整块重写目录项数组，空出的槽位清零
fn store(
    disk: &mut DiskStore,
    inodes: &mut InodeTable,
    dir: InodeId,
    dir_entries: &[DirEntry],
    now: u64,
) {
    let block = inodes.modify(dir, |inode| {
        inode.size = dir_entries.len() as u64;
        inode.modified_at = now;
        entries_block(inode)
    });

    let mut buf = Vec::with_capacity(disk.block_size());
    for entry in dir_entries {
        buf.extend_from_slice(&entry.encode());
    }
    buf.resize(disk.block_size(), 0);
    disk.write_block(block.index(), &buf);
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::split;

    #[test]
    fn split_absolute_paths() {
        assert_eq!(split("/"), Ok(vec![]));
        assert_eq!(split("/home/user"), Ok(vec!["home", "user"]));
        assert_eq!(split("//home//user/"), Ok(vec!["home", "user"]));
    }

    #[test]
    fn reject_bad_paths() {
        assert_eq!(split("home"), Err(vfs::Error::InvalidPath));
        assert_eq!(split(""), Err(vfs::Error::InvalidPath));
        assert_eq!(split("/a/../b"), Err(vfs::Error::InvalidPath));
        assert_eq!(split("/./b"), Err(vfs::Error::InvalidPath));
        assert_eq!(split("/0123456789012345678901234567"), Err(vfs::Error::InvalidPath));
        assert_eq!(split("/012345678901234567890123456").map(|v| v.len()), Ok(1));
    }
}
