//! # 索引节点表
//!
//! 定长的索引节点数组，存放在与数据块区域分离的存储里，
//! 一条记录占存储中的一“块”。

use block_dev::DiskStore;

use crate::layout::{DiskInode, DiskInodeKind, InodeId};

#[derive(Debug)]
pub struct InodeTable {
    area: DiskStore,
}

impl InodeTable {
    /// 全部槽位空闲，根目录由上层初始化
    pub fn new(capacity: usize) -> Self {
        Self {
            area: DiskStore::new(capacity * DiskInode::SIZE, DiskInode::SIZE),
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.area.blocks()
    }

    pub fn get(&self, id: InodeId) -> DiskInode {
        DiskInode::decode(&self.area.read_block(id.index()))
    }

    pub fn put(&mut self, id: InodeId, inode: &DiskInode) {
        self.area.write_block(id.index(), &inode.encode());
    }

    /// 读取记录并处理后写回
    pub fn modify<V>(&mut self, id: InodeId, f: impl FnOnce(&mut DiskInode) -> V) -> V {
        let mut inode = self.get(id);
        let ret = f(&mut inode);
        self.put(id, &inode);
        ret
    }

    /// 从1号开始寻找空闲槽位（0号留给根目录）。
    /// 找到后标记为`kind`且链接数为1，其余字段待调用方填写。
    pub fn alloc(&mut self, kind: DiskInodeKind) -> Option<InodeId> {
        debug_assert_ne!(kind, DiskInodeKind::Free);

        let id = (1..self.capacity())
            .map(|index| InodeId::new(index as u32))
            .find(|&id| self.kind_of(id) == DiskInodeKind::Free)?;

        self.put(
            id,
            &DiskInode {
                kind,
                links: 1,
                ..Default::default()
            },
        );
        log::debug!("inode table: alloc inode {id} as {kind:?}");
        Some(id)
    }

    /// 整条记录清零；根目录永不释放
    pub fn free(&mut self, id: InodeId) {
        assert!(!id.is_root(), "the root inode is never freed");
        self.area.zero_block(id.index());
        log::debug!("inode table: free inode {id}");
    }

    /// 某类索引节点的个数
    pub fn count(&self, kind: DiskInodeKind) -> usize {
        self.ids().filter(|&id| self.kind_of(id) == kind).count()
    }

    /// 全部在用的索引节点
    pub fn live(&self) -> impl Iterator<Item = (InodeId, DiskInode)> + '_ {
        self.ids()
            .map(|id| (id, self.get(id)))
            .filter(|(_, inode)| !inode.is_free())
    }

    pub fn wipe(&mut self) {
        self.area.wipe();
    }
}

impl InodeTable {
    fn ids(&self) -> impl Iterator<Item = InodeId> + use<> {
        (0..self.capacity()).map(|index| InodeId::new(index as u32))
    }

    /// 只看类型字节，不解码整条记录
    fn kind_of(&self, id: InodeId) -> DiskInodeKind {
        let offset = self.area.block_offset(id.index());
        match self.area.read(offset, 1)[0] {
            0 => DiskInodeKind::Free,
            1 => DiskInodeKind::File,
            2 => DiskInodeKind::Directory,
            kind => panic!("corrupted inode: kind {kind}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::InodeTable;
    use crate::layout::{DiskInodeKind, InodeId};

    #[test]
    fn alloc_skips_root_and_reuses_slots() {
        let mut table = InodeTable::new(4);
        let first = table.alloc(DiskInodeKind::File).unwrap();
        assert_eq!(first, InodeId::new(1));
        assert_eq!(table.get(first).links, 1);

        let second = table.alloc(DiskInodeKind::Directory).unwrap();
        let third = table.alloc(DiskInodeKind::File).unwrap();
        assert_eq!(third, InodeId::new(3));
        assert_eq!(table.alloc(DiskInodeKind::File), None);

        table.free(second);
        assert!(table.get(second).is_free());
        assert_eq!(table.alloc(DiskInodeKind::File), Some(second));
        assert_eq!(table.count(DiskInodeKind::File), 3);
    }

    #[test]
    #[should_panic(expected = "corrupted inode")]
    fn corrupted_kind_byte() {
        let mut table = InodeTable::new(4);
        let offset = table.area.block_offset(2);
        table.area.write(offset, &[7]);
        table.count(DiskInodeKind::File);
    }

    #[test]
    #[should_panic(expected = "never freed")]
    fn root_is_pinned() {
        let mut table = InodeTable::new(4);
        table.free(InodeId::ROOT);
    }
}
