//! # 文件系统门面
//!
//! 把位图、索引节点表、分配策略和目录引擎编排成完整的操作。
//! 每个操作对调用方而言都是原子的：多步修改中途失败时，
//! 本次调用已占用的索引节点与块全部归还。
//!
//! 所有修改类操作（无论成败）都记入操作日志。

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use block_dev::DiskStore;
use spin::Mutex;
use vfs::{
    AllocStrategy, ContiguousExtent, DirectoryContent, FileAddresses, FileContent, FsStatus,
    LinkedChain, LogEntry, LogFilter, Operation, Outcome, Permission, Permissions, Stat,
};

use crate::clock::Clock;
use crate::config::{ConfigError, FsConfig};
use crate::directory;
use crate::inode_table::InodeTable;
use crate::layout::{Allocation, Bitmap, BlockId, DiskInode, DiskInodeKind, InodeId};
use crate::oplog::OpLog;
use crate::strategy;

/// 供并发宿主使用：一把锁覆盖一整个操作
pub type SharedFileSystem = Arc<Mutex<SimFileSystem>>;

pub struct SimFileSystem {
    config: FsConfig,
    /// 数据块区域，末尾多一个根目录块
    disk: DiskStore,
    bitmap: Bitmap,
    inodes: InodeTable,
    strategy: AllocStrategy,
    log: OpLog,
    clock: Box<dyn Clock>,
}

/// 一致性检查的结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// 被在用索引节点引用的块数（含索引块，不含根目录块）
    pub owned: usize,
    /// 位图中置位的块数
    pub allocated: usize,
    /// 被不止一个索引节点引用的块
    pub duplicates: Vec<BlockId>,
    /// 已置位却无人引用的块
    pub leaked: Vec<BlockId>,
    /// 有人引用却未置位的块
    pub unallocated: Vec<BlockId>,
}

impl AuditReport {
    pub fn is_consistent(&self) -> bool {
        self.owned == self.allocated
            && self.duplicates.is_empty()
            && self.leaked.is_empty()
            && self.unallocated.is_empty()
    }
}

impl SimFileSystem {
    /// 用默认时钟构建并格式化
    pub fn new(config: FsConfig) -> Result<Self, ConfigError> {
        #[cfg(feature = "std")]
        let clock = crate::clock::SystemClock;
        #[cfg(not(feature = "std"))]
        let clock = crate::clock::TickClock::default();

        Self::with_clock(config, clock)
    }

    pub fn with_clock(config: FsConfig, clock: impl Clock + 'static) -> Result<Self, ConfigError> {
        config.validate()?;

        let data_blocks = config.data_blocks();
        let mut fs = Self {
            config,
            disk: DiskStore::new((data_blocks + 1) * config.block_bytes, config.block_bytes),
            bitmap: Bitmap::new(data_blocks),
            inodes: InodeTable::new(config.max_inodes),
            strategy: config.strategy,
            log: OpLog::default(),
            clock: Box::new(clock),
        };
        let now = fs.clock.now();
        fs.init_root(now);
        log::info!(
            "simfs: {data_blocks} blocks of {} bytes, {} inodes, {} allocation",
            config.block_bytes,
            config.max_inodes,
            config.strategy,
        );

        Ok(fs)
    }

    pub fn shared(config: FsConfig) -> Result<SharedFileSystem, ConfigError> {
        Ok(Arc::new(Mutex::new(Self::new(config)?)))
    }

    /// 清空全部数据并重建根目录，操作日志保留
    pub fn format(&mut self) {
        let now = self.clock.now();

        self.disk.wipe();
        self.bitmap.clear();
        self.inodes.wipe();
        self.init_root(now);

        self.log.record(
            now,
            Operation::Format,
            "/",
            Outcome::Success,
            format!("{} blocks of {} bytes", self.bitmap.capacity(), self.config.block_bytes),
        );
    }

    pub fn create_directory(&mut self, path: &str, permissions: Permissions) -> vfs::Result<InodeId> {
        let now = self.clock.now();
        let result = self.try_create_directory(path, permissions, now);
        let (outcome, detail) = summarize(&result, |id| format!("inode {id}"));
        self.log
            .record(now, Operation::CreateDirectory, path, outcome, detail);
        result
    }

    /// 按当前全局策略为声明大小预留块
    pub fn create_file(
        &mut self,
        path: &str,
        size: u64,
        permissions: Permissions,
    ) -> vfs::Result<InodeId> {
        let now = self.clock.now();
        let strategy = self.strategy;
        let result = self.try_create_file(path, size, permissions, now);
        let (outcome, detail) =
            summarize(&result, |id| format!("inode {id}, {size} bytes, {strategy}"));
        self.log
            .record(now, Operation::CreateFile, path, outcome, detail);
        result
    }

    /// 返回元数据与按声明大小合成的占位内容
    pub fn read_file(&self, path: &str) -> vfs::Result<FileContent> {
        let id = directory::resolve(&self.disk, &self.inodes, path)?;
        let inode = self.inodes.get(id);
        if inode.is_dir() {
            return Err(vfs::Error::IsADirectory);
        }

        Ok(FileContent {
            path: path.into(),
            content: format!("[simulated content of {path}: {} bytes]", inode.size),
            permissions: inode.permissions,
            size: inode.size,
            created_at: inode.created_at,
            modified_at: inode.modified_at,
        })
    }

    pub fn delete_file(&mut self, path: &str) -> vfs::Result<()> {
        let now = self.clock.now();
        let result = self.try_delete_file(path, now);
        let (outcome, detail) = summarize(&result, |freed| format!("{freed} blocks freed"));
        self.log
            .record(now, Operation::DeleteFile, path, outcome, detail);
        result.map(drop)
    }

    /// 非递归时只能删除空目录；根目录不可删除
    pub fn delete_directory(&mut self, path: &str, recursive: bool) -> vfs::Result<()> {
        let now = self.clock.now();
        let result = self.try_delete_directory(path, recursive, now);
        let (outcome, detail) =
            summarize(&result, |removed| format!("{removed} inodes removed"));
        self.log
            .record(now, Operation::DeleteDirectory, path, outcome, detail);
        result.map(drop)
    }

    /// 按目录项在磁盘上的顺序列出
    pub fn list_directory(&self, path: &str) -> vfs::Result<Vec<DirectoryContent>> {
        let id = directory::resolve(&self.disk, &self.inodes, path)?;
        if !self.inodes.get(id).is_dir() {
            return Err(vfs::Error::NotADirectory);
        }

        let contents = directory::entries(&self.disk, &self.inodes, id)
            .into_iter()
            .map(|entry| {
                let inode = self.inodes.get(InodeId::new(entry.inode_id()));
                DirectoryContent {
                    name: entry.name().to_string(),
                    inode: entry.inode_id().into(),
                    ty: inode.entry_type(),
                    size: inode.size,
                    permissions: inode.permissions,
                    created_at: inode.created_at,
                    modified_at: inode.modified_at,
                }
            })
            .collect();

        Ok(contents)
    }

    /// 已用空间每次由位图现算
    pub fn status(&self) -> FsStatus {
        let block_size = self.config.block_bytes as u64;
        let total_blocks = self.bitmap.capacity() as u64;
        let free_blocks = self.bitmap.free() as u64;

        FsStatus {
            total_space: total_blocks * block_size,
            used_space: self.bitmap.used() as u64 * block_size,
            free_space: free_blocks * block_size,
            total_files: self.inodes.count(DiskInodeKind::File) as u64,
            total_directories: self.inodes.count(DiskInodeKind::Directory) as u64,
            strategy: self.strategy,
            block_size,
            total_blocks,
            free_blocks,
        }
    }

    /// 文件创建时记录下的物理布局
    pub fn file_addresses(&self, path: &str) -> vfs::Result<FileAddresses> {
        let id = directory::resolve(&self.disk, &self.inodes, path)?;
        let inode = self.inodes.get(id);

        let mut addresses = FileAddresses {
            path: path.into(),
            strategy: inode.allocation.strategy(),
            contiguous: None,
            linked: None,
            indexed: None,
            blocks: strategy::blocks(&inode.allocation, inode.size, &self.disk)
                .into_iter()
                .map(u32::from)
                .collect(),
        };
        match inode.allocation {
            Allocation::Contiguous { start, count } => {
                addresses.contiguous = Some(ContiguousExtent {
                    start: start.into(),
                    count,
                })
            }
            Allocation::Linked { start, end } => {
                addresses.linked = Some(LinkedChain {
                    start: start.into(),
                    end: end.into(),
                })
            }
            Allocation::Indexed { index_block } => addresses.indexed = Some(index_block.into()),
        }

        Ok(addresses)
    }

    /// 只影响此后创建的文件
    pub fn set_strategy(&mut self, strategy: AllocStrategy) {
        let now = self.clock.now();
        let previous = core::mem::replace(&mut self.strategy, strategy);
        self.log.record(
            now,
            Operation::SetStrategy,
            "/",
            Outcome::Success,
            format!("{previous} -> {strategy}"),
        );
    }

    #[inline]
    pub fn strategy(&self) -> AllocStrategy {
        self.strategy
    }

    pub fn stat(&self, path: &str) -> vfs::Result<Stat> {
        let id = directory::resolve(&self.disk, &self.inodes, path)?;
        let inode = self.inodes.get(id);
        let blocks = strategy::footprint(&inode.allocation, inode.size, &self.disk).len();

        Ok(Stat {
            inode: u32::from(id).into(),
            mode: inode.entry_type(),
            permissions: inode.permissions,
            links: inode.links,
            block_size: self.config.block_bytes as u64,
            blocks: blocks as u64,
            size: inode.size,
            created_at: inode.created_at,
            modified_at: inode.modified_at,
        })
    }

    pub fn logs(&self, filter: &LogFilter) -> Vec<LogEntry> {
        self.log.query(filter)
    }

    #[inline]
    pub fn log_entries(&self) -> &[LogEntry] {
        self.log.entries()
    }

    /// 读出原始块，编号越界时返回`None`
    pub fn read_block(&self, block: BlockId) -> Option<Vec<u8>> {
        (block.index() < self.disk.blocks()).then(|| self.disk.read_block(block.index()))
    }

    #[inline]
    pub fn config(&self) -> &FsConfig {
        &self.config
    }

    /// 根目录块不受位图管辖
    #[inline]
    pub fn root_block(&self) -> BlockId {
        BlockId::new(self.bitmap.capacity() as u32)
    }

    /// 逐个遍历在用索引节点的分配描述，与位图对账
    pub fn audit(&self) -> AuditReport {
        let mut owners: BTreeMap<BlockId, usize> = BTreeMap::new();
        for (id, inode) in self.inodes.live() {
            if id.is_root() {
                continue;
            }
            for block in strategy::footprint(&inode.allocation, inode.size, &self.disk) {
                *owners.entry(block).or_default() += 1;
            }
        }

        let mut report = AuditReport {
            owned: owners.len(),
            allocated: self.bitmap.used(),
            ..Default::default()
        };
        for (&block, &count) in &owners {
            if count > 1 {
                report.duplicates.push(block);
            }
            if block.index() >= self.bitmap.capacity() || !self.bitmap.is_allocated(block) {
                report.unallocated.push(block);
            }
        }
        report.leaked = (0..self.bitmap.capacity() as u32)
            .map(BlockId::new)
            .filter(|&block| self.bitmap.is_allocated(block) && !owners.contains_key(&block))
            .collect();

        if !report.is_consistent() {
            log::error!("audit: {report:?}");
        }
        report
    }
}

impl SimFileSystem {
    fn init_root(&mut self, now: u64) {
        let root = DiskInode::new(
            DiskInodeKind::Directory,
            0,
            Permission::dir_default(),
            Allocation::Contiguous {
                start: self.root_block(),
                count: 1,
            },
            now,
        );
        self.inodes.put(InodeId::ROOT, &root);
    }

    fn try_create_directory(
        &mut self,
        path: &str,
        permissions: Permissions,
        now: u64,
    ) -> vfs::Result<InodeId> {
        let (parent, name) = self.vacant(path)?;

        let id = self
            .inodes
            .alloc(DiskInodeKind::Directory)
            .ok_or(vfs::Error::NoInode)?;
        let Some(block) = self.bitmap.alloc() else {
            self.inodes.free(id);
            return Err(vfs::Error::NoSpace);
        };
        let allocation = Allocation::Contiguous {
            start: block,
            count: 1,
        };
        self.inodes.put(
            id,
            &DiskInode::new(DiskInodeKind::Directory, 0, permissions, allocation, now),
        );

        if let Err(err) =
            directory::add_entry(&mut self.disk, &mut self.inodes, parent, id, name, now)
        {
            strategy::release(&allocation, 0, &mut self.bitmap, &mut self.disk);
            self.inodes.free(id);
            return Err(err);
        }

        Ok(id)
    }

    fn try_create_file(
        &mut self,
        path: &str,
        size: u64,
        permissions: Permissions,
        now: u64,
    ) -> vfs::Result<InodeId> {
        let (parent, name) = self.vacant(path)?;

        let id = self
            .inodes
            .alloc(DiskInodeKind::File)
            .ok_or(vfs::Error::NoInode)?;
        let allocation = match strategy::reserve(self.strategy, size, &mut self.bitmap, &mut self.disk)
        {
            Ok(allocation) => allocation,
            Err(err) => {
                self.inodes.free(id);
                return Err(err);
            }
        };
        self.inodes.put(
            id,
            &DiskInode::new(DiskInodeKind::File, size, permissions, allocation, now),
        );

        if let Err(err) =
            directory::add_entry(&mut self.disk, &mut self.inodes, parent, id, name, now)
        {
            strategy::release(&allocation, size, &mut self.bitmap, &mut self.disk);
            self.inodes.free(id);
            return Err(err);
        }

        Ok(id)
    }

    /// 成功时返回释放的块数
    fn try_delete_file(&mut self, path: &str, now: u64) -> vfs::Result<usize> {
        let (parent, name, id) = self.existing(path)?;
        let inode = self.inodes.get(id);
        if inode.is_dir() {
            return Err(vfs::Error::IsADirectory);
        }

        let freed = self.release(&inode);
        self.unlink(parent, name, now)?;
        self.inodes.free(id);

        Ok(freed)
    }

    /// 成功时返回删除的索引节点数
    fn try_delete_directory(&mut self, path: &str, recursive: bool, now: u64) -> vfs::Result<usize> {
        let (parent, name, id) = self.existing(path)?;
        let inode = self.inodes.get(id);
        if !inode.is_dir() {
            return Err(vfs::Error::IsAFile);
        }
        if inode.size > 0 && !recursive {
            return Err(vfs::Error::DirectoryNotEmpty);
        }

        let removed = self.purge_children(id);
        self.release(&inode);
        self.unlink(parent, name, now)?;
        self.inodes.free(id);

        Ok(removed + 1)
    }

    /// 深度优先释放目录下的一切；目录自身的目录项块随后整块清零，
    /// 因此不逐条删除子目录项
    fn purge_children(&mut self, dir: InodeId) -> usize {
        let mut removed = 0;

        for entry in directory::entries(&self.disk, &self.inodes, dir) {
            let child = InodeId::new(entry.inode_id());
            let inode = self.inodes.get(child);
            if inode.is_dir() {
                removed += self.purge_children(child);
            }
            self.release(&inode);
            self.inodes.free(child);
            log::debug!("purge {:?} (inode {child}) under inode {dir}", entry.name());
            removed += 1;
        }

        removed
    }

    /// 按记录的分配形态归还块，返回块数
    fn release(&mut self, inode: &DiskInode) -> usize {
        let footprint = strategy::footprint(&inode.allocation, inode.size, &self.disk).len();
        strategy::release(&inode.allocation, inode.size, &mut self.bitmap, &mut self.disk);
        footprint
    }

    /// 块已归还后删除目录项；失败即不一致，不做修复
    fn unlink(&mut self, parent: InodeId, name: &str, now: u64) -> vfs::Result<()> {
        directory::remove_entry(&mut self.disk, &mut self.inodes, parent, name, now)
            .map(drop)
            .map_err(|err| {
                log::error!("blocks of {name:?} freed but its entry in inode {parent} is gone: {err}");
                vfs::Error::Inconsistent
            })
    }

    /// 待创建的路径：父目录存在且名字未被占用
    fn vacant<'p>(&self, path: &'p str) -> vfs::Result<(InodeId, &'p str)> {
        let (parent, name) = directory::resolve_parent(&self.disk, &self.inodes, path)?;
        if directory::lookup(&self.disk, &self.inodes, parent, name).is_some() {
            return Err(vfs::Error::AlreadyExists);
        }
        Ok((parent, name))
    }

    /// 已存在的路径：(父目录, 名字, 自身)
    fn existing<'p>(&self, path: &'p str) -> vfs::Result<(InodeId, &'p str, InodeId)> {
        let (parent, name) =
            directory::resolve_parent(&self.disk, &self.inodes, path).map_err(|err| match err {
                vfs::Error::ParentNotFound => vfs::Error::NotFound,
                err => err,
            })?;
        let id = directory::lookup(&self.disk, &self.inodes, parent, name)
            .ok_or(vfs::Error::NotFound)?;
        Ok((parent, name, id))
    }
}

impl fmt::Debug for SimFileSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimFileSystem")
            .field("config", &self.config)
            .field("strategy", &self.strategy)
            .field("used_blocks", &self.bitmap.used())
            .field("log_len", &self.log.len())
            .finish_non_exhaustive()
    }
}

/// 操作结果 → 日志的结论与细节
fn summarize<T>(result: &vfs::Result<T>, detail: impl FnOnce(&T) -> String) -> (Outcome, String) {
    match result {
        Ok(value) => (Outcome::Success, detail(value)),
        Err(err) if err.is_capacity() => (Outcome::Failure, format!("{err} (capacity exhausted)")),
        Err(err) => (Outcome::Failure, err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use vfs::{Operation, Outcome, Permission};

    use super::SimFileSystem;
    use crate::clock::TickClock;
    use crate::config::FsConfig;
    use crate::layout::InodeId;

    fn setup() -> SimFileSystem {
        SimFileSystem::with_clock(FsConfig::with_blocks(16, 512), TickClock::default()).unwrap()
    }

    #[test]
    fn unlink_missing_entry_is_inconsistent() {
        let mut fs = setup();
        fs.create_file("/kept", 100, Permission::file_default())
            .unwrap();
        let status = fs.status();
        let root_entries = fs.inodes.get(InodeId::ROOT).size;

        assert_eq!(
            fs.unlink(InodeId::ROOT, "ghost", 0),
            Err(vfs::Error::Inconsistent)
        );
        assert_eq!(fs.inodes.get(InodeId::ROOT).size, root_entries);
        assert_eq!(fs.status(), status);
        assert!(fs.audit().is_consistent());
    }

    #[test]
    fn capacity_failures_are_tagged() {
        let mut fs = setup();
        let _ = fs.create_file("/huge", 17 * 512, Permission::file_default());
        let _ = fs.create_file("/", 1, Permission::file_default());

        let failures: Vec<_> = fs
            .log_entries()
            .iter()
            .map(|entry| (entry.operation, entry.outcome, entry.detail.clone()))
            .collect();
        assert_eq!(
            failures,
            [
                (
                    Operation::CreateFile,
                    Outcome::Failure,
                    String::from("no space left on device (capacity exhausted)")
                ),
                (Operation::CreateFile, Outcome::Failure, String::from("invalid path")),
            ]
        );
    }
}
