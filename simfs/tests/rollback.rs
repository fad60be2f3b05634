use simfs::{BlockId, FsConfig, SimFileSystem, TickClock};
use vfs::{AllocStrategy, DirEntryType, FsStatus, Permission};

fn setup(config: FsConfig) -> SimFileSystem {
    let _ = env_logger::builder().is_test(true).try_init();
    SimFileSystem::with_clock(config, TickClock::default()).unwrap()
}

fn word(bytes: &[u8]) -> u32 {
    u32::from_le_bytes(bytes.try_into().unwrap())
}

/// 只凭描述符与原始块内容重新数出占用的块：
/// 沿块尾指针走链，按声明大小读索引块
fn collect_owned(fs: &SimFileSystem, dir: &str, owned: &mut Vec<u32>) {
    let block_size = fs.config().block_bytes;

    for entry in fs.list_directory(dir).unwrap() {
        let path = format!("{}/{}", dir.trim_end_matches('/'), entry.name);
        let addrs = fs.file_addresses(&path).unwrap();

        if entry.ty == DirEntryType::Directory {
            owned.push(addrs.contiguous.unwrap().start);
            collect_owned(fs, &path, owned);
            continue;
        }

        let count = entry.size.div_ceil(block_size as u64) as usize;
        if let Some(extent) = addrs.contiguous {
            owned.extend((0..extent.count).map(|offset| extent.start + offset));
        } else if let Some(chain) = addrs.linked {
            let mut block = chain.start;
            while block != u32::MAX {
                owned.push(block);
                let raw = fs.read_block(BlockId::new(block)).unwrap();
                let next = word(&raw[block_size - 4..]);
                if next == u32::MAX {
                    assert_eq!(block, chain.end);
                }
                block = next;
            }
        } else if let Some(index_block) = addrs.indexed {
            owned.push(index_block);
            let raw = fs.read_block(BlockId::new(index_block)).unwrap();
            let pointers: Vec<u32> = raw.chunks_exact(4).take(count).map(word).collect();
            assert!(pointers.iter().all(|&block| block != u32::MAX));
            owned.extend(pointers);
        }
    }
}

/// 失败的调用不能改变任何计数
fn assert_untouched(fs: &SimFileSystem, before: &FsStatus) {
    assert_eq!(fs.status(), *before);
    let report = fs.audit();
    assert!(report.is_consistent(), "{report:?}");
}

#[test]
fn indexed_runs_out_midway() {
    let mut fs = setup(FsConfig::with_blocks(8, 512).strategy(AllocStrategy::Contiguous));
    fs.create_file("/head", 1024, Permission::file_default())
        .unwrap();
    fs.set_strategy(AllocStrategy::Indexed);

    // 6 块空闲：索引块 + 5 个数据块后耗尽
    let before = fs.status();
    assert_eq!(
        fs.create_file("/big", 6 * 512, Permission::file_default()),
        Err(vfs::Error::NoSpace)
    );
    assert_untouched(&fs, &before);
    assert_eq!(fs.read_file("/big"), Err(vfs::Error::NotFound));

    // 刚好装下
    fs.create_file("/fits", 5 * 512, Permission::file_default())
        .unwrap();
    assert_eq!(fs.status().free_blocks, 0);
}

#[test]
fn linked_runs_out_midway() {
    let mut fs = setup(FsConfig::with_blocks(8, 512).strategy(AllocStrategy::Linked));
    fs.create_file("/head", 1024, Permission::file_default())
        .unwrap();

    let before = fs.status();
    assert_eq!(
        fs.create_file("/long", 7 * 512, Permission::file_default()),
        Err(vfs::Error::NoSpace)
    );
    assert_untouched(&fs, &before);

    // 回滚后的块重新可用，链也能正确建立
    fs.create_file("/long", 6 * 512, Permission::file_default())
        .unwrap();
    assert_eq!(fs.file_addresses("/long").unwrap().blocks, [2, 3, 4, 5, 6, 7]);
}

#[test]
fn contiguous_never_defragments() {
    let mut fs = setup(FsConfig::with_blocks(8, 512).strategy(AllocStrategy::Contiguous));
    for i in 0..8 {
        fs.create_file(&format!("/f{i}"), 512, Permission::file_default())
            .unwrap();
    }
    for i in [1, 3, 5, 7] {
        fs.delete_file(&format!("/f{i}")).unwrap();
    }

    let before = fs.status();
    assert_eq!(before.free_blocks, 4);
    assert_eq!(
        fs.create_file("/pair", 1024, Permission::file_default()),
        Err(vfs::Error::NoSpace)
    );
    assert_untouched(&fs, &before);

    // 链接分配不需要连续的空间
    fs.set_strategy(AllocStrategy::Linked);
    fs.create_file("/pair", 1024, Permission::file_default())
        .unwrap();
    assert_eq!(fs.file_addresses("/pair").unwrap().blocks, [1, 3]);
}

#[test]
fn request_larger_than_disk() {
    let mut fs = setup(FsConfig::with_blocks(8, 512));
    for strategy in AllocStrategy::ALL {
        fs.set_strategy(strategy);
        let before = fs.status();
        assert_eq!(
            fs.create_file("/huge", 9 * 512, Permission::file_default()),
            Err(vfs::Error::NoSpace)
        );
        assert_untouched(&fs, &before);
    }
}

#[test]
fn index_block_capacity() {
    let mut fs = setup(FsConfig::with_blocks(256, 512));
    let before = fs.status();

    // 512 字节的索引块只能存 128 个编号
    assert_eq!(
        fs.create_file("/big", 129 * 512, Permission::file_default()),
        Err(vfs::Error::FileTooLarge)
    );
    assert_untouched(&fs, &before);

    fs.create_file("/max", 128 * 512, Permission::file_default())
        .unwrap();
    assert_eq!(fs.stat("/max").unwrap().blocks, 129);
}

#[test]
fn directory_full_releases_file() {
    // 64 字节的块只容得下两个目录项
    let mut fs = setup(FsConfig::with_blocks(32, 64));
    fs.create_file("/a", 10, Permission::file_default()).unwrap();
    fs.create_directory("/b", Permission::dir_default()).unwrap();

    let before = fs.status();
    assert_eq!(
        fs.create_file("/c", 100, Permission::file_default()),
        Err(vfs::Error::DirectoryFull)
    );
    assert_untouched(&fs, &before);
    assert_eq!(
        fs.create_directory("/d", Permission::dir_default()),
        Err(vfs::Error::DirectoryFull)
    );
    assert_untouched(&fs, &before);

    // 子目录另有自己的块
    fs.create_file("/b/c", 100, Permission::file_default())
        .unwrap();
}

#[test]
fn inode_table_exhausted() {
    let mut fs = setup(FsConfig::with_blocks(32, 512).max_inodes(3));
    fs.create_file("/a", 10, Permission::file_default()).unwrap();
    fs.create_directory("/b", Permission::dir_default()).unwrap();

    let before = fs.status();
    assert_eq!(
        fs.create_file("/c", 10, Permission::file_default()),
        Err(vfs::Error::NoInode)
    );
    assert_eq!(
        fs.create_directory("/c", Permission::dir_default()),
        Err(vfs::Error::NoInode)
    );
    assert_untouched(&fs, &before);

    fs.delete_file("/a").unwrap();
    fs.create_file("/c", 10, Permission::file_default()).unwrap();
}

#[test]
fn no_orphans_across_mixed_workload() {
    let mut fs = setup(FsConfig::with_blocks(96, 512));
    let sizes = [0, 1, 512, 513, 2048, 4000, 700];

    for round in 0..6 {
        let strategy = AllocStrategy::ALL[round % 3];
        fs.set_strategy(strategy);
        let dir = format!("/r{round}");
        fs.create_directory(&dir, Permission::dir_default())
            .unwrap();
        for (i, &size) in sizes.iter().enumerate() {
            // 空间不足时失败也必须干净
            let _ = fs.create_file(&format!("{dir}/f{i}"), size, Permission::file_default());
            let report = fs.audit();
            assert!(report.is_consistent(), "{report:?}");
        }
        for i in (0..sizes.len()).step_by(2) {
            let _ = fs.delete_file(&format!("{dir}/f{i}"));
        }
        if round % 2 == 1 {
            fs.delete_directory(&format!("/r{}", round - 1), true)
                .unwrap();
        }

        let report = fs.audit();
        assert!(report.is_consistent(), "{report:?}");
        assert_eq!(report.owned as u64, fs.status().used_space / 512);

        let mut owned = Vec::new();
        collect_owned(&fs, "/", &mut owned);
        let walked = owned.len();
        owned.sort_unstable();
        owned.dedup();
        assert_eq!(owned.len(), walked, "block owned twice");
        assert_eq!(walked as u64, fs.status().used_space / 512);
    }
}
