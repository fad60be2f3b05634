use std::thread;

use simfs::{FsConfig, SimFileSystem};
use vfs::{AllocStrategy, Permission};

#[test]
fn concurrent_creates() {
    let _ = env_logger::builder().is_test(true).try_init();
    let fs = SimFileSystem::shared(FsConfig::with_blocks(512, 512)).unwrap();

    thread::scope(|s| {
        for (worker, strategy) in AllocStrategy::ALL.into_iter().enumerate() {
            let fs = fs.clone();
            s.spawn(move || {
                let dir = format!("/w{worker}");
                fs.lock()
                    .create_directory(&dir, Permission::dir_default())
                    .unwrap();
                for i in 0..10 {
                    let mut fs = fs.lock();
                    fs.set_strategy(strategy);
                    fs.create_file(&format!("{dir}/{i}"), 1500, Permission::file_default())
                        .unwrap();
                }
            });
        }
    });

    let fs = fs.lock();
    let status = fs.status();
    assert_eq!(status.total_files, 30);
    assert_eq!(status.total_directories, 4);
    for worker in 0..3 {
        assert_eq!(fs.list_directory(&format!("/w{worker}")).unwrap().len(), 10);
    }

    let report = fs.audit();
    assert!(report.is_consistent(), "{report:?}");
    // 每个文件 3 个数据块，索引文件另有索引块，目录各 1 块
    assert_eq!(report.owned, 30 * 3 + 10 + 3);
}

#[test]
fn bad_config_is_rejected() {
    assert_eq!(
        SimFileSystem::new(FsConfig::with_blocks(8, 100)).map(drop),
        Err(simfs::ConfigError::BadBlockSize(100))
    );
}
