/// 名字的最大字节数，最后一字节留给 \0
pub const NAME_MAX_LEN: usize = 27;

/// 文件系统项的元信息
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirEntry {
    name: [u8; NAME_MAX_LEN + 1],
    inode_id: u32,
}

impl DirEntry {
    /// 元信息大小恒为32字节
    pub const SIZE: usize = 32;

    /// 名字合法性由路径层保证
    #[inline]
    pub fn new(name: &str, inode_id: u32) -> Self {
        let bytes = name.as_bytes();
        assert!(bytes.len() <= NAME_MAX_LEN, "entry name too long: {name}");
        let mut name = [0; NAME_MAX_LEN + 1];
        name[..bytes.len()].copy_from_slice(bytes);

        Self { name, inode_id }
    }

    pub fn name(&self) -> &str {
        let len = self
            .name
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(NAME_MAX_LEN);
        core::str::from_utf8(&self.name[..len]).unwrap_or_default()
    }

    #[inline]
    pub fn inode_id(&self) -> u32 {
        self.inode_id
    }

    /// 0号是根目录，不可能作为子项出现，所以表示空槽位
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inode_id == 0
    }

    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0; Self::SIZE];
        buf[..NAME_MAX_LEN + 1].copy_from_slice(&self.name);
        buf[NAME_MAX_LEN + 1..].copy_from_slice(&self.inode_id.to_le_bytes());
        buf
    }

    pub fn decode(buf: &[u8]) -> Self {
        assert_eq!(buf.len(), Self::SIZE);

        let mut name = [0; NAME_MAX_LEN + 1];
        name.copy_from_slice(&buf[..NAME_MAX_LEN + 1]);
        let mut inode_id = [0; 4];
        inode_id.copy_from_slice(&buf[NAME_MAX_LEN + 1..]);

        Self {
            name,
            inode_id: u32::from_le_bytes(inode_id),
        }
    }
}
