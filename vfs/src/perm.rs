use enumflags2::{BitFlags, bitflags};

/// 仅作记录，引擎不做权限检查
pub type Permissions = BitFlags<Permission>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[bitflags]
#[repr(u16)]
pub enum Permission {
    OtherExec = 0o001,
    OtherWrite = 0o002,
    OtherRead = 0o004,
    GroupExec = 0o010,
    GroupWrite = 0o020,
    GroupRead = 0o040,
    OwnerExec = 0o100,
    OwnerWrite = 0o200,
    OwnerRead = 0o400,
}

impl Permission {
    /// 从八进制模式构造，多余的位被丢弃
    #[inline]
    pub fn from_mode(mode: u16) -> Permissions {
        BitFlags::from_bits_truncate(mode)
    }

    /// rwxr-xr-x
    #[inline]
    pub fn dir_default() -> Permissions {
        Self::from_mode(0o755)
    }

    /// rw-r--r--
    #[inline]
    pub fn file_default() -> Permissions {
        Self::from_mode(0o644)
    }
}

#[cfg(test)]
mod tests {
    use super::Permission;

    #[test]
    fn mode_round_trip() {
        let perms = Permission::from_mode(0o755);
        assert!(perms.contains(Permission::OwnerWrite));
        assert!(!perms.contains(Permission::GroupWrite));
        assert_eq!(perms.bits(), 0o755);

        // 粘滞位等不属于权限的位会被截掉
        assert_eq!(Permission::from_mode(0o1777).bits(), 0o777);
    }
}
