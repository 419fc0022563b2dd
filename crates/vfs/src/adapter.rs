//! VFS 类型与 uapi 布局之间的转换

use uapi::fs::{DT_DIR, DT_LNK, DT_REG};

use crate::InodeType;

/// [`InodeType`] 对应的目录项 `d_type`
pub fn inode_type_to_d_type(inode_type: InodeType) -> u8 {
    match inode_type {
        InodeType::File => DT_REG,
        InodeType::Directory => DT_DIR,
        InodeType::Symlink => DT_LNK,
    }
}

/// 目录项 `d_type` 对应的 [`InodeType`]，未知类型返回 `None`
pub fn d_type_to_inode_type(d_type: u8) -> Option<InodeType> {
    match d_type {
        DT_REG => Some(InodeType::File),
        DT_DIR => Some(InodeType::Directory),
        DT_LNK => Some(InodeType::Symlink),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_d_type_mapping_is_reversible() {
        for ty in [InodeType::File, InodeType::Directory, InodeType::Symlink] {
            assert_eq!(d_type_to_inode_type(inode_type_to_d_type(ty)), Some(ty));
        }
        assert_eq!(d_type_to_inode_type(0), None);
    }
}
