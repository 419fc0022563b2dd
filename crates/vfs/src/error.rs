//! VFS 错误类型
//!
//! 定义了与 POSIX 兼容的文件系统错误码，可通过 [`FsError::to_errno()`] 转换为系统调用错误码。

/// VFS 错误类型
///
/// 各错误码对应标准 POSIX errno 值。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FsError {
    // 文件/目录相关
    /// 文件不存在 (-ENOENT)
    NotFound,
    /// 不是目录 (-ENOTDIR)
    NotDirectory,
    /// 是目录 (-EISDIR)
    IsDirectory,

    // 权限相关
    /// 权限被拒绝 (-EACCES)
    PermissionDenied,

    // 参数相关
    /// 无效参数 (-EINVAL)
    InvalidArgument,
    /// 文件名过长 (-ENAMETOOLONG)
    NameTooLong,

    // 资源相关
    /// 内存不足 (-ENOMEM)
    OutOfMemory,
    /// 设备或资源忙 (-EBUSY)
    Busy,

    // 文件系统相关
    /// 只读文件系统 (-EROFS)
    ReadOnlyFs,
    /// 设备不存在 (-ENODEV)
    NoDevice,

    // 其他
    /// 操作不支持 (-ENOTSUP)
    NotSupported,
}

impl FsError {
    /// 转换为系统调用错误码（负数）
    pub fn to_errno(&self) -> isize {
        match self {
            FsError::NotFound => -2,
            FsError::OutOfMemory => -12,
            FsError::PermissionDenied => -13,
            FsError::Busy => -16,
            FsError::NoDevice => -19,
            FsError::NotDirectory => -20,
            FsError::IsDirectory => -21,
            FsError::InvalidArgument => -22,
            FsError::ReadOnlyFs => -30,
            FsError::NameTooLong => -36,
            FsError::NotSupported => -95,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::FsError;

    #[test]
    fn test_errno_values() {
        assert_eq!(FsError::NotFound.to_errno(), -2);
        assert_eq!(FsError::InvalidArgument.to_errno(), -22);
        assert_eq!(FsError::IsDirectory.to_errno(), -21);
        assert_eq!(FsError::OutOfMemory.to_errno(), -12);
        assert_ne!(FsError::NotSupported.to_errno(), FsError::IsDirectory.to_errno());
    }
}
