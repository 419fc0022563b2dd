//! procfs 编译期配置

/// 文件系统类型名
pub const PROCFS_NAME: &str = "procfs";

/// 目录项名字的最大长度（statfs 报告值）
pub const PROCFS_MAX_NAMELEN: usize = 255;

/// 结构树中静态名字的最大长度
pub const STRUCTURE_NAME_MAX: usize = 32;

/// statfs 报告的块大小
pub const PROCFS_BLOCK_SIZE: usize = 4096;

/// 进程名（comm）最大长度，超出部分在目录项中截断
pub const MAX_COMM_LEN: usize = 16;

/// `ProcVnode::readdir` 每轮使用的缓冲区大小
pub const READDIR_BUFFER_SIZE: usize = 4096;

/// 目录权限位
pub const DIR_MODE: u32 = 0o555;

/// 普通文件权限位
pub const FILE_MODE: u32 = 0o444;

/// 符号链接权限位
pub const LINK_MODE: u32 = 0o777;

/// 负载均值的定点缩放（`LoadAverage::loads` 以百分之一为单位）
pub const LOAD_SCALE: u64 = 100;
