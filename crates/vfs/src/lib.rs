//! 虚拟文件系统契约
//!
//! procfs 挂接到宿主 VFS 时需要实现/使用的接口：
//!
//! - [`Inode`] trait - 索引节点接口
//! - [`FileSystem`] trait - 文件系统接口
//! - [`FsError`] - POSIX 兼容的错误码

#![no_std]

extern crate alloc;

mod adapter;
pub mod error;
mod file_system;
mod inode;

pub use adapter::{d_type_to_inode_type, inode_type_to_d_type};
pub use error::FsError;
pub use file_system::{FileSystem, StatFs};
pub use inode::{DirEntry, FileMode, Inode, InodeMetadata, InodeType};

pub use uapi::time::TimeSpec;
