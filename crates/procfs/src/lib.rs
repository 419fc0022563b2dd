//! # 进程信息伪文件系统 (procfs)
//!
//! 把内核进程表以 `/proc/<pid>/...` 的形式暴露出来。本 crate 只负责节点身份与查找：
//!
//! - [`structure`]: 静态结构树，描述每一种目录项，注册文件系统类型时构建一次
//! - [`node`]: 节点身份 [`NodeId`]、活动节点 [`ProcNode`] 以及节点缓存 [`NodeCache`]
//! - [`size`]: 合成大小与属性
//! - [`readdir`]: 可续读的目录枚举
//! - [`lookup`]: 路径分量解析
//! - [`mount`]: 文件系统类型注册、挂载与卸载
//! - [`vnode`]: 与宿主 VFS 对接的 [`ProcVnode`]
//! - [`generators`]: 文件内容与符号链接目标
//!
//! 进程、线程和文件描述符信息全部通过调用方传入的 [`ProcOps`] 获取。

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

pub mod config;
pub mod context;
pub mod generators;
pub mod lookup;
pub mod mount;
pub mod node;
pub mod ops;
pub mod readdir;
pub mod size;
pub mod structure;
pub mod vnode;

#[cfg(test)]
mod tests;

pub use context::ProcContext;
pub use lookup::{LookupTarget, get_parent_node_id, resolve_component};
pub use mount::{MountOptions, ProcMount, ProcfsType};
pub use node::{CreationState, MountId, NO_OBJECT, NO_PID, NodeCache, NodeId, ProcNode};
pub use ops::{
    CpuInfo, FdInfo, FdKind, FdSlot, FdTableGuard, LoadAverage, PartitionInfo, Pid, ProcOps,
    ProcessCredential, ProcessHandle, ThreadId, ThreadInfo,
};
pub use readdir::{ReadDir, ReadDirError, read_directory};
pub use size::{node_attributes, node_size};
pub use structure::{
    BaseId, NodeFamily, NodeSpec, NodeType, ReadKind, SizeKind, StructureFlags, StructureNode,
    StructureTree, TreeBuilder, build_tree,
};
pub use vnode::ProcVnode;
