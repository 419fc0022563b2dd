//! 静态结构树
//!
//! 结构树描述 procfs 中每一种目录项：名字、类型、标志、子项顺序以及大小/内容的计算方式。
//! 它在注册文件系统类型时构建一次，之后只读，并通过 `Arc` 在所有挂载之间共享。
//!
//! 节点存放在一个数组里，`base_id` 就是数组下标，父子关系也用下标表示。

mod builder;

pub use builder::{NodeSpec, TreeBuilder, build_tree};

use alloc::vec::Vec;
use vfs::InodeType;

/// 结构节点编号（数组下标）
pub type BaseId = u16;

/// 目录项类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    /// 文件系统根
    Root,
    /// `<pid>/` 进程目录
    ProcessDir,
    /// `<tid>/` 线程目录
    ThreadDir,
    /// 普通静态目录
    Dir,
    /// 普通文件
    File,
    /// `.`
    DotEntry,
    /// `..`
    DotDotEntry,
    /// `curproc` 符号链接
    CurrentProcessLink,
    /// `byname/` 下的 `"<pid> <comm>"` 符号链接
    ProcessNameDir,
    /// `<fd>/` 文件描述符目录
    FdDir,
    /// `cpuinfo`
    CpuInfoFile,
    /// `loadavg`
    LoadAvgFile,
    /// `partitions`
    PartitionsFile,
    /// `version`
    VersionFile,
}

/// 大小计算与 d_type 使用的类型族
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeFamily {
    /// 目录族
    Directory,
    /// 文件族
    File,
    /// 符号链接族
    Symlink,
}

impl NodeType {
    /// 所属类型族
    pub fn family(self) -> NodeFamily {
        match self {
            NodeType::Root
            | NodeType::ProcessDir
            | NodeType::ThreadDir
            | NodeType::Dir
            | NodeType::DotEntry
            | NodeType::DotDotEntry
            | NodeType::FdDir => NodeFamily::Directory,
            NodeType::CurrentProcessLink | NodeType::ProcessNameDir => NodeFamily::Symlink,
            NodeType::File
            | NodeType::CpuInfoFile
            | NodeType::LoadAvgFile
            | NodeType::PartitionsFile
            | NodeType::VersionFile => NodeFamily::File,
        }
    }

    /// 是否属于目录族
    pub fn is_directory(self) -> bool {
        self.family() == NodeFamily::Directory
    }

    /// 是否由进程表动态展开（一个结构节点对应多个目录项）
    pub fn is_dynamic(self) -> bool {
        matches!(
            self,
            NodeType::ProcessDir | NodeType::ThreadDir | NodeType::ProcessNameDir | NodeType::FdDir
        )
    }

    /// 对应的 VFS 文件类型
    pub fn inode_type(self) -> InodeType {
        match self.family() {
            NodeFamily::Directory => InodeType::Directory,
            NodeFamily::File => InodeType::File,
            NodeFamily::Symlink => InodeType::Symlink,
        }
    }
}

bitflags::bitflags! {
    /// 结构节点标志，构建时与父节点的标志取并集
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct StructureFlags: u8 {
        /// 位于某个进程目录之下
        const PROCESS_RELATED = 1 << 0;
        /// 位于某个线程目录之下，`owning_object_id` 是线程 ID
        const THREAD_RELATED = 1 << 1;
        /// 位于某个文件描述符目录之下，`owning_object_id` 是描述符编号
        const FD_RELATED = 1 << 2;
    }
}

/// 动态大小的计算方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeKind {
    /// 调用者可见的进程数
    ProcessCount,
    /// 所属进程的线程数
    ThreadCount,
    /// 所属进程已打开的描述符数
    FdCount,
}

/// 文件内容的生成方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadKind {
    /// 进程 ID
    Pid,
    /// 父进程 ID
    Ppid,
    /// 进程组 ID
    Pgid,
    /// 会话 ID
    Sid,
    /// 控制终端
    Tty,
    /// 进程概要
    ProcessInfo,
    /// 线程概要
    ThreadInfo,
    /// 文件描述符详情
    FdDetails,
    /// CPU 信息
    CpuInfo,
    /// 负载均值
    LoadAvg,
    /// 内核版本
    Version,
    /// 分区表
    Partitions,
}

/// 结构树中的一个节点
#[derive(Debug)]
pub struct StructureNode {
    /// 目录项类型
    pub node_type: NodeType,
    /// 字面名字；由 pid/tid/fd 展开的类型为空
    pub name: &'static str,
    /// 树内唯一编号
    pub base_id: BaseId,
    /// 自身标志与所有祖先标志的并集
    pub flags: StructureFlags,
    /// 父节点，根节点为 `None`
    pub parent: Option<BaseId>,
    /// 子节点，顺序即枚举顺序
    pub children: Vec<BaseId>,
    /// 动态大小
    pub size_fn: Option<SizeKind>,
    /// 内容生成方式
    pub read_fn: Option<ReadKind>,
    /// 没有 `size_fn` 的文件报告的静态大小
    pub size: u64,
}

/// 只读的结构树
#[derive(Debug)]
pub struct StructureTree {
    nodes: Vec<StructureNode>,
}

impl StructureTree {
    /// 根节点
    pub fn root(&self) -> &StructureNode {
        &self.nodes[0]
    }

    /// 按编号取节点
    ///
    /// # Panics
    /// `base_id` 不是本树分配的编号时 panic
    pub fn node(&self, base_id: BaseId) -> &StructureNode {
        &self.nodes[base_id as usize]
    }

    /// 按编号取节点，编号越界时返回 `None`
    pub fn get(&self, base_id: BaseId) -> Option<&StructureNode> {
        self.nodes.get(base_id as usize)
    }

    /// 父节点
    pub fn parent(&self, node: &StructureNode) -> Option<&StructureNode> {
        node.parent.map(|id| self.node(id))
    }

    /// 按顺序遍历子节点
    pub fn children<'a>(
        &'a self,
        node: &'a StructureNode,
    ) -> impl Iterator<Item = &'a StructureNode> + 'a {
        node.children.iter().map(move |&id| self.node(id))
    }

    /// 名字为 `name` 的静态子节点
    pub fn child_named<'a>(
        &'a self,
        node: &'a StructureNode,
        name: &str,
    ) -> Option<&'a StructureNode> {
        self.children(node)
            .find(|child| !child.node_type.is_dynamic() && child.name == name)
    }

    /// 第一个类型为 `node_type` 的子节点
    pub fn child_of_type<'a>(
        &'a self,
        node: &'a StructureNode,
        node_type: NodeType,
    ) -> Option<&'a StructureNode> {
        self.children(node).find(|child| child.node_type == node_type)
    }

    /// 节点总数
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// 树是否为空（构建出的树至少有根节点）
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// 所有节点
    pub fn iter(&self) -> impl Iterator<Item = &StructureNode> {
        self.nodes.iter()
    }
}
