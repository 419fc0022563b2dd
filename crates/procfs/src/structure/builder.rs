//! 结构树构建

use alloc::vec::Vec;

use super::{BaseId, NodeType, ReadKind, SizeKind, StructureFlags, StructureNode, StructureTree};
use crate::config::STRUCTURE_NAME_MAX;

/// 待加入结构树的节点描述
#[derive(Debug, Clone, Copy)]
pub struct NodeSpec {
    node_type: NodeType,
    name: &'static str,
    flags: StructureFlags,
    size_fn: Option<SizeKind>,
    read_fn: Option<ReadKind>,
    size: u64,
}

impl NodeSpec {
    /// 指定类型与名字的节点
    pub const fn new(node_type: NodeType, name: &'static str) -> Self {
        Self {
            node_type,
            name,
            flags: StructureFlags::empty(),
            size_fn: None,
            read_fn: None,
            size: 0,
        }
    }

    /// 普通静态目录
    pub const fn dir(name: &'static str) -> Self {
        Self::new(NodeType::Dir, name)
    }

    /// 普通文件
    pub const fn file(name: &'static str, read_fn: ReadKind) -> Self {
        Self::new(NodeType::File, name).read_fn(read_fn)
    }

    /// 设置自身标志
    pub const fn flags(mut self, flags: StructureFlags) -> Self {
        self.flags = flags;
        self
    }

    /// 设置动态大小
    pub const fn size_fn(mut self, size_fn: SizeKind) -> Self {
        self.size_fn = Some(size_fn);
        self
    }

    /// 设置内容生成方式
    pub const fn read_fn(mut self, read_fn: ReadKind) -> Self {
        self.read_fn = Some(read_fn);
        self
    }

    /// 设置静态大小
    pub const fn size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }
}

/// 结构树构建器
///
/// 新建时已包含根节点，编号为 [`TreeBuilder::ROOT`]。
pub struct TreeBuilder {
    nodes: Vec<StructureNode>,
}

impl TreeBuilder {
    /// 根节点编号
    pub const ROOT: BaseId = 0;

    /// 只含根节点的构建器
    pub fn new() -> Self {
        let root = StructureNode {
            node_type: NodeType::Root,
            name: "",
            base_id: Self::ROOT,
            flags: StructureFlags::empty(),
            parent: None,
            children: Vec::new(),
            size_fn: None,
            read_fn: None,
            size: 0,
        };
        let mut nodes = Vec::new();
        nodes.push(root);
        Self { nodes }
    }

    /// 在 `parent` 下追加一个子节点，返回其编号
    ///
    /// # Panics
    /// `parent` 不存在、名字过长或节点数超出 [`BaseId`] 范围时 panic
    pub fn add(&mut self, parent: BaseId, spec: NodeSpec) -> BaseId {
        assert!(
            spec.name.len() <= STRUCTURE_NAME_MAX,
            "procfs: structure name {:?} too long",
            spec.name
        );
        let base_id = BaseId::try_from(self.nodes.len())
            .unwrap_or_else(|_| panic!("procfs: structure tree too large"));
        let parent_flags = self.nodes[parent as usize].flags;

        self.nodes.push(StructureNode {
            node_type: spec.node_type,
            name: spec.name,
            base_id,
            flags: spec.flags | parent_flags,
            parent: Some(parent),
            children: Vec::new(),
            size_fn: spec.size_fn,
            read_fn: spec.read_fn,
            size: spec.size,
        });
        self.nodes[parent as usize].children.push(base_id);
        base_id
    }

    /// 在目录 `dir` 下追加 `.` 与 `..`
    pub fn add_dot_entries(&mut self, dir: BaseId) {
        self.add(dir, NodeSpec::new(NodeType::DotEntry, "."));
        self.add(dir, NodeSpec::new(NodeType::DotDotEntry, ".."));
    }

    /// 追加一个目录，并为它加上 `.` 与 `..`
    pub fn add_dir(&mut self, parent: BaseId, spec: NodeSpec) -> BaseId {
        let dir = self.add(parent, spec);
        self.add_dot_entries(dir);
        dir
    }

    /// 结束构建
    pub fn build(self) -> StructureTree {
        StructureTree { nodes: self.nodes }
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 构建 procfs 的标准结构树
///
/// ```text
/// /
///   .  ..
///   byname/            "<pid> <comm>" -> ../<pid>
///   curproc            -> <调用者 pid>
///   cpuinfo loadavg partitions version
///   <pid>/
///     .  ..  pid ppid pgid sid tty info
///     fd/      .  ..  <fd>/   .  ..  details
///     threads/ .  ..  <tid>/  .  ..  info
/// ```
pub fn build_tree() -> StructureTree {
    let mut builder = TreeBuilder::new();
    let root = TreeBuilder::ROOT;
    builder.add_dot_entries(root);

    let byname = builder.add_dir(root, NodeSpec::dir("byname"));
    builder.add(
        byname,
        NodeSpec::new(NodeType::ProcessNameDir, "").size_fn(SizeKind::ProcessCount),
    );

    builder.add(root, NodeSpec::new(NodeType::CurrentProcessLink, "curproc"));
    builder.add(
        root,
        NodeSpec::new(NodeType::CpuInfoFile, "cpuinfo").read_fn(ReadKind::CpuInfo),
    );
    builder.add(
        root,
        NodeSpec::new(NodeType::LoadAvgFile, "loadavg").read_fn(ReadKind::LoadAvg),
    );
    builder.add(
        root,
        NodeSpec::new(NodeType::PartitionsFile, "partitions").read_fn(ReadKind::Partitions),
    );
    builder.add(
        root,
        NodeSpec::new(NodeType::VersionFile, "version").read_fn(ReadKind::Version),
    );

    // 进程目录必须是根的最后一个子节点：枚举到它之后不再继续
    let process = builder.add_dir(
        root,
        NodeSpec::new(NodeType::ProcessDir, "")
            .flags(StructureFlags::PROCESS_RELATED)
            .size_fn(SizeKind::ProcessCount),
    );
    for (name, kind) in [
        ("pid", ReadKind::Pid),
        ("ppid", ReadKind::Ppid),
        ("pgid", ReadKind::Pgid),
        ("sid", ReadKind::Sid),
        ("tty", ReadKind::Tty),
        ("info", ReadKind::ProcessInfo),
    ] {
        builder.add(process, NodeSpec::file(name, kind));
    }

    let fd = builder.add_dir(process, NodeSpec::dir("fd"));
    let fd_dir = builder.add_dir(
        fd,
        NodeSpec::new(NodeType::FdDir, "")
            .flags(StructureFlags::FD_RELATED)
            .size_fn(SizeKind::FdCount),
    );
    builder.add(fd_dir, NodeSpec::file("details", ReadKind::FdDetails));

    let threads = builder.add_dir(process, NodeSpec::dir("threads"));
    let thread_dir = builder.add_dir(
        threads,
        NodeSpec::new(NodeType::ThreadDir, "")
            .flags(StructureFlags::THREAD_RELATED)
            .size_fn(SizeKind::ThreadCount),
    );
    builder.add(thread_dir, NodeSpec::file("info", ReadKind::ThreadInfo));

    let tree = builder.build();
    log::debug!("procfs: structure tree built with {} nodes", tree.len());
    tree
}
