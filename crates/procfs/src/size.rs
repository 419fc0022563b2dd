//! 合成大小与属性
//!
//! 目录的大小是子项条目数：普通子项算 1，由进程表展开的子项按当前数量计算。
//! 文件报告动态大小或结构树中的静态大小。

use uapi::cred::{Credential, ROOT_GID, ROOT_UID};
use vfs::{FileMode, FsError, InodeMetadata, TimeSpec};

use crate::config::{DIR_MODE, FILE_MODE, LINK_MODE};
use crate::context::ProcContext;
use crate::node::{NO_PID, ProcNode};
use crate::ops::FdTableGuard;
use crate::structure::{NodeFamily, NodeType, SizeKind, StructureFlags, StructureNode, StructureTree};

/// 计算大小时实际使用的结构节点：`.` 换成所在目录，`..` 换成上一级目录
pub fn effective_structure<'t>(tree: &'t StructureTree, node: &'t StructureNode) -> &'t StructureNode {
    match node.node_type {
        NodeType::DotEntry => tree.parent(node).unwrap_or(node),
        NodeType::DotDotEntry => match tree.parent(node) {
            Some(dir) if dir.node_type != NodeType::Root => tree.parent(dir).unwrap_or(dir),
            Some(dir) => dir,
            None => node,
        },
        _ => node,
    }
}

/// 节点的合成大小
pub fn node_size(ctx: &ProcContext<'_>, node: &ProcNode, cred: &Credential) -> u64 {
    let tree = node.tree();
    let structure = effective_structure(tree, node.structure());

    if structure.node_type.is_directory() {
        tree.children(structure)
            .map(|child| {
                child
                    .size_fn
                    .map_or(1, |kind| evaluate_size(ctx, kind, node, cred))
            })
            .sum()
    } else {
        structure
            .size_fn
            .map_or(structure.size, |kind| evaluate_size(ctx, kind, node, cred))
    }
}

fn evaluate_size(ctx: &ProcContext<'_>, kind: SizeKind, node: &ProcNode, cred: &Credential) -> u64 {
    let ops = ctx.ops();
    match kind {
        SizeKind::ProcessCount => ops.visible_pids(ctx.visibility_filter(cred)).len() as u64,
        SizeKind::ThreadCount => ops
            .find_process(node.id().owning_pid)
            .map_or(0, |process| process.thread_ids().len() as u64),
        SizeKind::FdCount => ops.find_process(node.id().owning_pid).map_or(0, |process| {
            FdTableGuard::lock(process.as_ref()).open_count() as u64
        }),
    }
}

/// 节点的完整属性
///
/// 进程相关节点的属主与时间取自所属进程，所属进程已消失时返回 [`FsError::NotFound`]；
/// 其它节点属于 root，时间为挂载时间。
pub fn node_attributes(
    ctx: &ProcContext<'_>,
    node: &ProcNode,
    mount_time: TimeSpec,
    cred: &Credential,
) -> Result<InodeMetadata, FsError> {
    let structure = node.structure();
    let pid = node.id().owning_pid;

    let (uid, gid, time) =
        if structure.flags.contains(StructureFlags::PROCESS_RELATED) && pid != NO_PID {
            let process = ctx.ops().find_process(pid).ok_or(FsError::NotFound)?;
            let owner = process.credential();
            (owner.ruid, owner.rgid, process.start_time())
        } else {
            (ROOT_UID, ROOT_GID, mount_time)
        };

    let family = structure.node_type.family();
    let (type_bits, permissions, nlinks) = match family {
        NodeFamily::Directory => (FileMode::S_IFDIR, DIR_MODE, 2),
        NodeFamily::File => (FileMode::S_IFREG, FILE_MODE, 1),
        NodeFamily::Symlink => (FileMode::S_IFLNK, LINK_MODE, 1),
    };

    Ok(InodeMetadata {
        inode_no: node.id().file_id(),
        inode_type: structure.node_type.inode_type(),
        mode: type_bits | FileMode::from_bits_truncate(permissions),
        uid,
        gid,
        size: node_size(ctx, node, cred),
        atime: time,
        mtime: time,
        ctime: time,
        nlinks,
    })
}
