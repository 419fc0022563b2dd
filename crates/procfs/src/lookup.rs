//! 路径分量解析
//!
//! 把目录节点下的一个名字解析成子节点的 [`NodeId`]。按顺序扫描结构树中的子项：
//! 静态子项按名字精确匹配，文件描述符目录不匹配时继续扫描，
//! 进程目录、线程目录与 `byname/` 下的链接一旦扫描到就给出最终结果。

use uapi::cred::Credential;
use vfs::FsError;

use crate::context::ProcContext;
use crate::node::{NO_OBJECT, NO_PID, NodeId, ProcNode};
use crate::ops::{FdTableGuard, Pid, ThreadId};
use crate::readdir::process_name_entry;
use crate::structure::{BaseId, NodeType, StructureFlags, StructureTree};

/// 分量解析结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupTarget {
    /// `.`：目录自身
    Current,
    /// 需要通过缓存具体化的节点
    Node(NodeId),
}

/// `..` 对应的节点身份
///
/// 根的父节点是它自己。其它节点上升一级；上一级不再带 `PROCESS_RELATED` 时清除 pid，
/// 不再带 `THREAD_RELATED` 或 `FD_RELATED` 时清除对象 ID。
pub fn get_parent_node_id(tree: &StructureTree, id: &NodeId) -> NodeId {
    let node = tree.node(id.base_id);
    let Some(parent) = tree.parent(node) else {
        return *id;
    };

    let pid = if parent.flags.contains(StructureFlags::PROCESS_RELATED) {
        id.owning_pid
    } else {
        NO_PID
    };
    let object = if parent
        .flags
        .intersects(StructureFlags::THREAD_RELATED | StructureFlags::FD_RELATED)
    {
        id.owning_object_id
    } else {
        NO_OBJECT
    };
    NodeId::new(parent.base_id, pid, object)
}

/// 解析开头的十进制数字，返回数值与剩余部分
///
/// 至少要有一位数字；多位数不能以 0 开头（目录项从不这样写）；溢出视为不匹配。
pub(crate) fn parse_decimal(name: &str) -> Option<(u64, &str)> {
    let digits = name.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || (digits > 1 && name.starts_with('0')) {
        return None;
    }
    let value = name[..digits].parse::<u64>().ok()?;
    Some((value, &name[digits..]))
}

/// 整个名字都是十进制数字时返回其数值
fn parse_number(name: &str) -> Option<u64> {
    match parse_decimal(name)? {
        (value, "") => Some(value),
        _ => None,
    }
}

fn parse_pid(value: u64) -> Option<Pid> {
    Pid::try_from(value).ok()
}

/// 在目录 `dir` 中解析 `name`
///
/// 名字为空或 `dir` 不是目录时返回 [`FsError::InvalidArgument`]；无权访问与进程不存在
/// 都表现为 [`FsError::NotFound`]。
pub fn resolve_component(
    ctx: &ProcContext<'_>,
    dir: &ProcNode,
    name: &str,
    cred: &Credential,
) -> Result<LookupTarget, FsError> {
    if name.is_empty() || !dir.node_type().is_directory() {
        return Err(FsError::InvalidArgument);
    }
    if name == "." {
        return Ok(LookupTarget::Current);
    }

    let tree = dir.tree();
    let dir_id = dir.id();
    if name == ".." {
        return Ok(LookupTarget::Node(get_parent_node_id(tree, &dir_id)));
    }

    for child in tree.children(dir.structure()) {
        match child.node_type {
            NodeType::ProcessDir => {
                return resolve_process(ctx, child.base_id, name, cred).ok_or(FsError::NotFound);
            }
            NodeType::ProcessNameDir => {
                return resolve_process_name(ctx, child.base_id, name, cred)
                    .ok_or(FsError::NotFound);
            }
            NodeType::ThreadDir => {
                return resolve_thread(ctx, dir_id.with_base(child.base_id), name, cred)
                    .ok_or(FsError::NotFound);
            }
            NodeType::FdDir => {
                if ctx.hides_child(cred, &dir_id, child) {
                    continue;
                }
                if let Some(id) = resolve_fd(ctx, dir_id.with_base(child.base_id), name) {
                    return Ok(LookupTarget::Node(id));
                }
            }
            NodeType::DotEntry | NodeType::DotDotEntry => {}
            _ => {
                if child.name != name {
                    continue;
                }
                if ctx.hides_child(cred, &dir_id, child) {
                    return Err(FsError::NotFound);
                }
                return Ok(LookupTarget::Node(dir_id.with_base(child.base_id)));
            }
        }
    }

    Err(FsError::NotFound)
}

fn resolve_process(
    ctx: &ProcContext<'_>,
    base_id: BaseId,
    name: &str,
    cred: &Credential,
) -> Option<LookupTarget> {
    let pid = parse_pid(parse_number(name)?)?;
    ctx.find_visible(cred, pid)?;
    Some(LookupTarget::Node(NodeId::new(base_id, pid, NO_OBJECT)))
}

fn resolve_process_name(
    ctx: &ProcContext<'_>,
    base_id: BaseId,
    name: &str,
    cred: &Credential,
) -> Option<LookupTarget> {
    let (value, rest) = parse_decimal(name)?;
    if !rest.starts_with(' ') {
        return None;
    }
    let pid = parse_pid(value)?;
    let process = ctx.find_visible(cred, pid)?;
    if process_name_entry(pid, process.as_ref()) != name {
        return None;
    }
    Some(LookupTarget::Node(NodeId::new(base_id, pid, NO_OBJECT)))
}

fn resolve_thread(
    ctx: &ProcContext<'_>,
    id: NodeId,
    name: &str,
    cred: &Credential,
) -> Option<LookupTarget> {
    let tid: ThreadId = parse_number(name)?;
    let process = ctx.find_visible(cred, id.owning_pid)?;
    if !process.thread_ids().contains(&tid) {
        return None;
    }
    Some(LookupTarget::Node(id.with_object(tid)))
}

fn resolve_fd(ctx: &ProcContext<'_>, id: NodeId, name: &str) -> Option<NodeId> {
    let fd = usize::try_from(parse_number(name)?).ok()?;
    let process = ctx.ops().find_process(id.owning_pid)?;
    let open = FdTableGuard::lock(process.as_ref()).is_open(fd);
    open.then(|| id.with_object(fd as u64))
}
