//! 目录枚举
//!
//! 每次调用都从第一个子项重新遍历，用一个位置计数器累计每条记录的长度，
//! 只有位置不小于游标的记录才真正写入缓冲区。这样游标只是一个字节偏移，
//! 不需要在两次调用之间保存任何状态。
//!
//! 记录格式见 [`uapi::fs`]。

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use core::fmt::Write;

use uapi::cred::Credential;
use uapi::fs::{DT_DIR, DT_LNK, DT_REG, Dirent, dirent_record_len};
use vfs::FsError;

use crate::config::MAX_COMM_LEN;
use crate::context::ProcContext;
use crate::lookup::get_parent_node_id;
use crate::node::{NO_OBJECT, NodeId, ProcNode};
use crate::ops::{FdTableGuard, ProcessHandle};
use crate::structure::{NodeFamily, NodeType, StructureNode};

/// 一次枚举的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadDir {
    /// 写入的记录数
    pub entries: usize,
    /// 写入的字节数
    pub bytes: usize,
    /// 下一次调用应使用的游标
    pub next_offset: u64,
    /// 是否已经枚举完所有子项
    pub eof: bool,
}

/// 枚举中途失败：已写入的部分仍然有效
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadDirError {
    /// 失败前已完成的部分
    pub partial: ReadDir,
    /// 失败原因
    pub error: FsError,
}

enum Walk {
    /// 继续下一个子项
    Next,
    /// 动态子项已展开完毕，不再遍历后续子项
    Stop,
    /// 缓冲区已满
    Full,
}

struct DirentSink<'b> {
    dest: &'b mut [u8],
    offset: u64,
    position: u64,
    written: usize,
    entries: usize,
    next_offset: u64,
}

impl<'b> DirentSink<'b> {
    fn new(dest: &'b mut [u8], offset: u64) -> Self {
        Self {
            dest,
            offset,
            position: 0,
            written: 0,
            entries: 0,
            next_offset: offset,
        }
    }

    fn emit(&mut self, ino: u64, d_type: u8, name: &[u8]) -> Walk {
        let record_len = dirent_record_len(name.len()) as u64;
        if self.position >= self.offset {
            let record = Dirent { ino, d_type, name };
            let Some(len) = record.encode(&mut self.dest[self.written..]) else {
                return Walk::Full;
            };
            self.written += len;
            self.entries += 1;
            self.next_offset = self.position + record_len;
        }
        self.position += record_len;
        Walk::Next
    }

    fn finish(&self, eof: bool) -> ReadDir {
        ReadDir {
            entries: self.entries,
            bytes: self.written,
            next_offset: self.next_offset,
            eof,
        }
    }
}

fn d_type_of(node: &StructureNode) -> u8 {
    match node.node_type.family() {
        NodeFamily::Directory => DT_DIR,
        NodeFamily::File => DT_REG,
        NodeFamily::Symlink => DT_LNK,
    }
}

/// 从游标 `offset` 开始把目录 `node` 的子项写入 `dest`
///
/// 缓冲区放不下下一条完整记录时停止，此时 `eof` 为假；用返回的 `next_offset` 再次调用即可续读。
/// 列举线程或描述符时所属进程消失会以 [`FsError::NotFound`] 中断，已写入的记录保留。
pub fn read_directory(
    ctx: &ProcContext<'_>,
    node: &ProcNode,
    offset: u64,
    dest: &mut [u8],
    cred: &Credential,
) -> Result<ReadDir, ReadDirError> {
    let tree = node.tree();
    let dir = node.structure();
    let dir_id = node.id();
    let mut sink = DirentSink::new(dest, offset);

    if !dir.node_type.is_directory() {
        return Err(ReadDirError {
            partial: sink.finish(false),
            error: FsError::NotDirectory,
        });
    }

    for child in tree.children(dir) {
        if ctx.hides_child(cred, &dir_id, child) {
            continue;
        }
        let child_id = dir_id.with_base(child.base_id);
        let walk = match child.node_type {
            NodeType::ProcessDir | NodeType::ProcessNameDir => {
                emit_processes(ctx, child, cred, &mut sink)
            }
            NodeType::ThreadDir => emit_threads(ctx, child_id, &mut sink),
            NodeType::FdDir => emit_fds(ctx, child_id, &mut sink),
            NodeType::DotEntry => Ok(sink.emit(dir_id.file_id(), DT_DIR, b".")),
            NodeType::DotDotEntry => {
                let parent = get_parent_node_id(tree, &dir_id);
                Ok(sink.emit(parent.file_id(), DT_DIR, b".."))
            }
            _ => Ok(sink.emit(child_id.file_id(), d_type_of(child), child.name.as_bytes())),
        };

        match walk {
            Ok(Walk::Next) => {}
            Ok(Walk::Stop) => break,
            Ok(Walk::Full) => return Ok(sink.finish(false)),
            Err(error) => {
                log::debug!("procfs: readdir of {:?} interrupted: {:?}", dir_id, error);
                return Err(ReadDirError {
                    partial: sink.finish(false),
                    error,
                });
            }
        }
    }

    Ok(sink.finish(true))
}

fn emit_processes(
    ctx: &ProcContext<'_>,
    child: &StructureNode,
    cred: &Credential,
    sink: &mut DirentSink<'_>,
) -> Result<Walk, FsError> {
    let by_name = child.node_type == NodeType::ProcessNameDir;
    let d_type = d_type_of(child);

    for pid in ctx.ops().visible_pids(ctx.visibility_filter(cred)) {
        let name = if by_name {
            // 进程可能在列举之后消失
            let Some(process) = ctx.ops().find_process(pid) else {
                continue;
            };
            process_name_entry(pid, process.as_ref())
        } else {
            pid.to_string()
        };
        let id = NodeId::new(child.base_id, pid, NO_OBJECT);
        if let Walk::Full = sink.emit(id.file_id(), d_type, name.as_bytes()) {
            return Ok(Walk::Full);
        }
    }
    Ok(Walk::Stop)
}

fn emit_threads(
    ctx: &ProcContext<'_>,
    id: NodeId,
    sink: &mut DirentSink<'_>,
) -> Result<Walk, FsError> {
    let process = ctx
        .ops()
        .find_process(id.owning_pid)
        .ok_or(FsError::NotFound)?;

    for tid in process.thread_ids() {
        let name = tid.to_string();
        if let Walk::Full = sink.emit(id.with_object(tid).file_id(), DT_DIR, name.as_bytes()) {
            return Ok(Walk::Full);
        }
    }
    Ok(Walk::Stop)
}

fn emit_fds(ctx: &ProcContext<'_>, id: NodeId, sink: &mut DirentSink<'_>) -> Result<Walk, FsError> {
    let process: Arc<dyn ProcessHandle> = ctx
        .ops()
        .find_process(id.owning_pid)
        .ok_or(FsError::NotFound)?;

    let mut fd = 0;
    loop {
        // 每检查一个槽位就放开表锁，写记录时不持锁
        let open = {
            let table = FdTableGuard::lock(process.as_ref());
            if fd >= table.slot_count() {
                break;
            }
            table.is_open(fd)
        };
        if open {
            let name = fd.to_string();
            let fd_id = id.with_object(fd as u64);
            if let Walk::Full = sink.emit(fd_id.file_id(), DT_DIR, name.as_bytes()) {
                return Ok(Walk::Full);
            }
        }
        fd += 1;
    }
    Ok(Walk::Stop)
}

/// `byname/` 下的目录项名：`"<pid> <comm>"`，进程名截断到 [`MAX_COMM_LEN`] 个字符
pub(crate) fn process_name_entry(pid: i32, process: &dyn ProcessHandle) -> String {
    let mut name = String::new();
    let _ = write!(name, "{} ", pid);
    name.extend(process.comm().chars().take(MAX_COMM_LEN));
    name
}
