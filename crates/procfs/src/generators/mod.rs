//! 文件内容生成器
//!
//! 每次读取都重新生成完整内容，再按偏移量截取。结构树中 `read_fn` 决定使用哪个生成器。

mod cpuinfo;
mod fd;
mod loadavg;
mod partitions;
mod process;
mod thread;
mod version;

pub use cpuinfo::CpuInfoGenerator;
pub use fd::FdDetailsGenerator;
pub use loadavg::LoadAvgGenerator;
pub use partitions::PartitionsGenerator;
pub use process::{ProcessField, ProcessFieldGenerator, ProcessInfoGenerator};
pub use thread::ThreadInfoGenerator;
pub use version::VersionGenerator;

use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use vfs::FsError;

use crate::context::ProcContext;
use crate::node::ProcNode;
use crate::structure::{NodeType, ReadKind};

/// 动态内容生成器
pub trait ContentGenerator {
    /// 生成文件内容（每次调用时重新生成）
    fn generate(&self, ctx: &ProcContext<'_>) -> Result<Vec<u8>, FsError>;
}

/// 生成文件节点的内容
///
/// 没有 `read_fn` 的节点返回 [`FsError::NotSupported`]；所属进程、线程或描述符已消失时返回
/// [`FsError::NotFound`]。
pub fn generate(ctx: &ProcContext<'_>, node: &ProcNode) -> Result<Vec<u8>, FsError> {
    let kind = node.structure().read_fn.ok_or(FsError::NotSupported)?;
    let id = node.id();
    let read_field = |field| ProcessFieldGenerator::new(id.owning_pid, field).generate(ctx);

    match kind {
        ReadKind::Pid => read_field(ProcessField::Pid),
        ReadKind::Ppid => read_field(ProcessField::Ppid),
        ReadKind::Pgid => read_field(ProcessField::Pgid),
        ReadKind::Sid => read_field(ProcessField::Sid),
        ReadKind::Tty => read_field(ProcessField::Tty),
        ReadKind::ProcessInfo => ProcessInfoGenerator::new(id.owning_pid).generate(ctx),
        ReadKind::ThreadInfo => {
            ThreadInfoGenerator::new(id.owning_pid, id.owning_object_id).generate(ctx)
        }
        ReadKind::FdDetails => {
            FdDetailsGenerator::new(id.owning_pid, id.owning_object_id).generate(ctx)
        }
        ReadKind::CpuInfo => CpuInfoGenerator.generate(ctx),
        ReadKind::LoadAvg => LoadAvgGenerator.generate(ctx),
        ReadKind::Version => VersionGenerator.generate(ctx),
        ReadKind::Partitions => PartitionsGenerator.generate(ctx),
    }
}

/// 符号链接节点的目标
///
/// `curproc` 指向调用者的 pid；`byname/` 下的链接指向 `../<pid>`。
pub fn link_target(ctx: &ProcContext<'_>, node: &ProcNode) -> Result<String, FsError> {
    match node.node_type() {
        NodeType::CurrentProcessLink => Ok(ctx.ops().current_pid().to_string()),
        NodeType::ProcessNameDir => {
            let pid = node.id().owning_pid;
            ctx.ops().find_process(pid).ok_or(FsError::NotFound)?;
            Ok(format!("../{}", pid))
        }
        _ => Err(FsError::InvalidArgument),
    }
}

/// 从 `offset` 开始把 `data` 拷贝到 `buf`，返回拷贝的字节数
pub fn copy_at(data: &[u8], offset: usize, buf: &mut [u8]) -> usize {
    if offset >= data.len() {
        return 0;
    }
    let to_read = (data.len() - offset).min(buf.len());
    buf[..to_read].copy_from_slice(&data[offset..offset + to_read]);
    to_read
}
