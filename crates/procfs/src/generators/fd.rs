//! `/proc/<pid>/fd/<fd>/details` 生成器

use alloc::format;
use alloc::vec::Vec;
use vfs::FsError;

use super::ContentGenerator;
use crate::context::ProcContext;
use crate::ops::{FdSlot, FdTableGuard, Pid};

/// 文件描述符详情生成器
pub struct FdDetailsGenerator {
    pid: Pid,
    fd: u64,
}

impl FdDetailsGenerator {
    /// 创建生成器（绑定到指定描述符）
    pub fn new(pid: Pid, fd: u64) -> Self {
        Self { pid, fd }
    }
}

impl ContentGenerator for FdDetailsGenerator {
    fn generate(&self, ctx: &ProcContext<'_>) -> Result<Vec<u8>, FsError> {
        let process = ctx.ops().find_process(self.pid).ok_or(FsError::NotFound)?;
        let fd = usize::try_from(self.fd).map_err(|_| FsError::NotFound)?;
        let FdSlot::Open(info) = FdTableGuard::lock(process.as_ref()).slot(fd) else {
            return Err(FsError::NotFound);
        };

        let content = format!(
            "fd:\t{}\n\
             type:\t{}\n\
             flags:\t{:#x}\n\
             offset:\t{}\n\
             path:\t{}\n",
            fd,
            info.kind.name(),
            info.flags,
            info.offset,
            info.path.as_deref().unwrap_or("-"),
        );
        Ok(content.into_bytes())
    }
}
