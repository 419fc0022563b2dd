//! `/proc/<pid>/threads/<tid>/info` 生成器

use alloc::format;
use alloc::vec::Vec;
use vfs::FsError;

use super::ContentGenerator;
use crate::context::ProcContext;
use crate::ops::{Pid, ThreadId};

/// 线程概要生成器
pub struct ThreadInfoGenerator {
    pid: Pid,
    tid: ThreadId,
}

impl ThreadInfoGenerator {
    /// 创建生成器（绑定到指定线程）
    pub fn new(pid: Pid, tid: ThreadId) -> Self {
        Self { pid, tid }
    }
}

impl ContentGenerator for ThreadInfoGenerator {
    fn generate(&self, ctx: &ProcContext<'_>) -> Result<Vec<u8>, FsError> {
        let process = ctx.ops().find_process(self.pid).ok_or(FsError::NotFound)?;
        let thread = process.thread_info(self.tid).ok_or(FsError::NotFound)?;

        let content = format!(
            "tid:\t{}\n\
             name:\t{}\n\
             user_time_us:\t{}\n\
             system_time_us:\t{}\n",
            thread.tid, thread.name, thread.user_time_us, thread.system_time_us,
        );
        Ok(content.into_bytes())
    }
}
