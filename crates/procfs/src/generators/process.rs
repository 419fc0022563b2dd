//! `/proc/<pid>/{pid,ppid,pgid,sid,tty,info}` 生成器

use alloc::format;
use alloc::vec::Vec;
use vfs::FsError;

use super::ContentGenerator;
use crate::context::ProcContext;
use crate::ops::Pid;

/// 单值进程字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessField {
    /// 进程 ID
    Pid,
    /// 父进程 ID
    Ppid,
    /// 进程组 ID
    Pgid,
    /// 会话 ID
    Sid,
    /// 控制终端，没有时为 `none`
    Tty,
}

/// 输出单个进程字段并换行
pub struct ProcessFieldGenerator {
    pid: Pid,
    field: ProcessField,
}

impl ProcessFieldGenerator {
    /// 创建生成器（绑定到指定 pid）
    pub fn new(pid: Pid, field: ProcessField) -> Self {
        Self { pid, field }
    }
}

impl ContentGenerator for ProcessFieldGenerator {
    fn generate(&self, ctx: &ProcContext<'_>) -> Result<Vec<u8>, FsError> {
        let process = ctx.ops().find_process(self.pid).ok_or(FsError::NotFound)?;
        let content = match self.field {
            ProcessField::Pid => format!("{}\n", process.pid()),
            ProcessField::Ppid => format!("{}\n", process.ppid()),
            ProcessField::Pgid => format!("{}\n", process.pgid()),
            ProcessField::Sid => format!("{}\n", process.sid()),
            ProcessField::Tty => match process.tty_name() {
                Some(tty) => format!("{}\n", tty),
                None => "none\n".into(),
            },
        };
        Ok(content.into_bytes())
    }
}

/// `/proc/<pid>/info` 生成器
pub struct ProcessInfoGenerator {
    pid: Pid,
}

impl ProcessInfoGenerator {
    /// 创建生成器（绑定到指定 pid）
    pub fn new(pid: Pid) -> Self {
        Self { pid }
    }
}

impl ContentGenerator for ProcessInfoGenerator {
    fn generate(&self, ctx: &ProcContext<'_>) -> Result<Vec<u8>, FsError> {
        let process = ctx.ops().find_process(self.pid).ok_or(FsError::NotFound)?;
        let cred = process.credential();

        let content = format!(
            "name:\t{}\n\
             pid:\t{}\n\
             ppid:\t{}\n\
             uid:\t{}\n\
             gid:\t{}\n\
             threads:\t{}\n",
            process.comm(),
            process.pid(),
            process.ppid(),
            cred.ruid,
            cred.rgid,
            process.thread_ids().len(),
        );
        Ok(content.into_bytes())
    }
}
