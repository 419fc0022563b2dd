//! 挂载上下文与访问控制

use alloc::sync::Arc;
use uapi::cred::Credential;

use crate::mount::MountOptions;
use crate::node::{NO_PID, NodeId};
use crate::ops::{Pid, ProcOps, ProcessHandle};
use crate::structure::{StructureFlags, StructureNode};

/// 一次操作所需的挂载上下文：进程目录接口与挂载选项
#[derive(Clone, Copy)]
pub struct ProcContext<'a> {
    ops: &'a dyn ProcOps,
    options: MountOptions,
}

impl<'a> ProcContext<'a> {
    /// 构造上下文
    pub fn new(ops: &'a dyn ProcOps, options: MountOptions) -> Self {
        Self { ops, options }
    }

    /// 进程目录接口
    pub fn ops(&self) -> &'a dyn ProcOps {
        self.ops
    }

    /// 挂载选项
    pub fn options(&self) -> MountOptions {
        self.options
    }

    /// 对 `cred` 是否启用进程访问控制
    ///
    /// 挂载时带了 `noprocperms` 或调用者是超级用户时不检查。
    pub fn checks_enabled(&self, cred: &Credential) -> bool {
        !self
            .options
            .contains(MountOptions::SKIP_PROCESS_PERMISSION_CHECKS)
            && !self.ops.is_superuser(cred)
    }

    /// 列举进程时使用的过滤凭证，`None` 表示全部可见
    pub fn visibility_filter<'c>(&self, cred: &'c Credential) -> Option<&'c Credential> {
        self.checks_enabled(cred).then_some(cred)
    }

    /// `cred` 能否看到 `process`
    pub fn can_see(&self, cred: &Credential, process: &dyn ProcessHandle) -> bool {
        !self.checks_enabled(cred) || self.ops.can_access(cred, process)
    }

    /// 查找进程，并要求 `cred` 能看到它
    pub fn find_visible(&self, cred: &Credential, pid: Pid) -> Option<Arc<dyn ProcessHandle>> {
        self.ops
            .find_process(pid)
            .filter(|process| self.can_see(cred, process.as_ref()))
    }

    /// 目录 `dir` 下的进程相关子项 `child` 是否对 `cred` 隐藏
    ///
    /// 目录属于某个进程、启用了访问控制且调用者不能访问该进程时隐藏；进程已消失也视为隐藏。
    pub fn hides_child(&self, cred: &Credential, dir: &NodeId, child: &StructureNode) -> bool {
        child.flags.contains(StructureFlags::PROCESS_RELATED)
            && dir.owning_pid != NO_PID
            && self.checks_enabled(cred)
            && !self
                .ops
                .find_process(dir.owning_pid)
                .is_some_and(|process| self.ops.can_access(cred, process.as_ref()))
    }
}
