//! 中断保护器
//!
//! 基于 RAII 实现中断保护，在创建时禁用中断，销毁时恢复。
//!
//! 禁用中断只能阻止本地 CPU 上的"任务 vs 中断"并发，多核共享数据仍需自旋锁。

use core::mem::ManuallyDrop;

use crate::arch_ops;

/// 中断保护器。
///
/// 创建时禁用中断并保存之前的状态，销毁时恢复。
/// 也可以通过 [`IntrGuard::into_raw`] / [`IntrGuard::from_raw`] 把保存的状态
/// 暂存到别处（[`crate::RawSpinLock`] 在持锁期间就是这样做的）。
pub struct IntrGuard {
    flags: usize,
}

impl IntrGuard {
    /// 禁用中断并返回保护器。
    pub fn new() -> Self {
        // SAFETY: 保存的状态会在 drop（或 from_raw 之后的 drop）时原样恢复
        let flags = unsafe { arch_ops().read_and_disable_interrupts() };
        IntrGuard { flags }
    }

    /// 交出保存的中断状态而不恢复它。
    pub fn into_raw(self) -> usize {
        let this = ManuallyDrop::new(self);
        this.flags
    }

    /// 由 [`IntrGuard::into_raw`] 交出的状态重建保护器。
    ///
    /// # Safety
    /// `flags` 必须来自 `into_raw`，并且只能被重建一次。
    pub unsafe fn from_raw(flags: usize) -> Self {
        IntrGuard { flags }
    }
}

impl Default for IntrGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for IntrGuard {
    fn drop(&mut self) {
        // SAFETY: flags 是创建保护器时保存的状态
        unsafe { arch_ops().restore_interrupts(self.flags) };
    }
}
