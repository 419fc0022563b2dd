//! 关中断自旋锁的原始实现
//!
//! 实现 `lock_api::RawMutex`，上层的 [`crate::SpinLock`] 直接由 `lock_api::Mutex` 包装得到。

use core::{
    hint,
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
};

use lock_api::{GuardNoSend, RawMutex};

use crate::intr_guard::IntrGuard;

/// 自旋锁。
///
/// 加锁时先禁用本地中断，拿到锁后把 [`IntrGuard`] 保存的中断状态存进锁内，
/// 解锁时再取出恢复。只有持锁者会读写 `saved_flags`。
/// 不可重入。
#[derive(Debug)]
pub struct RawSpinLock {
    locked: AtomicBool,
    saved_flags: AtomicUsize,
}

impl RawSpinLock {
    /// 创建一个未加锁的实例。
    pub const fn new() -> Self {
        RawSpinLock {
            locked: AtomicBool::new(false),
            saved_flags: AtomicUsize::new(0),
        }
    }
}

impl Default for RawSpinLock {
    fn default() -> Self {
        Self::new()
    }
}

// SAFETY: 只有 compare_exchange 成功的一方能进入临界区，unlock 以 Release 发布写入。
unsafe impl RawMutex for RawSpinLock {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = RawSpinLock::new();

    // 中断状态属于当前 CPU，守卫不能跨线程移动
    type GuardMarker = GuardNoSend;

    fn lock(&self) {
        let guard = IntrGuard::new();
        while self
            .locked
            .compare_exchange_weak(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            while self.locked.load(Ordering::Relaxed) {
                hint::spin_loop();
            }
        }
        self.saved_flags.store(guard.into_raw(), Ordering::Relaxed);
    }

    fn try_lock(&self) -> bool {
        let guard = IntrGuard::new();
        if self
            .locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            self.saved_flags.store(guard.into_raw(), Ordering::Relaxed);
            true
        } else {
            // guard 在这里 drop，中断状态立即恢复
            false
        }
    }

    unsafe fn unlock(&self) {
        let flags = self.saved_flags.load(Ordering::Relaxed);
        self.locked.store(false, Ordering::Release);
        // SAFETY: flags 由本次持锁时的 IntrGuard::into_raw 交出
        drop(unsafe { IntrGuard::from_raw(flags) });
    }

    fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }
}
