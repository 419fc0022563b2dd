//! 架构相关操作的 Mock 实现

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Mock 架构操作
///
/// 宿主机上没有真实的中断，这里只记录"中断使能"状态和关中断的嵌套次数。
pub struct MockArchOps {
    pub interrupt_state: AtomicBool,
    pub disable_count: AtomicUsize,
}

impl MockArchOps {
    pub const fn new() -> Self {
        Self {
            interrupt_state: AtomicBool::new(true),
            disable_count: AtomicUsize::new(0),
        }
    }
}

impl Default for MockArchOps {
    fn default() -> Self {
        Self::new()
    }
}

const SIE: usize = 0x2;

impl sync::ArchOps for MockArchOps {
    unsafe fn read_and_disable_interrupts(&self) -> usize {
        self.disable_count.fetch_add(1, Ordering::Relaxed);
        if self.interrupt_state.swap(false, Ordering::SeqCst) {
            SIE
        } else {
            0
        }
    }

    unsafe fn restore_interrupts(&self, flags: usize) {
        self.interrupt_state.store(flags & SIE != 0, Ordering::SeqCst);
    }
}

/// 全局 Mock 实例
pub static MOCK_ARCH_OPS: MockArchOps = MockArchOps::new();
