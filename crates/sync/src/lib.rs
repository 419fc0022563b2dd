//! 同步原语
//!
//! 为 procfs 相关 crate 提供锁与阻塞等待原语：
//!
//! - [`SpinLock`] - 关中断的自旋互斥锁（基于 `lock_api`）
//! - [`IntrGuard`] - 中断状态的 RAII 保护器
//! - [`WaitQueue`] - 基于纪元计数的等待队列，用于"一个线程创建、其余线程等待"的交接
//!
//! # 架构与调度依赖
//!
//! 中断控制通过 [`ArchOps`] 抽象，阻塞/唤醒通过 [`SchedOps`] 抽象。
//! 使用前必须分别调用 [`register_arch_ops`] 与 [`register_sched_ops`] 注册实现。

#![no_std]

extern crate alloc;

mod intr_guard;
mod raw_spin_lock;
mod spin_lock;
mod wait_queue;

pub use intr_guard::IntrGuard;
pub use raw_spin_lock::RawSpinLock;
pub use spin_lock::{SpinLock, SpinLockGuard};
pub use wait_queue::{WaitQueue, WaitTicket};

use core::sync::atomic::{AtomicUsize, Ordering};

/// 架构相关操作的 trait
///
/// 由内核实现并注册，提供本地中断控制。
pub trait ArchOps: Send + Sync {
    /// 读取并禁用中断，返回之前的状态
    ///
    /// # Safety
    /// 调用者必须确保在适当的上下文中调用
    unsafe fn read_and_disable_interrupts(&self) -> usize;

    /// 恢复中断状态
    ///
    /// # Safety
    /// flags 必须是之前 read_and_disable_interrupts 返回的值
    unsafe fn restore_interrupts(&self, flags: usize);
}

/// 调度相关操作的 trait
///
/// [`WaitQueue`] 通过它让当前任务睡眠、唤醒其它任务。
///
/// `block_current` 必须具有 park/unpark 语义：若 `wake(id)` 先于 `id` 对应任务的
/// `block_current` 发生，则随后的 `block_current` 立即返回。允许虚假唤醒。
pub trait SchedOps: Send + Sync {
    /// 当前任务的标识
    fn current_task_id(&self) -> usize;

    /// 阻塞当前任务，直到被 [`SchedOps::wake`] 唤醒
    fn block_current(&self);

    /// 唤醒指定任务
    fn wake(&self, task_id: usize);
}

static ARCH_OPS_DATA: AtomicUsize = AtomicUsize::new(0);
static ARCH_OPS_VTABLE: AtomicUsize = AtomicUsize::new(0);

static SCHED_OPS_DATA: AtomicUsize = AtomicUsize::new(0);
static SCHED_OPS_VTABLE: AtomicUsize = AtomicUsize::new(0);

/// 注册架构操作实现
///
/// # Safety
/// 必须在任何锁被使用之前调用，且只能调用一次
pub unsafe fn register_arch_ops(ops: &'static dyn ArchOps) {
    let ptr = ops as *const dyn ArchOps;
    // SAFETY: fat pointer 的布局是 (data, vtable)
    let (data, vtable) = unsafe { core::mem::transmute::<*const dyn ArchOps, (usize, usize)>(ptr) };
    ARCH_OPS_VTABLE.store(vtable, Ordering::Release);
    ARCH_OPS_DATA.store(data, Ordering::Release);
}

/// 注册调度操作实现
///
/// # Safety
/// 必须在任何 [`WaitQueue`] 被使用之前调用，且只能调用一次
pub unsafe fn register_sched_ops(ops: &'static dyn SchedOps) {
    let ptr = ops as *const dyn SchedOps;
    // SAFETY: 同 register_arch_ops
    let (data, vtable) =
        unsafe { core::mem::transmute::<*const dyn SchedOps, (usize, usize)>(ptr) };
    SCHED_OPS_VTABLE.store(vtable, Ordering::Release);
    SCHED_OPS_DATA.store(data, Ordering::Release);
}

#[inline]
pub(crate) fn arch_ops() -> &'static dyn ArchOps {
    let data = ARCH_OPS_DATA.load(Ordering::Acquire);
    let vtable = ARCH_OPS_VTABLE.load(Ordering::Acquire);
    if data == 0 {
        panic!("sync: ArchOps not registered, call register_arch_ops first");
    }
    // SAFETY: data 和 vtable 是通过 register_arch_ops 设置的有效指针
    unsafe { &*core::mem::transmute::<(usize, usize), *const dyn ArchOps>((data, vtable)) }
}

#[inline]
pub(crate) fn sched_ops() -> &'static dyn SchedOps {
    let data = SCHED_OPS_DATA.load(Ordering::Acquire);
    let vtable = SCHED_OPS_VTABLE.load(Ordering::Acquire);
    if data == 0 {
        panic!("sync: SchedOps not registered, call register_sched_ops first");
    }
    // SAFETY: data 和 vtable 是通过 register_sched_ops 设置的有效指针
    unsafe { &*core::mem::transmute::<(usize, usize), *const dyn SchedOps>((data, vtable)) }
}
