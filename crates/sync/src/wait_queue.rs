//! 等待队列
//!
//! 任务先在持有"外部锁"时调用 [`WaitQueue::prepare_to_wait`] 登记自己并拿到一张
//! [`WaitTicket`]，然后释放外部锁，再调用 [`WaitQueue::wait`] 睡眠。
//! 唤醒方调用 [`WaitQueue::wake_all`] 推进纪元并唤醒全部登记者。
//!
//! 登记发生在外部锁内，纪元推进发生在队列锁内，因此"释放外部锁"与"真正睡眠"之间
//! 发生的唤醒不会丢失：`wait` 发现纪元已经变化就直接返回。

use alloc::vec::Vec;

use crate::{SpinLock, sched_ops};

/// 等待凭据，记录登记时的纪元。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a ticket must be passed to WaitQueue::wait"]
pub struct WaitTicket {
    epoch: u64,
}

#[derive(Debug)]
struct WaitQueueInner {
    epoch: u64,
    waiters: Vec<usize>,
}

/// 纪元计数的等待队列。
#[derive(Debug)]
pub struct WaitQueue {
    inner: SpinLock<WaitQueueInner>,
}

impl WaitQueue {
    /// 创建空队列。
    pub const fn new() -> Self {
        WaitQueue {
            inner: SpinLock::new(WaitQueueInner {
                epoch: 0,
                waiters: Vec::new(),
            }),
        }
    }

    /// 登记当前任务，返回用于 [`WaitQueue::wait`] 的凭据。
    pub fn prepare_to_wait(&self) -> WaitTicket {
        let task = sched_ops().current_task_id();
        let mut inner = self.inner.lock();
        if !inner.waiters.contains(&task) {
            inner.waiters.push(task);
        }
        WaitTicket { epoch: inner.epoch }
    }

    /// 睡眠直到纪元越过 `ticket`。
    pub fn wait(&self, ticket: WaitTicket) {
        loop {
            if self.inner.lock().epoch != ticket.epoch {
                return;
            }
            sched_ops().block_current();
        }
    }

    /// 推进纪元并唤醒所有登记的任务，返回被唤醒的数量。
    pub fn wake_all(&self) -> usize {
        let waiters = {
            let mut inner = self.inner.lock();
            inner.epoch = inner.epoch.wrapping_add(1);
            core::mem::take(&mut inner.waiters)
        };
        // 在队列锁之外唤醒
        for &task in &waiters {
            sched_ops().wake(task);
        }
        waiters.len()
    }

    /// 当前登记的任务数。
    pub fn waiter_count(&self) -> usize {
        self.inner.lock().waiters.len()
    }
}

impl Default for WaitQueue {
    fn default() -> Self {
        Self::new()
    }
}
