//! 调度操作的 Mock 实现
//!
//! 每个宿主线程在第一次被问到 id 时分配一个任务号，并把自己的 `Thread`
//! 句柄登记下来；阻塞/唤醒直接映射到 `thread::park` / `Thread::unpark`，
//! 二者天然满足"先唤醒后睡眠立即返回"的语义。

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, Thread};

/// Mock 调度操作
pub struct MockSchedOps {
    next_id: AtomicUsize,
    threads: Mutex<Option<HashMap<usize, Thread>>>,
}

impl MockSchedOps {
    pub const fn new() -> Self {
        Self {
            next_id: AtomicUsize::new(1),
            threads: Mutex::new(None),
        }
    }

    /// 已登记的宿主线程数
    pub fn registered(&self) -> usize {
        self.threads
            .lock()
            .unwrap()
            .as_ref()
            .map_or(0, |threads| threads.len())
    }
}

impl Default for MockSchedOps {
    fn default() -> Self {
        Self::new()
    }
}

thread_local! {
    static TASK_ID: usize = {
        let id = MOCK_SCHED_OPS.next_id.fetch_add(1, Ordering::Relaxed);
        MOCK_SCHED_OPS
            .threads
            .lock()
            .unwrap()
            .get_or_insert_with(HashMap::new)
            .insert(id, thread::current());
        id
    };
}

impl sync::SchedOps for MockSchedOps {
    fn current_task_id(&self) -> usize {
        TASK_ID.with(|id| *id)
    }

    fn block_current(&self) {
        thread::park();
    }

    fn wake(&self, task_id: usize) {
        let thread = self
            .threads
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|threads| threads.get(&task_id).cloned());
        if let Some(thread) = thread {
            thread.unpark();
        }
    }
}

/// 全局 Mock 实例
pub static MOCK_SCHED_OPS: MockSchedOps = MockSchedOps::new();
