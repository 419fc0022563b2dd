//! `SpinLock` / `WaitQueue` 在宿主线程上的行为。

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once, OnceLock};
use std::thread::{self, Thread};
use std::time::Duration;

use sync::{ArchOps, SchedOps, SpinLock, WaitQueue};

struct TestArch {
    enabled: AtomicBool,
}

impl ArchOps for TestArch {
    unsafe fn read_and_disable_interrupts(&self) -> usize {
        self.enabled.swap(false, Ordering::SeqCst) as usize
    }

    unsafe fn restore_interrupts(&self, flags: usize) {
        self.enabled.store(flags != 0, Ordering::SeqCst);
    }
}

static TEST_ARCH: TestArch = TestArch {
    enabled: AtomicBool::new(true),
};

struct TestSched;

static NEXT_TASK: AtomicUsize = AtomicUsize::new(1);

fn threads() -> &'static Mutex<HashMap<usize, Thread>> {
    static THREADS: OnceLock<Mutex<HashMap<usize, Thread>>> = OnceLock::new();
    THREADS.get_or_init(|| Mutex::new(HashMap::new()))
}

thread_local! {
    static TASK: usize = {
        let id = NEXT_TASK.fetch_add(1, Ordering::Relaxed);
        threads().lock().unwrap().insert(id, thread::current());
        id
    };
}

impl SchedOps for TestSched {
    fn current_task_id(&self) -> usize {
        TASK.with(|id| *id)
    }

    fn block_current(&self) {
        thread::park();
    }

    fn wake(&self, task_id: usize) {
        if let Some(t) = threads().lock().unwrap().get(&task_id).cloned() {
            t.unpark();
        }
    }
}

static TEST_SCHED: TestSched = TestSched;

static INIT: Once = Once::new();

fn init_once() {
    INIT.call_once(|| unsafe {
        sync::register_arch_ops(&TEST_ARCH);
        sync::register_sched_ops(&TEST_SCHED);
    });
}

#[test]
fn test_spin_lock_counts_across_threads() {
    init_once();
    let counter = Arc::new(SpinLock::new(0usize));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let counter = counter.clone();
            thread::spawn(move || {
                for _ in 0..1000 {
                    *counter.lock() += 1;
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(*counter.lock(), 4000);
}

#[test]
fn test_spin_lock_try_lock_when_held() {
    init_once();
    let lock = SpinLock::new(());
    let guard = lock.lock();
    assert!(lock.try_lock().is_none());
    drop(guard);
    assert!(lock.try_lock().is_some());
}

#[test]
fn test_wake_before_wait_does_not_block() {
    init_once();
    let queue = WaitQueue::new();
    let ticket = queue.prepare_to_wait();
    assert_eq!(queue.wake_all(), 1);
    // 纪元已推进，wait 必须立即返回
    queue.wait(ticket);
    assert_eq!(queue.waiter_count(), 0);
}

#[test]
fn test_waiters_are_released_by_wake_all() {
    init_once();
    let queue = Arc::new(WaitQueue::new());
    let state = Arc::new(SpinLock::new(false));
    let released = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let queue = queue.clone();
            let state = state.clone();
            let released = released.clone();
            thread::spawn(move || {
                loop {
                    let ticket = {
                        let done = state.lock();
                        if *done {
                            break;
                        }
                        queue.prepare_to_wait()
                    };
                    queue.wait(ticket);
                }
                released.fetch_add(1, Ordering::SeqCst);
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(50));
    *state.lock() = true;
    queue.wake_all();

    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(released.load(Ordering::SeqCst), 3);
}
