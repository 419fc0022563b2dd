//! 自旋锁封装
//!
//! ```ignore
//! let lock = SpinLock::new(0);
//! {
//!     let mut guard = lock.lock(); // 获取锁，禁用中断
//!     *guard += 1;
//! } // 离开作用域，释放锁并恢复中断状态
//! ```

use crate::raw_spin_lock::RawSpinLock;

/// 提供对数据互斥访问的关中断自旋锁。
pub type SpinLock<T> = lock_api::Mutex<RawSpinLock, T>;

/// [`SpinLock`] 的 RAII 守卫。
pub type SpinLockGuard<'a, T> = lock_api::MutexGuard<'a, RawSpinLock, T>;
