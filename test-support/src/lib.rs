//! 测试支持 crate
//!
//! 为宿主机上的 `cargo test` 提供 `sync` 所需的架构/调度钩子实现。
//! 单元测试在使用任何锁之前调用一次 [`init`] 即可。

pub mod mock;

use std::sync::Once;

static INIT: Once = Once::new();

/// 注册 Mock 架构操作和基于线程 park/unpark 的调度操作（重复调用无副作用）
pub fn init() {
    INIT.call_once(|| unsafe {
        sync::register_arch_ops(&mock::arch::MOCK_ARCH_OPS);
        sync::register_sched_ops(&mock::sched::MOCK_SCHED_OPS);
    });
}
