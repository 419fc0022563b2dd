//! 活动节点缓存
//!
//! 把 `(mount_id, NodeId)` 映射到唯一的 [`ProcNode`] 及其挂接的外部对象（vnode）。
//!
//! # 单创建者协议
//!
//! 同一个键同一时刻最多只有一次创建在进行：
//!
//! 1. 第一个调用者插入一个处于 [`CreationState::AttachingObject`] 的表项，放开缓存锁后调用创建函数；
//! 2. 其它调用者发现表项正在创建，把状态标成 [`CreationState::AttachingObjectWithWaiters`]，
//!    在这次创建的等待队列上登记，放开缓存锁后睡眠；
//! 3. 创建成功时挂接 vnode、回到 [`CreationState::Idle`] 并唤醒等待者；失败时删除表项、
//!    把错误记在这次创建上再唤醒等待者，等待者返回同一个错误。
//!
//! 缓存锁从不在调用创建函数或 [`ProcOps`](crate::ProcOps) 时持有。

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU64, Ordering};

use hashbrown::HashMap;
use sync::{SpinLock, WaitQueue};
use vfs::FsError;

use super::{MountId, NodeId, ProcNode};
use crate::structure::StructureTree;

/// 表项的创建状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationState {
    /// 已挂接外部对象
    Idle,
    /// 正在创建外部对象
    AttachingObject,
    /// 正在创建外部对象，且有调用者在等待
    AttachingObjectWithWaiters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    mount_id: MountId,
    id: NodeId,
}

/// 一次创建尝试，等待者持有它的引用，表项被删除后仍可安全访问
struct AttachAttempt {
    queue: WaitQueue,
    failure: SpinLock<Option<FsError>>,
}

impl AttachAttempt {
    fn new() -> Self {
        Self {
            queue: WaitQueue::new(),
            failure: SpinLock::new(None),
        }
    }

    fn failure(&self) -> Option<FsError> {
        *self.failure.lock()
    }
}

enum EntryState<V> {
    Idle(V),
    AttachingObject,
    AttachingObjectWithWaiters,
}

impl<V> EntryState<V> {
    fn creation_state(&self) -> CreationState {
        match self {
            EntryState::Idle(_) => CreationState::Idle,
            EntryState::AttachingObject => CreationState::AttachingObject,
            EntryState::AttachingObjectWithWaiters => CreationState::AttachingObjectWithWaiters,
        }
    }
}

struct CacheEntry<V> {
    node: Arc<ProcNode>,
    state: EntryState<V>,
    attempt: Arc<AttachAttempt>,
}

/// 活动节点缓存
///
/// `V` 是挂接在节点上的外部对象，克隆它即获得一个新的外部引用。
pub struct NodeCache<V> {
    table: SpinLock<HashMap<CacheKey, CacheEntry<V>>>,
    next_generation: AtomicU64,
}

impl<V: Clone> NodeCache<V> {
    /// 创建空缓存
    pub fn new() -> Self {
        Self {
            table: SpinLock::new(HashMap::new()),
            next_generation: AtomicU64::new(1),
        }
    }

    /// 查找 `(mount_id, id)` 对应的节点，不存在时创建
    ///
    /// `tree` 是节点所在的结构树，`id.base_id` 必须是其中的节点。`create` 在不持有缓存锁的
    /// 情况下被调用，最多调用一次；它返回的错误原样传给本次调用以及所有等待这次创建的调用者。
    pub fn find_or_create<F>(
        &self,
        mount_id: MountId,
        id: NodeId,
        tree: &Arc<StructureTree>,
        create: F,
    ) -> Result<(Arc<ProcNode>, V), FsError>
    where
        F: FnOnce(&Arc<ProcNode>) -> Result<V, FsError>,
    {
        let key = CacheKey { mount_id, id };

        let mut table = loop {
            let mut table = self.table.lock();
            let Some(entry) = table.get_mut(&key) else {
                break table;
            };
            if let EntryState::Idle(vnode) = &entry.state {
                return Ok((entry.node.clone(), vnode.clone()));
            }
            entry.state = EntryState::AttachingObjectWithWaiters;
            let attempt = entry.attempt.clone();
            let ticket = attempt.queue.prepare_to_wait();
            drop(table);

            log::trace!("procfs: waiting for {:?} on mount {}", id, mount_id);
            attempt.queue.wait(ticket);
            if let Some(err) = attempt.failure() {
                return Err(err);
            }
        };

        table.try_reserve(1).map_err(|_| FsError::OutOfMemory)?;
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let node = Arc::new(ProcNode::new(mount_id, id, tree.clone(), generation));
        let attempt = Arc::new(AttachAttempt::new());
        table.insert(
            key,
            CacheEntry {
                node: node.clone(),
                state: EntryState::AttachingObject,
                attempt: attempt.clone(),
            },
        );
        drop(table);

        let result = create(&node);

        let mut table = self.table.lock();
        let current = table
            .get_mut(&key)
            .filter(|entry| entry.node.generation() == generation);
        match result {
            Ok(vnode) => {
                match current {
                    Some(entry) => entry.state = EntryState::Idle(vnode.clone()),
                    None => log::debug!(
                        "procfs: {:?} on mount {} was dropped while attaching",
                        id,
                        mount_id
                    ),
                }
                drop(table);
                attempt.queue.wake_all();
                Ok((node, vnode))
            }
            Err(err) => {
                if current.is_some() {
                    table.remove(&key);
                }
                *attempt.failure.lock() = Some(err);
                drop(table);
                let woken = attempt.queue.wake_all();
                log::debug!(
                    "procfs: creating {:?} on mount {} failed: {:?} ({} waiters)",
                    id,
                    mount_id,
                    err,
                    woken
                );
                Err(err)
            }
        }
    }

    /// 回收节点：表项仍是 `node` 这一次具体化时删除它，返回挂接的外部对象
    ///
    /// 正在等待该表项的调用者会被唤醒并重新查找。
    pub fn reclaim(&self, node: &ProcNode) -> Option<V> {
        let key = CacheKey {
            mount_id: node.mount_id(),
            id: node.id(),
        };
        let entry = {
            let mut table = self.table.lock();
            match table.get(&key) {
                Some(entry) if entry.node.generation() == node.generation() => table.remove(&key),
                _ => None,
            }
        }?;

        entry.attempt.queue.wake_all();
        log::trace!("procfs: reclaimed {:?} on mount {}", key.id, key.mount_id);
        match entry.state {
            EntryState::Idle(vnode) => Some(vnode),
            EntryState::AttachingObject | EntryState::AttachingObjectWithWaiters => None,
        }
    }

    /// 删除某个挂载的全部表项，返回删除的数量
    pub fn purge_mount(&self, mount_id: MountId) -> usize {
        let mut removed = Vec::new();
        self.table.lock().retain(|key, entry| {
            if key.mount_id == mount_id {
                removed.push(entry.attempt.clone());
                false
            } else {
                true
            }
        });
        for attempt in &removed {
            attempt.queue.wake_all();
        }
        removed.len()
    }

    /// 表项的创建状态
    pub fn state(&self, mount_id: MountId, id: NodeId) -> Option<CreationState> {
        self.table
            .lock()
            .get(&CacheKey { mount_id, id })
            .map(|entry| entry.state.creation_state())
    }

    /// 正在等待 `(mount_id, id)` 创建完成的调用者数
    pub fn waiters(&self, mount_id: MountId, id: NodeId) -> usize {
        self.table
            .lock()
            .get(&CacheKey { mount_id, id })
            .map_or(0, |entry| entry.attempt.queue.waiter_count())
    }

    /// 是否存在 `(mount_id, id)` 的表项
    pub fn contains(&self, mount_id: MountId, id: NodeId) -> bool {
        self.table.lock().contains_key(&CacheKey { mount_id, id })
    }

    /// 表项总数
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    /// 缓存是否为空
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 某个挂载的表项数
    pub fn mount_len(&self, mount_id: MountId) -> usize {
        self.table
            .lock()
            .keys()
            .filter(|key| key.mount_id == mount_id)
            .count()
    }
}

impl<V: Clone> Default for NodeCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
