//! 活动节点与节点缓存

mod cache;
mod id;

pub use cache::{CreationState, NodeCache};
pub use id::{NO_OBJECT, NO_PID, NodeId};

use alloc::sync::Arc;

use crate::structure::{NodeType, StructureNode, StructureTree};

/// 挂载编号
pub type MountId = u64;

/// 活动节点：一个已具体化的目录项
///
/// 由 [`NodeCache`] 创建并按 `(mount_id, id)` 去重。挂接的 vnode 与创建状态保存在缓存表项里，
/// 受缓存锁保护。
#[derive(Debug)]
pub struct ProcNode {
    mount_id: MountId,
    id: NodeId,
    tree: Arc<StructureTree>,
    generation: u64,
}

impl ProcNode {
    pub(crate) fn new(mount_id: MountId, id: NodeId, tree: Arc<StructureTree>, generation: u64) -> Self {
        Self {
            mount_id,
            id,
            tree,
            generation,
        }
    }

    /// 所属挂载
    pub fn mount_id(&self) -> MountId {
        self.mount_id
    }

    /// 节点身份
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// 本次具体化的代数，每次创建都不同
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 所在结构树
    pub fn tree(&self) -> &Arc<StructureTree> {
        &self.tree
    }

    /// 对应的结构节点
    pub fn structure(&self) -> &StructureNode {
        self.tree.node(self.id.base_id)
    }

    /// 目录项类型
    pub fn node_type(&self) -> NodeType {
        self.structure().node_type
    }
}
