//! 节点身份

use crate::ops::Pid;
use crate::structure::BaseId;

/// 不属于任何进程
pub const NO_PID: Pid = -1;

/// 不属于任何线程或文件描述符
pub const NO_OBJECT: u64 = u64::MAX;

const BASE_BITS: u32 = 12;
const PID_BITS: u32 = 20;
const OBJECT_BITS: u32 = 32;

/// 一个目录项的身份：所属进程、所属对象（线程 ID 或描述符编号）与结构节点
///
/// 加上挂载编号后唯一确定一个活动节点。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    /// 所属进程，无则为 [`NO_PID`]
    pub owning_pid: Pid,
    /// 所属线程 ID 或描述符编号，无则为 [`NO_OBJECT`]
    pub owning_object_id: u64,
    /// 结构节点编号
    pub base_id: BaseId,
}

impl NodeId {
    /// 构造节点身份
    pub const fn new(base_id: BaseId, owning_pid: Pid, owning_object_id: u64) -> Self {
        Self {
            owning_pid,
            owning_object_id,
            base_id,
        }
    }

    /// 不属于任何进程或对象的节点
    pub const fn global(base_id: BaseId) -> Self {
        Self::new(base_id, NO_PID, NO_OBJECT)
    }

    /// 保留 pid 与对象，换成另一个结构节点
    pub const fn with_base(self, base_id: BaseId) -> Self {
        Self::new(base_id, self.owning_pid, self.owning_object_id)
    }

    /// 换成另一个对象
    pub const fn with_object(self, owning_object_id: u64) -> Self {
        Self::new(self.base_id, self.owning_pid, owning_object_id)
    }

    /// 报告给用户的 64 位文件编号（inode 号与 `d_ino`）
    ///
    /// 布局（低位到高位）：12 位结构编号，20 位 `pid + 1`，32 位 `object + 1`。
    /// 无 pid / 无对象编码为 0。
    ///
    /// 超出各字段宽度的部分被截掉：只有 `pid < 2^20 - 1` 且对象编号 `< 2^32 - 1` 时
    /// 不同的 [`NodeId`] 才保证得到不同的编号，超出范围的身份可能与别的节点撞号。
    /// 缓存与查找以完整的 [`NodeId`] 为键，撞号只影响用户看到的 inode 号。
    pub fn file_id(&self) -> u64 {
        let base = u64::from(self.base_id) & mask(BASE_BITS);
        let pid = (i64::from(self.owning_pid) + 1) as u64 & mask(PID_BITS);
        let object = self.owning_object_id.wrapping_add(1) & mask(OBJECT_BITS);
        base | (pid << BASE_BITS) | (object << (BASE_BITS + PID_BITS))
    }
}

const fn mask(bits: u32) -> u64 {
    (1u64 << bits) - 1
}
