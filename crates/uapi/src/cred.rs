//! 用户凭证相关的常量和类型定义

/// 根用户的 UID
pub const ROOT_UID: u32 = 0;

/// 根用户组的 GID
pub const ROOT_GID: u32 = 0;

/// 调用者凭证
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Credential {
    /// 真实用户 ID
    pub uid: u32,
    /// 真实组 ID
    pub gid: u32,
    /// 有效用户 ID（用于权限检查）
    pub euid: u32,
    /// 有效组 ID（用于权限检查）
    pub egid: u32,
    /// 保存的用户 ID
    pub suid: u32,
    /// 保存的组 ID
    pub sgid: u32,
}

impl Credential {
    /// root 用户凭证
    pub const fn root() -> Self {
        Self::user(ROOT_UID, ROOT_GID)
    }

    /// 真实/有效/保存 ID 全部相同的普通凭证
    pub const fn user(uid: u32, gid: u32) -> Self {
        Self {
            uid,
            gid,
            euid: uid,
            egid: gid,
            suid: uid,
            sgid: gid,
        }
    }

    /// 是否为 root 用户
    pub fn is_root(&self) -> bool {
        self.euid == ROOT_UID
    }
}
