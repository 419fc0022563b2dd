//! 进程目录接口
//!
//! procfs 不直接访问内核的进程表，所需信息全部通过 [`ProcOps`] 与 [`ProcessHandle`] 获取。
//! 内核在注册文件系统类型时把实现传给 [`ProcfsType::register`](crate::ProcfsType::register)。

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use uapi::cred::Credential;
use uapi::time::TimeSpec;
use vfs::FsError;

/// 进程 ID
pub type Pid = i32;

/// 线程 ID
pub type ThreadId = u64;

/// 进程凭证（权限检查所需的部分）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessCredential {
    /// 真实用户 ID
    pub ruid: u32,
    /// 有效用户 ID
    pub euid: u32,
    /// 真实组 ID
    pub rgid: u32,
    /// 有效组 ID
    pub egid: u32,
    /// 保存的组 ID
    pub svgid: u32,
}

impl ProcessCredential {
    /// 所有 ID 相同的凭证
    pub const fn uniform(uid: u32, gid: u32) -> Self {
        Self {
            ruid: uid,
            euid: uid,
            rgid: gid,
            egid: gid,
            svgid: gid,
        }
    }
}

/// 线程信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadInfo {
    /// 线程 ID
    pub tid: ThreadId,
    /// 线程名
    pub name: String,
    /// 用户态时间（微秒）
    pub user_time_us: u64,
    /// 内核态时间（微秒）
    pub system_time_us: u64,
}

/// 文件描述符指向的对象种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FdKind {
    /// 文件系统对象
    Vnode,
    /// 套接字
    Socket,
    /// 管道
    Pipe,
    /// 事件队列
    Kqueue,
    /// 其它
    Other,
}

impl FdKind {
    /// 种类名称
    pub fn name(self) -> &'static str {
        match self {
            FdKind::Vnode => "vnode",
            FdKind::Socket => "socket",
            FdKind::Pipe => "pipe",
            FdKind::Kqueue => "kqueue",
            FdKind::Other => "other",
        }
    }
}

/// 已打开文件描述符的信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FdInfo {
    /// 对象种类
    pub kind: FdKind,
    /// 打开标志
    pub flags: u32,
    /// 当前偏移
    pub offset: u64,
    /// 路径（仅 vnode 有）
    pub path: Option<String>,
}

/// 文件描述符表中的一个槽位
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FdSlot {
    /// 空闲
    Empty,
    /// 已分配但尚未完成打开
    Reserved,
    /// 已打开
    Open(FdInfo),
}

impl FdSlot {
    /// 是否为已打开、非保留的描述符
    pub fn is_open(&self) -> bool {
        matches!(self, FdSlot::Open(_))
    }
}

/// CPU 信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuInfo {
    /// 厂商
    pub vendor: String,
    /// 型号名
    pub brand: String,
    /// 物理核心数
    pub physical_cores: u32,
    /// 逻辑 CPU 数
    pub logical_cpus: u32,
    /// 主频（MHz）
    pub frequency_mhz: u64,
}

/// 负载均值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadAverage {
    /// 1/5/15 分钟负载，单位为 1/[`LOAD_SCALE`](crate::config::LOAD_SCALE)
    pub loads: [u64; 3],
    /// 可运行任务数
    pub running: u32,
    /// 任务总数
    pub total: u32,
}

/// 块设备分区信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionInfo {
    /// 主设备号
    pub major: u32,
    /// 次设备号
    pub minor: u32,
    /// 1KiB 块数
    pub blocks: u64,
    /// 设备名
    pub name: String,
}

/// 单个进程的只读视图
///
/// 由 [`ProcOps::find_process`] 返回，持有期间进程对象不会被释放。
pub trait ProcessHandle: Send + Sync {
    /// 进程 ID
    fn pid(&self) -> Pid;

    /// 父进程 ID
    fn ppid(&self) -> Pid;

    /// 进程组 ID
    fn pgid(&self) -> Pid;

    /// 会话 ID
    fn sid(&self) -> Pid;

    /// 进程名
    fn comm(&self) -> String;

    /// 控制终端名
    fn tty_name(&self) -> Option<String>;

    /// 进程凭证
    fn credential(&self) -> ProcessCredential;

    /// 启动时间
    fn start_time(&self) -> TimeSpec;

    /// 所有线程 ID
    fn thread_ids(&self) -> Vec<ThreadId>;

    /// 指定线程的信息，线程不存在时返回 `None`
    fn thread_info(&self, tid: ThreadId) -> Option<ThreadInfo>;

    /// 获取文件描述符表锁
    ///
    /// 只应通过 [`FdTableGuard`] 调用。
    fn lock_fd_table(&self);

    /// 释放文件描述符表锁
    ///
    /// 只应通过 [`FdTableGuard`] 调用。
    fn unlock_fd_table(&self);

    /// 描述符表槽位数，调用者须持有表锁
    fn fd_slot_count(&self) -> usize;

    /// 读取一个槽位，调用者须持有表锁
    fn fd_slot(&self, fd: usize) -> FdSlot;
}

/// 文件描述符表锁的 RAII 保护器
pub struct FdTableGuard<'a> {
    process: &'a dyn ProcessHandle,
}

impl<'a> FdTableGuard<'a> {
    /// 锁住 `process` 的描述符表
    pub fn lock(process: &'a dyn ProcessHandle) -> Self {
        process.lock_fd_table();
        Self { process }
    }

    /// 槽位数
    pub fn slot_count(&self) -> usize {
        self.process.fd_slot_count()
    }

    /// 读取槽位
    pub fn slot(&self, fd: usize) -> FdSlot {
        if fd >= self.slot_count() {
            return FdSlot::Empty;
        }
        self.process.fd_slot(fd)
    }

    /// `fd` 是否为已打开、非保留的描述符
    pub fn is_open(&self, fd: usize) -> bool {
        self.slot(fd).is_open()
    }

    /// 已打开描述符的数量
    pub fn open_count(&self) -> usize {
        (0..self.slot_count())
            .filter(|&fd| self.process.fd_slot(fd).is_open())
            .count()
    }
}

impl Drop for FdTableGuard<'_> {
    fn drop(&mut self) {
        self.process.unlock_fd_table();
    }
}

/// procfs 运行时操作
///
/// 内核实现此 trait，并在注册文件系统类型时传入。
pub trait ProcOps: Send + Sync {
    // ========== 进程表 ==========

    /// 按 pid 查找进程
    fn find_process(&self, pid: Pid) -> Option<Arc<dyn ProcessHandle>>;

    /// 列出所有进程 pid
    fn list_pids(&self) -> Vec<Pid>;

    /// 列出 `cred` 可见的进程 pid；`None` 表示不做过滤
    fn visible_pids(&self, cred: Option<&Credential>) -> Vec<Pid> {
        let pids = self.list_pids();
        let Some(cred) = cred else {
            return pids;
        };
        pids.into_iter()
            .filter(|&pid| {
                self.find_process(pid)
                    .is_some_and(|process| self.can_access(cred, process.as_ref()))
            })
            .collect()
    }

    // ========== 权限 ==========

    /// `cred` 能否访问 `process`
    ///
    /// 有效 UID 等于进程的有效或真实 UID，或有效 GID 等于进程的有效或保存 GID 时允许。
    fn can_access(&self, cred: &Credential, process: &dyn ProcessHandle) -> bool {
        let target = process.credential();
        cred.euid == target.euid
            || cred.euid == target.ruid
            || cred.egid == target.egid
            || cred.egid == target.svgid
    }

    /// 同 [`ProcOps::can_access`]，拒绝时返回 [`FsError::PermissionDenied`]
    fn check_access(&self, cred: &Credential, process: &dyn ProcessHandle) -> Result<(), FsError> {
        if self.can_access(cred, process) {
            Ok(())
        } else {
            Err(FsError::PermissionDenied)
        }
    }

    /// `cred` 是否为超级用户
    fn is_superuser(&self, cred: &Credential) -> bool {
        cred.is_root()
    }

    // ========== 当前上下文 ==========

    /// 当前调用者的凭证
    fn current_credential(&self) -> Credential;

    /// 当前调用者的 pid（用于 `curproc`）
    fn current_pid(&self) -> Pid;

    /// 当前时间
    fn timespec_now(&self) -> TimeSpec;

    // ========== 系统信息 ==========

    /// CPU 信息
    fn cpu_info(&self) -> CpuInfo;

    /// 负载均值
    fn load_average(&self) -> LoadAverage;

    /// 内核版本字符串
    fn kernel_version(&self) -> String;

    /// 块设备分区
    fn partitions(&self) -> Vec<PartitionInfo>;
}
