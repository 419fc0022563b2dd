//! 文件系统类型与挂载
//!
//! [`ProcfsType`] 对应一次文件系统类型注册：构建结构树并持有节点缓存。
//! 每次挂载得到一个 [`ProcMount`]，它有独立的挂载编号、选项与挂载时间，
//! 卸载时清除自己在缓存中的全部节点。

use alloc::sync::{Arc, Weak};
use core::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use sync::SpinLock;
use uapi::cred::Credential;
use vfs::{FileSystem, FsError, Inode, InodeMetadata, StatFs, TimeSpec};

use crate::config::{PROCFS_BLOCK_SIZE, PROCFS_MAX_NAMELEN, PROCFS_NAME};
use crate::context::ProcContext;
use crate::lookup::{LookupTarget, resolve_component};
use crate::node::{MountId, NO_PID, NodeCache, NodeId, ProcNode};
use crate::ops::ProcOps;
use crate::readdir::{ReadDir, ReadDirError, read_directory};
use crate::size::{node_attributes, node_size};
use crate::structure::{StructureFlags, StructureTree, build_tree};
use crate::vnode::ProcVnode;

bitflags::bitflags! {
    /// 挂载选项
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct MountOptions: u32 {
        /// 不做进程访问控制（`noprocperms`）
        const SKIP_PROCESS_PERMISSION_CHECKS = 1 << 0;
    }
}

impl MountOptions {
    /// 解析逗号分隔的挂载选项字符串
    ///
    /// 只认识 `noprocperms` 与 `procperms`，后出现的覆盖先出现的；空串得到默认选项。
    pub fn parse(options: &str) -> Result<Self, FsError> {
        let mut parsed = MountOptions::default();
        if options.is_empty() {
            return Ok(parsed);
        }
        for option in options.split(',') {
            match option {
                "noprocperms" => parsed.insert(MountOptions::SKIP_PROCESS_PERMISSION_CHECKS),
                "procperms" => parsed.remove(MountOptions::SKIP_PROCESS_PERMISSION_CHECKS),
                other => {
                    log::warn!("procfs: unknown mount option {:?}", other);
                    return Err(FsError::InvalidArgument);
                }
            }
        }
        Ok(parsed)
    }
}

/// 一次 procfs 文件系统类型注册
pub struct ProcfsType {
    ops: Arc<dyn ProcOps>,
    /// 注销后为 `None`；挂载计数也在这把锁下修改
    tree: SpinLock<Option<Arc<StructureTree>>>,
    cache: NodeCache<Arc<ProcVnode>>,
    next_mount_id: AtomicU64,
    active_mounts: AtomicUsize,
}

impl ProcfsType {
    /// 注册文件系统类型，构建标准结构树
    pub fn register(ops: Arc<dyn ProcOps>) -> Arc<Self> {
        Self::with_tree(ops, build_tree())
    }

    /// 使用给定的结构树注册
    pub fn with_tree(ops: Arc<dyn ProcOps>, tree: StructureTree) -> Arc<Self> {
        log::info!("procfs: registered ({} structure nodes)", tree.len());
        Arc::new(Self {
            ops,
            tree: SpinLock::new(Some(Arc::new(tree))),
            cache: NodeCache::new(),
            next_mount_id: AtomicU64::new(1),
            active_mounts: AtomicUsize::new(0),
        })
    }

    /// 注销：仍有挂载或缓存节点时返回 [`FsError::Busy`]，否则释放结构树
    pub fn unregister(&self) -> Result<(), FsError> {
        let mut tree = self.tree.lock();
        let active = self.active_mounts.load(Ordering::Acquire);
        if active != 0 {
            log::warn!("procfs: unregister refused, {} mounts active", active);
            return Err(FsError::Busy);
        }
        let cached = self.cache.len();
        if cached != 0 {
            log::warn!("procfs: unregister refused, {} nodes still cached", cached);
            return Err(FsError::Busy);
        }
        if tree.take().is_some() {
            log::info!("procfs: unregistered");
        }
        Ok(())
    }

    /// 是否仍处于注册状态
    pub fn is_registered(&self) -> bool {
        self.tree.lock().is_some()
    }

    /// 挂载
    ///
    /// 分配新的挂载编号，记录挂载时间，并通过缓存具体化根节点。
    pub fn mount(self: &Arc<Self>, options: MountOptions) -> Result<Arc<ProcMount>, FsError> {
        let tree = {
            let tree = self.tree.lock();
            let tree = tree.clone().ok_or(FsError::NoDevice)?;
            self.active_mounts.fetch_add(1, Ordering::AcqRel);
            tree
        };
        let mount_id = self.next_mount_id.fetch_add(1, Ordering::Relaxed);
        let mount_time = self.ops.timespec_now();

        let mount = Arc::new_cyclic(|this| ProcMount {
            fs_type: self.clone(),
            mount_id,
            options,
            mount_time,
            tree,
            unmounted: AtomicBool::new(false),
            this: this.clone(),
        });

        if let Err(err) = mount.root_vnode() {
            mount.unmount();
            return Err(err);
        }
        log::info!("procfs: mounted as {} with {:?}", mount_id, options);
        Ok(mount)
    }

    /// 当前挂载数
    pub fn active_mounts(&self) -> usize {
        self.active_mounts.load(Ordering::Acquire)
    }

    /// 节点缓存
    pub fn cache(&self) -> &NodeCache<Arc<ProcVnode>> {
        &self.cache
    }

    /// 进程目录接口
    pub fn ops(&self) -> &Arc<dyn ProcOps> {
        &self.ops
    }
}

/// 一个 procfs 挂载实例
pub struct ProcMount {
    fs_type: Arc<ProcfsType>,
    mount_id: MountId,
    options: MountOptions,
    mount_time: TimeSpec,
    tree: Arc<StructureTree>,
    unmounted: AtomicBool,
    this: Weak<ProcMount>,
}

impl ProcMount {
    /// 挂载编号
    pub fn mount_id(&self) -> MountId {
        self.mount_id
    }

    /// 挂载选项
    pub fn options(&self) -> MountOptions {
        self.options
    }

    /// 挂载时间，用作非进程节点的时间
    pub fn mount_time(&self) -> TimeSpec {
        self.mount_time
    }

    /// 结构树
    pub fn tree(&self) -> &Arc<StructureTree> {
        &self.tree
    }

    /// 所属文件系统类型
    pub fn procfs_type(&self) -> &Arc<ProcfsType> {
        &self.fs_type
    }

    /// 进程目录接口
    pub fn ops(&self) -> &dyn ProcOps {
        self.fs_type.ops.as_ref()
    }

    /// 本挂载的操作上下文
    pub fn context(&self) -> ProcContext<'_> {
        ProcContext::new(self.ops(), self.options)
    }

    /// 是否已卸载
    pub fn is_unmounted(&self) -> bool {
        self.unmounted.load(Ordering::Acquire)
    }

    fn ensure_mounted(&self) -> Result<(), FsError> {
        if self.is_unmounted() {
            return Err(FsError::NoDevice);
        }
        Ok(())
    }

    /// 根目录 vnode
    pub fn root_vnode(&self) -> Result<Arc<ProcVnode>, FsError> {
        self.materialize(NodeId::global(self.tree.root().base_id))
    }

    /// 通过缓存具体化 `id` 对应的 vnode
    pub fn materialize(&self, id: NodeId) -> Result<Arc<ProcVnode>, FsError> {
        self.ensure_mounted()?;
        let (_, vnode) = self
            .fs_type
            .cache
            .find_or_create(self.mount_id, id, &self.tree, |node| self.create_vnode(node))?;
        Ok(vnode)
    }

    /// 缓存的创建函数：所属进程已消失时拒绝创建
    ///
    /// 卸载标志在表项插入之后才检查。卸载先置标志再清除表项，
    /// 所以清除之后才插入的表项一定在这里失败并被缓存删掉。
    fn create_vnode(&self, node: &Arc<ProcNode>) -> Result<Arc<ProcVnode>, FsError> {
        let id = node.id();
        if node.structure().flags.contains(StructureFlags::PROCESS_RELATED) && id.owning_pid != NO_PID {
            self.ops()
                .find_process(id.owning_pid)
                .ok_or(FsError::NotFound)?;
        }
        if self.is_unmounted() {
            return Err(FsError::NoDevice);
        }
        Ok(ProcVnode::new(node.clone(), self.this.clone()))
    }

    /// 在目录 `dir` 中查找 `name`
    pub fn lookup(
        &self,
        dir: &ProcVnode,
        name: &str,
        cred: &Credential,
    ) -> Result<Arc<ProcVnode>, FsError> {
        self.ensure_mounted()?;
        match resolve_component(&self.context(), dir.node(), name, cred)? {
            LookupTarget::Current => dir.this().ok_or(FsError::NotFound),
            LookupTarget::Node(id) => self.materialize(id),
        }
    }

    /// 枚举目录
    pub fn read_directory(
        &self,
        dir: &ProcVnode,
        offset: u64,
        dest: &mut [u8],
        cred: &Credential,
    ) -> Result<ReadDir, ReadDirError> {
        if let Err(error) = self.ensure_mounted() {
            return Err(ReadDirError {
                partial: ReadDir {
                    entries: 0,
                    bytes: 0,
                    next_offset: offset,
                    eof: false,
                },
                error,
            });
        }
        read_directory(&self.context(), dir.node(), offset, dest, cred)
    }

    /// 节点大小
    pub fn node_size(&self, vnode: &ProcVnode, cred: &Credential) -> u64 {
        node_size(&self.context(), vnode.node(), cred)
    }

    /// 节点属性
    pub fn getattr(&self, vnode: &ProcVnode, cred: &Credential) -> Result<InodeMetadata, FsError> {
        node_attributes(&self.context(), vnode.node(), self.mount_time, cred)
    }

    /// 宿主 VFS 回收 vnode 时调用：从缓存中移除对应节点
    pub fn reclaim(&self, vnode: &ProcVnode) -> bool {
        self.fs_type.cache.reclaim(vnode.node()).is_some()
    }

    /// 卸载：清除本挂载的缓存节点。重复调用无副作用。
    pub fn unmount(&self) {
        if self.unmounted.swap(true, Ordering::AcqRel) {
            return;
        }
        let purged = self.fs_type.cache.purge_mount(self.mount_id);
        {
            let _tree = self.fs_type.tree.lock();
            self.fs_type.active_mounts.fetch_sub(1, Ordering::AcqRel);
        }
        log::info!("procfs: unmounted {} ({} nodes purged)", self.mount_id, purged);
    }
}

impl Drop for ProcMount {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl FileSystem for ProcMount {
    fn fs_type(&self) -> &'static str {
        PROCFS_NAME
    }

    fn root_inode(&self) -> Result<Arc<dyn Inode>, FsError> {
        Ok(self.root_vnode()? as Arc<dyn Inode>)
    }

    fn statfs(&self) -> Result<StatFs, FsError> {
        Ok(StatFs {
            block_size: PROCFS_BLOCK_SIZE,
            total_blocks: 0,
            free_blocks: 0,
            available_blocks: 0,
            total_inodes: 0,
            free_inodes: 0,
            fsid: self.mount_id,
            max_filename_len: PROCFS_MAX_NAMELEN,
        })
    }

    fn umount(&self) -> Result<(), FsError> {
        self.unmount();
        Ok(())
    }
}
