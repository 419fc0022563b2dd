//! 与宿主 VFS 对接的 vnode
//!
//! [`ProcVnode`] 与一个 [`ProcNode`] 一一对应，由节点缓存在具体化节点时创建。
//! 它只持有挂载的弱引用，挂载卸载后所有操作返回 [`FsError::NoDevice`]。

use alloc::string::String;
use alloc::sync::{Arc, Weak};
use alloc::vec;
use alloc::vec::Vec;
use core::any::Any;

use uapi::fs::DirentIter;
use vfs::{DirEntry, FsError, Inode, InodeMetadata, InodeType, d_type_to_inode_type};

use crate::config::READDIR_BUFFER_SIZE;
use crate::generators;
use crate::mount::ProcMount;
use crate::node::ProcNode;
use crate::structure::NodeFamily;

/// procfs 的 vnode
pub struct ProcVnode {
    node: Arc<ProcNode>,
    mount: Weak<ProcMount>,
    this: Weak<ProcVnode>,
}

impl ProcVnode {
    pub(crate) fn new(node: Arc<ProcNode>, mount: Weak<ProcMount>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            node,
            mount,
            this: this.clone(),
        })
    }

    /// 对应的活动节点
    pub fn node(&self) -> &Arc<ProcNode> {
        &self.node
    }

    /// 所属挂载，已卸载时返回 [`FsError::NoDevice`]
    pub fn mount(&self) -> Result<Arc<ProcMount>, FsError> {
        self.mount
            .upgrade()
            .filter(|mount| !mount.is_unmounted())
            .ok_or(FsError::NoDevice)
    }

    /// 自身的强引用
    pub fn this(&self) -> Option<Arc<ProcVnode>> {
        self.this.upgrade()
    }

    /// 文件类型
    pub fn inode_type(&self) -> InodeType {
        self.node.node_type().inode_type()
    }
}

impl Inode for ProcVnode {
    fn metadata(&self) -> Result<InodeMetadata, FsError> {
        let mount = self.mount()?;
        let cred = mount.ops().current_credential();
        mount.getattr(self, &cred)
    }

    fn read_at(&self, offset: usize, buf: &mut [u8]) -> Result<usize, FsError> {
        match self.node.node_type().family() {
            NodeFamily::Directory => Err(FsError::IsDirectory),
            NodeFamily::Symlink => Err(FsError::InvalidArgument),
            NodeFamily::File => {
                let mount = self.mount()?;
                let data = generators::generate(&mount.context(), &self.node)?;
                Ok(generators::copy_at(&data, offset, buf))
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<Arc<dyn Inode>, FsError> {
        let mount = self.mount()?;
        let cred = mount.ops().current_credential();
        Ok(mount.lookup(self, name, &cred)? as Arc<dyn Inode>)
    }

    fn readdir(&self) -> Result<Vec<DirEntry>, FsError> {
        if self.node.node_type().family() != NodeFamily::Directory {
            return Err(FsError::NotDirectory);
        }
        let mount = self.mount()?;
        let cred = mount.ops().current_credential();

        let mut buf = vec![0u8; READDIR_BUFFER_SIZE];
        let mut entries = Vec::new();
        let mut offset = 0;
        loop {
            let chunk = mount
                .read_directory(self, offset, &mut buf, &cred)
                .map_err(|err| err.error)?;
            for dirent in DirentIter::new(&buf[..chunk.bytes]) {
                entries.push(DirEntry {
                    name: String::from_utf8_lossy(dirent.name).into_owned(),
                    inode_no: dirent.ino,
                    inode_type: d_type_to_inode_type(dirent.d_type).unwrap_or(InodeType::File),
                });
            }
            if chunk.eof {
                return Ok(entries);
            }
            if chunk.entries == 0 {
                // 一条记录都放不下
                return Err(FsError::InvalidArgument);
            }
            offset = chunk.next_offset;
        }
    }

    fn readlink(&self) -> Result<String, FsError> {
        if self.node.node_type().family() != NodeFamily::Symlink {
            return Err(FsError::InvalidArgument);
        }
        let mount = self.mount()?;
        generators::link_target(&mount.context(), &self.node)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
