// Unit tests for procfs.
//
// 在宿主机上用 `cargo test` 运行；锁与等待队列所需的钩子由 `test_support::init` 注册，
// 进程表由 `mock` 模块提供。

use std::string::String;
use std::sync::Arc;
use std::vec::Vec;

use uapi::cred::Credential;
use uapi::fs::DirentIter;

use crate::*;


mod readdir;
mod scenarios;
mod size;

use mock::{MockProcOps, MockProcess, standard_ops, user_cred};

fn setup() {
    test_support::init();
}

fn standard_tree() -> Arc<StructureTree> {
    Arc::new(build_tree())
}

/// 不经过缓存直接构造一个活动节点
fn node(tree: &Arc<StructureTree>, id: NodeId) -> ProcNode {
    ProcNode::new(1, id, tree.clone(), 0)
}

fn root_node(tree: &Arc<StructureTree>) -> ProcNode {
    node(tree, NodeId::global(tree.root().base_id))
}

/// 沿静态名字逐级向下找结构节点
fn structure_path(tree: &StructureTree, path: &[&str]) -> BaseId {
    let mut current = tree.root();
    for name in path {
        current = match *name {
            "<pid>" => tree.child_of_type(current, NodeType::ProcessDir),
            "<tid>" => tree.child_of_type(current, NodeType::ThreadDir),
            "<fd>" => tree.child_of_type(current, NodeType::FdDir),
            _ => tree.child_named(current, name),
        }
        .unwrap_or_else(|| panic!("no structure node {:?}", name));
    }
    current.base_id
}

fn context(ops: &MockProcOps) -> ProcContext<'_> {
    ProcContext::new(ops, MountOptions::empty())
}

/// 一次性读完目录，返回 `(名字, d_ino, d_type)`
fn list_all(ctx: &ProcContext<'_>, dir: &ProcNode, cred: &Credential) -> Vec<(String, u64, u8)> {
    let mut buf = std::vec![0u8; 64 * 1024];
    let result = read_directory(ctx, dir, 0, &mut buf, cred).expect("readdir failed");
    assert!(result.eof);
    decode(&buf[..result.bytes])
}

fn names(entries: &[(String, u64, u8)]) -> Vec<&str> {
    entries.iter().map(|(name, _, _)| name.as_str()).collect()
}

fn decode(buf: &[u8]) -> Vec<(String, u64, u8)> {
    DirentIter::new(buf)
        .map(|dirent| {
            (
                String::from_utf8(dirent.name.to_vec()).unwrap(),
                dirent.ino,
                dirent.d_type,
            )
        })
        .collect()
}

fn superuser() -> Credential {
    Credential::root()
}
