use super::*;

use uapi::time::TimeSpec;
use vfs::{FileMode, FsError, InodeType};

fn pid_node(tree: &Arc<StructureTree>, path: &[&str], pid: Pid) -> ProcNode {
    node(tree, NodeId::new(structure_path(tree, path), pid, NO_OBJECT))
}

#[test]
fn test_root_size_counts_visible_processes() {
    setup();
    let ops = standard_ops();
    let tree = standard_tree();
    let root = root_node(&tree);

    // . .. byname curproc cpuinfo loadavg partitions version + 3 个进程
    assert_eq!(node_size(&context(&ops), &root, &superuser()), 11);
    // 普通用户只能看到 42
    assert_eq!(node_size(&context(&ops), &root, &user_cred()), 9);

    let skip = ProcContext::new(ops.as_ref(), MountOptions::SKIP_PROCESS_PERMISSION_CHECKS);
    assert_eq!(node_size(&skip, &root, &user_cred()), 11);
}

#[test]
fn test_process_directory_sizes() {
    setup();
    let ops = standard_ops();
    let tree = standard_tree();
    let ctx = context(&ops);

    let process = pid_node(&tree, &["<pid>"], 42);
    assert_eq!(node_size(&ctx, &process, &superuser()), 10);

    let threads = pid_node(&tree, &["<pid>", "threads"], 42);
    assert_eq!(node_size(&ctx, &threads, &superuser()), 4);

    let fds = pid_node(&tree, &["<pid>", "fd"], 42);
    assert_eq!(node_size(&ctx, &fds, &superuser()), 4);
    assert!(!ops.process(42).fd_table_locked());
}

#[test]
fn test_vanished_process_counts_zero() {
    setup();
    let ops = standard_ops();
    let tree = standard_tree();
    let threads = pid_node(&tree, &["<pid>", "threads"], 42);
    let fds = pid_node(&tree, &["<pid>", "fd"], 42);

    ops.remove(42);
    assert_eq!(node_size(&context(&ops), &threads, &superuser()), 2);
    assert_eq!(node_size(&context(&ops), &fds, &superuser()), 2);
}

#[test]
fn test_dot_entries_use_effective_directory() {
    setup();
    let ops = standard_ops();
    let tree = standard_tree();
    let ctx = context(&ops);

    let dot = pid_node(&tree, &["<pid>", "threads", "."], 42);
    assert_eq!(node_size(&ctx, &dot, &superuser()), 4);

    let dotdot = pid_node(&tree, &["<pid>", "threads", ".."], 42);
    assert_eq!(node_size(&ctx, &dotdot, &superuser()), 10);

    // 根的 ".." 仍是根
    let root_dotdot = node(&tree, NodeId::global(structure_path(&tree, &[".."])));
    assert_eq!(
        node_size(&ctx, &root_dotdot, &superuser()),
        node_size(&ctx, &root_node(&tree), &superuser())
    );
}

#[test]
fn test_size_is_deterministic() {
    setup();
    let ops = standard_ops();
    let tree = standard_tree();
    let ctx = context(&ops);
    let dirs = [
        root_node(&tree),
        pid_node(&tree, &["<pid>"], 42),
        pid_node(&tree, &["<pid>", "fd"], 42),
        pid_node(&tree, &["<pid>", "threads"], 42),
        node(&tree, NodeId::global(structure_path(&tree, &["byname"]))),
    ];
    for dir in &dirs {
        for cred in [superuser(), user_cred()] {
            assert_eq!(node_size(&ctx, dir, &cred), node_size(&ctx, dir, &cred));
        }
    }

    ops.process(42).set_threads(&[1, 2, 3]);
    assert_eq!(node_size(&ctx, &dirs[3], &superuser()), 5);
}

#[test]
fn test_file_sizes() {
    setup();
    let ops = standard_ops();
    let tree = standard_tree();
    let ctx = context(&ops);

    let pid_file = pid_node(&tree, &["<pid>", "pid"], 42);
    assert_eq!(node_size(&ctx, &pid_file, &superuser()), 0);

    // byname 链接的大小取自它的 size_fn
    let byname = tree.node(structure_path(&tree, &["byname"]));
    let link = tree.child_of_type(byname, NodeType::ProcessNameDir).unwrap();
    let link_node = node(&tree, NodeId::new(link.base_id, 42, NO_OBJECT));
    assert_eq!(node_size(&ctx, &link_node, &superuser()), 3);
}

#[test]
fn test_process_attributes() {
    setup();
    let ops = standard_ops();
    let tree = standard_tree();
    let ctx = context(&ops);

    let process = pid_node(&tree, &["<pid>"], 42);
    let attr = node_attributes(&ctx, &process, ops.now(), &superuser()).unwrap();
    assert_eq!(attr.inode_no, process.id().file_id());
    assert_eq!(attr.inode_type, InodeType::Directory);
    assert_eq!(attr.mode, FileMode::S_IFDIR | FileMode::from_bits_truncate(0o555));
    assert_eq!((attr.uid, attr.gid), (501, 501));
    assert_eq!(attr.mtime, TimeSpec::new(1_042, 0));
    assert_eq!(attr.nlinks, 2);
    assert_eq!(attr.size, 10);

    let info = pid_node(&tree, &["<pid>", "info"], 42);
    let attr = node_attributes(&ctx, &info, ops.now(), &superuser()).unwrap();
    assert_eq!(attr.mode, FileMode::S_IFREG | FileMode::from_bits_truncate(0o444));
    assert_eq!(attr.nlinks, 1);

    ops.remove(42);
    assert_eq!(
        node_attributes(&ctx, &process, ops.now(), &superuser()),
        Err(FsError::NotFound)
    );
}

#[test]
fn test_global_attributes() {
    setup();
    let ops = standard_ops();
    let tree = standard_tree();
    let ctx = context(&ops);
    let mount_time = TimeSpec::new(77, 5);

    let root = root_node(&tree);
    let attr = node_attributes(&ctx, &root, mount_time, &superuser()).unwrap();
    assert_eq!((attr.uid, attr.gid), (0, 0));
    assert_eq!(attr.atime, mount_time);
    assert_eq!(attr.ctime, mount_time);

    let curproc = node(&tree, NodeId::global(structure_path(&tree, &["curproc"])));
    let attr = node_attributes(&ctx, &curproc, mount_time, &superuser()).unwrap();
    assert_eq!(attr.inode_type, InodeType::Symlink);
    assert_eq!(attr.mode, FileMode::S_IFLNK | FileMode::from_bits_truncate(0o777));
}
