use super::*;

use uapi::fs::{DT_DIR, DT_LNK, DT_REG};
use vfs::FsError;

fn pid_node(tree: &Arc<StructureTree>, path: &[&str], pid: Pid) -> ProcNode {
    node(tree, NodeId::new(structure_path(tree, path), pid, NO_OBJECT))
}

/// 用大小为 `chunk` 的缓冲区分多次读完目录
fn list_chunked(
    ctx: &ProcContext<'_>,
    dir: &ProcNode,
    cred: &Credential,
    chunk: usize,
) -> Vec<(String, u64, u8)> {
    let mut buf = std::vec![0u8; chunk];
    let mut offset = 0;
    let mut entries = Vec::new();
    loop {
        let result = read_directory(ctx, dir, offset, &mut buf, cred).unwrap();
        entries.extend(decode(&buf[..result.bytes]));
        if result.eof {
            return entries;
        }
        assert!(result.entries > 0, "no progress with {} byte buffer", chunk);
        assert!(result.next_offset > offset);
        offset = result.next_offset;
    }
}

#[test]
fn test_root_listing() {
    setup();
    let ops = standard_ops();
    let tree = standard_tree();
    let root = root_node(&tree);

    let entries = list_all(&context(&ops), &root, &superuser());
    assert_eq!(
        names(&entries),
        [".", "..", "byname", "curproc", "cpuinfo", "loadavg", "partitions", "version", "1", "42", "77"]
    );

    let root_ino = root.id().file_id();
    assert_eq!(entries[0].1, root_ino);
    assert_eq!(entries[1].1, root_ino);
    assert_eq!(entries[2].2, DT_DIR);
    assert_eq!(entries[3].2, DT_LNK);
    assert_eq!(entries[4].2, DT_REG);
    assert_eq!(entries[9].2, DT_DIR);

    let pid_base = structure_path(&tree, &["<pid>"]);
    assert_eq!(entries[9].1, NodeId::new(pid_base, 42, NO_OBJECT).file_id());
}

#[test]
fn test_root_listing_filters_processes() {
    setup();
    let ops = standard_ops();
    let tree = standard_tree();
    let root = root_node(&tree);

    let entries = list_all(&context(&ops), &root, &user_cred());
    assert_eq!(names(&entries)[8..], ["42"]);

    let skip = ProcContext::new(ops.as_ref(), MountOptions::SKIP_PROCESS_PERMISSION_CHECKS);
    let entries = list_all(&skip, &root, &user_cred());
    assert_eq!(names(&entries)[8..], ["1", "42", "77"]);
}

#[test]
fn test_process_directory_listing() {
    setup();
    let ops = standard_ops();
    let tree = standard_tree();
    let dir = pid_node(&tree, &["<pid>"], 42);

    let entries = list_all(&context(&ops), &dir, &user_cred());
    assert_eq!(
        names(&entries),
        [".", "..", "pid", "ppid", "pgid", "sid", "tty", "info", "fd", "threads"]
    );
    assert_eq!(entries[0].1, dir.id().file_id());
    assert_eq!(entries[1].1, root_node(&tree).id().file_id());
    let pid_file = NodeId::new(structure_path(&tree, &["<pid>", "pid"]), 42, NO_OBJECT);
    assert_eq!(entries[2].1, pid_file.file_id());
}

#[test]
fn test_inaccessible_process_directory_is_empty() {
    setup();
    let ops = standard_ops();
    let tree = standard_tree();
    let dir = pid_node(&tree, &["<pid>"], 1);

    assert!(list_all(&context(&ops), &dir, &user_cred()).is_empty());
    assert_eq!(list_all(&context(&ops), &dir, &superuser()).len(), 10);
}

#[test]
fn test_thread_listing() {
    setup();
    let ops = standard_ops();
    let tree = standard_tree();
    let dir = pid_node(&tree, &["<pid>", "threads"], 42);

    let entries = list_all(&context(&ops), &dir, &superuser());
    assert_eq!(names(&entries), [".", "..", "4200", "4201"]);
    let process = NodeId::new(structure_path(&tree, &["<pid>"]), 42, NO_OBJECT);
    assert_eq!(entries[1].1, process.file_id());

    let tid_base = structure_path(&tree, &["<pid>", "threads", "<tid>"]);
    assert_eq!(entries[3].1, NodeId::new(tid_base, 42, 4201).file_id());
    assert_eq!(entries[3].2, DT_DIR);
}

#[test]
fn test_fd_listing_skips_reserved_and_releases_lock() {
    setup();
    let ops = standard_ops();
    let tree = standard_tree();
    let dir = pid_node(&tree, &["<pid>", "fd"], 42);

    let entries = list_all(&context(&ops), &dir, &superuser());
    assert_eq!(names(&entries), [".", "..", "0", "2"]);

    let process = ops.process(42);
    assert!(!process.fd_table_locked());
    // 每个槽位一次，外加越界检查一次
    assert_eq!(process.fd_lock_count(), 4);
}

#[test]
fn test_byname_listing() {
    setup();
    let ops = standard_ops();
    ops.insert(MockProcess::new(9, "a-process-with-a-long-name", 0));
    let tree = standard_tree();
    let dir = node(&tree, NodeId::global(structure_path(&tree, &["byname"])));

    let entries = list_all(&context(&ops), &dir, &superuser());
    assert_eq!(
        names(&entries),
        [".", "..", "1 launchd", "9 a-process-with-a", "42 shell", "77 daemon"]
    );
    assert!(entries[2..].iter().all(|(_, _, d_type)| *d_type == DT_LNK));

    let entries = list_all(&context(&ops), &dir, &user_cred());
    assert_eq!(names(&entries), [".", "..", "42 shell"]);
}

#[test]
fn test_chunked_listing_matches_single_call() {
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
            let full = list_all(&ctx, dir, &cred);
            for chunk in (24..=96).step_by(4) {
                assert_eq!(list_chunked(&ctx, dir, &cred, chunk), full, "chunk {}", chunk);
            }
        }
    }
}

#[test]
fn test_buffer_too_small_makes_no_progress() {
    setup();
    let ops = standard_ops();
    let tree = standard_tree();
    let root = root_node(&tree);
    let mut buf = [0u8; 8];

    let result = read_directory(&context(&ops), &root, 0, &mut buf, &superuser()).unwrap();
    assert_eq!(result.entries, 0);
    assert_eq!(result.bytes, 0);
    assert_eq!(result.next_offset, 0);
    assert!(!result.eof);
}

#[test]
fn test_offset_past_end_is_eof() {
    setup();
    let ops = standard_ops();
    let tree = standard_tree();
    let root = root_node(&tree);
    let mut buf = [0u8; 256];

    let result = read_directory(&context(&ops), &root, 1 << 20, &mut buf, &superuser()).unwrap();
    assert_eq!(result.entries, 0);
    assert!(result.eof);
}

#[test]
fn test_vanished_process_keeps_partial_result() {
    setup();
    let ops = standard_ops();
    let tree = standard_tree();
    let dir = pid_node(&tree, &["<pid>", "threads"], 42);
    ops.remove(42);

    let mut buf = [0u8; 256];
    let err = read_directory(&context(&ops), &dir, 0, &mut buf, &superuser()).unwrap_err();
    assert_eq!(err.error, FsError::NotFound);
    assert_eq!(err.partial.entries, 2);
    assert_eq!(names(&decode(&buf[..err.partial.bytes])), [".", ".."]);
    assert_eq!(err.partial.next_offset, err.partial.bytes as u64);
}

#[test]
fn test_readdir_on_file_fails() {
    setup();
    let ops = standard_ops();
    let tree = standard_tree();
    let file = node(&tree, NodeId::global(structure_path(&tree, &["version"])));
    let mut buf = [0u8; 64];

    let err = read_directory(&context(&ops), &file, 0, &mut buf, &superuser()).unwrap_err();
    assert_eq!(err.error, FsError::NotDirectory);
}
