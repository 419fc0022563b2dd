//! 端到端场景：自定义结构树上的查找、枚举与大小

use super::*;

use vfs::FsError;

/// 根目录下只有一个进程目录
fn process_only_tree() -> Arc<StructureTree> {
    let mut builder = TreeBuilder::new();
    builder.add(
        TreeBuilder::ROOT,
        NodeSpec::new(NodeType::ProcessDir, "")
            .flags(StructureFlags::PROCESS_RELATED)
            .size_fn(SizeKind::ProcessCount),
    );
    Arc::new(builder.build())
}

#[test]
fn test_process_directory_enumeration() {
    setup();
    let ops = MockProcOps::new()
        .with(MockProcess::new(1, "init", 0))
        .with(MockProcess::new(42, "worker", 0));
    let tree = process_only_tree();
    let root = root_node(&tree);

    let mut buf = [0u8; 1024];
    let result = read_directory(&context(&ops), &root, 0, &mut buf, &superuser()).unwrap();
    assert!(result.eof);
    assert_eq!(result.entries, 2);
    assert_eq!(names(&decode(&buf[..result.bytes])), ["1", "42"]);
}

#[test]
fn test_foreign_process_is_invisible() {
    setup();
    let ops = MockProcOps::new()
        .with(MockProcess::new(1, "init", 1000))
        .with(MockProcess::new(42, "worker", 501));
    let tree = process_only_tree();
    let root = root_node(&tree);
    let cred = Credential::user(1000, 1000);

    assert_eq!(
        resolve_component(&context(&ops), &root, "42", &cred),
        Err(FsError::NotFound)
    );
    assert!(resolve_component(&context(&ops), &root, "1", &cred).is_ok());
    assert_eq!(names(&list_all(&context(&ops), &root, &cred)), ["1"]);
}

#[test]
fn test_repeated_lookup_shares_node() {
    setup();
    let ops = standard_ops();
    let fs = ProcfsType::register(ops.clone());
    let mount = fs.mount(MountOptions::empty()).unwrap();
    let root = mount.root_vnode().unwrap();

    let first = mount.lookup(&root, "42", &superuser()).unwrap();
    let second = mount.lookup(&root, "42", &superuser()).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(first.node(), second.node()));
    assert_eq!(fs.cache().state(mount.mount_id(), first.node().id()), Some(CreationState::Idle));
}

#[test]
fn test_reserved_descriptor_is_not_found() {
    setup();
    let mut builder = TreeBuilder::new();
    builder.add_dot_entries(TreeBuilder::ROOT);
    let process = builder.add_dir(
        TreeBuilder::ROOT,
        NodeSpec::new(NodeType::ProcessDir, "").flags(StructureFlags::PROCESS_RELATED),
    );
    let fd = builder.add(process, NodeSpec::dir("fd"));
    let fd_dir = builder.add(
        fd,
        NodeSpec::new(NodeType::FdDir, "").flags(StructureFlags::FD_RELATED),
    );
    assert_eq!(fd_dir, 7);
    let tree = Arc::new(builder.build());

    let ops = standard_ops();
    let dir = node(&tree, NodeId::new(fd, 42, NO_OBJECT));
    let ctx = context(&ops);

    assert_eq!(resolve_component(&ctx, &dir, "1", &superuser()), Err(FsError::NotFound));
    let found = resolve_component(&ctx, &dir, "0", &superuser()).unwrap();
    assert_eq!(found, LookupTarget::Node(NodeId::new(7, 42, 0)));
    let LookupTarget::Node(id) = found else {
        unreachable!()
    };
    assert_eq!(id.owning_object_id, 0);
}

#[test]
fn test_static_directory_size() {
    setup();
    let mut builder = TreeBuilder::new();
    let dir = builder.add(TreeBuilder::ROOT, NodeSpec::dir("static"));
    builder.add(dir, NodeSpec::file("a", ReadKind::Version));
    builder.add(dir, NodeSpec::file("b", ReadKind::LoadAvg));
    let tree = Arc::new(builder.build());

    let ops = standard_ops();
    let dir = node(&tree, NodeId::global(dir));
    for cred in [superuser(), user_cred(), Credential::user(12345, 12345)] {
        assert_eq!(node_size(&context(&ops), &dir, &cred), 2);
    }
}
