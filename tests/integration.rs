use std::sync::{Arc, Barrier};
use std::thread;

use rax_vfs::VfsSession;
use rax_vfs::error::{StoreError, VfsError};
use rax_vfs::storage::{MemoryStore, NodeKind, NodeStore, SqliteStore};

// Run every scenario against both backends
fn backends() -> Vec<(&'static str, Arc<dyn NodeStore>)> {
    vec![
        ("memory", Arc::new(MemoryStore::new())),
        ("sqlite", Arc::new(SqliteStore::in_memory().unwrap())),
    ]
}

fn names(session: &VfsSession, path: Option<&str>) -> Vec<String> {
    session
        .ls(path)
        .unwrap()
        .into_iter()
        .map(|n| n.name)
        .collect()
}

#[test]
fn test_mkdir_then_cd_extends_pwd() {
    for (backend, store) in backends() {
        let mut s = VfsSession::open(store, "alice");
        s.mkdir("n").unwrap();
        s.cd("n").unwrap();
        assert_eq!(s.pwd(), "/n", "{backend}");

        s.mkdir("m").unwrap();
        s.cd("m").unwrap();
        assert_eq!(s.pwd(), "/n/m", "{backend}");
    }
}

#[test]
fn test_touch_write_cat() {
    for (backend, store) in backends() {
        let s = VfsSession::open(store, "alice");
        s.touch("a", "").unwrap();
        assert_eq!(s.cat("a").unwrap(), "", "{backend}");

        s.write("a", "x").unwrap();
        s.write("a", "x").unwrap();
        assert_eq!(s.cat("a").unwrap(), "x", "{backend}");
        assert_eq!(names(&s, None), vec!["a"], "{backend}");
    }
}

#[test]
fn test_file_created_inside_subdirectory() {
    for (backend, store) in backends() {
        let mut s = VfsSession::open(store, "alice");
        s.mkdir("d").unwrap();
        s.cd("d").unwrap();
        s.touch("f", "").unwrap();
        s.cd("..").unwrap();
        assert_eq!(names(&s, Some("d")), vec!["f"], "{backend}");
    }
}

#[test]
fn test_ls_on_file_describes_that_file() {
    for (backend, store) in backends() {
        let s = VfsSession::open(store, "alice");
        s.mkdir("d").unwrap();
        s.touch("f", "body").unwrap();

        let listed = s.ls(Some("f")).unwrap();
        assert_eq!(listed.len(), 1, "{backend}");
        assert_eq!(listed[0].name, "f", "{backend}");
        assert_eq!(listed[0].kind, NodeKind::File, "{backend}");
    }
}

#[test]
fn test_create_and_rename_race_for_one_name() {
    for (backend, store) in backends() {
        for round in 0..20 {
            let source = format!("a{round}");
            let target = format!("x{round}");
            let id = store
                .create("alice", None, &source, NodeKind::File, None)
                .unwrap();
            let barrier = Barrier::new(2);

            let (created, renamed) = thread::scope(|scope| {
                let creator = scope.spawn(|| {
                    barrier.wait();
                    store.create("alice", None, &target, NodeKind::Directory, None)
                });
                let renamer = scope.spawn(|| {
                    barrier.wait();
                    store.rename(id, &target)
                });
                (creator.join().unwrap(), renamer.join().unwrap())
            });

            match (created, renamed) {
                (Ok(_), Err(StoreError::Conflict(_))) | (Err(StoreError::Conflict(_)), Ok(true)) => {}
                other => panic!("{backend} round {round}: both or neither won: {other:?}"),
            }
            let holders: Vec<_> = store
                .children("alice", None)
                .unwrap()
                .into_iter()
                .filter(|n| n.name == target)
                .collect();
            assert_eq!(holders.len(), 1, "{backend} round {round}");
        }
    }
}

#[test]
fn test_write_does_not_create_intermediate_directories() {
    for (backend, store) in backends() {
        let s = VfsSession::open(store, "alice");
        let err = s.write("missing/f", "x").unwrap_err();
        assert!(matches!(err, VfsError::NotFound(_)), "{backend}: {err:?}");
        assert!(names(&s, None).is_empty(), "{backend}");
    }
}

#[test]
fn test_rm_and_rm_recursive() {
    for (backend, store) in backends() {
        let mut s = VfsSession::open(Arc::clone(&store), "alice");
        s.mkdir("d").unwrap();
        s.cd("d").unwrap();
        s.mkdir("inner").unwrap();
        s.cd("inner").unwrap();
        s.touch("deep", "content").unwrap();
        let inner = s.current_node().unwrap();
        s.cd("/").unwrap();

        let err = s.rm("d").unwrap_err();
        assert!(matches!(err, VfsError::DirectoryNotEmpty(_)), "{backend}: {err:?}");

        assert_eq!(s.rm_recursive("d").unwrap(), 3, "{backend}");
        assert!(names(&s, None).is_empty(), "{backend}");
        assert!(store.get(inner).unwrap().is_none(), "{backend}");
        assert!(store.children("alice", Some(inner)).unwrap().is_empty(), "{backend}");
    }
}

#[test]
fn test_duplicate_mkdir_leaves_store_unchanged() {
    for (backend, store) in backends() {
        let s = VfsSession::open(store, "alice");
        s.mkdir("x").unwrap();
        let err = s.mkdir("x").unwrap_err();
        assert!(matches!(err, VfsError::AlreadyExists(_)), "{backend}: {err:?}");
        assert_eq!(names(&s, None), vec!["x"], "{backend}");
    }
}

#[test]
fn test_mv_rules() {
    for (backend, store) in backends() {
        let mut s = VfsSession::open(store, "alice");
        s.touch("a", "").unwrap();
        s.touch("b", "").unwrap();

        let err = s.mv("a", "b").unwrap_err();
        assert!(matches!(err, VfsError::AlreadyExists(_)), "{backend}: {err:?}");

        let err = s.mv("a", "sub/b").unwrap_err();
        assert!(matches!(err, VfsError::Unsupported(_)), "{backend}: {err:?}");

        s.mv("a", "c").unwrap();
        assert_eq!(names(&s, None), vec!["b", "c"], "{backend}");
    }
}

#[test]
fn test_parent_of_root_stays_at_root() {
    for (backend, store) in backends() {
        let mut s = VfsSession::open(store, "alice");
        assert_eq!(s.cd("../..").unwrap(), "/", "{backend}");
        assert_eq!(s.pwd(), "/", "{backend}");
    }
}

#[test]
fn test_tree_orders_directories_first() {
    for (backend, store) in backends() {
        let s = VfsSession::open(store, "alice");
        s.touch("beta", "").unwrap();
        s.mkdir("alpha").unwrap();

        let lines: Vec<String> = s.tree(3).unwrap().into_iter().map(|l| l.line).collect();
        assert_eq!(lines, vec!["├── alpha", "└── beta"], "{backend}");
    }
}

#[test]
fn test_owners_are_isolated() {
    for (backend, store) in backends() {
        let alice = VfsSession::open(Arc::clone(&store), "alice");
        let mut bob = VfsSession::open(store, "bob");
        alice.mkdir("private").unwrap();

        assert!(bob.ls(None).unwrap().is_empty(), "{backend}");
        assert!(matches!(bob.cd("private"), Err(VfsError::NotFound(_))), "{backend}");
        bob.mkdir("private").unwrap();
    }
}

#[test]
fn test_default_structure_runs_once() {
    for (backend, store) in backends() {
        let s = VfsSession::open(store, "alice");
        assert!(s.is_fresh().unwrap(), "{backend}");
        s.init_default_structure().unwrap();
        assert!(!s.is_fresh().unwrap(), "{backend}");

        let err = s.init_default_structure().unwrap_err();
        assert!(matches!(err, VfsError::AlreadyExists(_)), "{backend}: {err:?}");
    }
}

#[test]
fn test_sqlite_tree_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vfs.db");

    {
        let store: Arc<dyn NodeStore> = Arc::new(SqliteStore::open(&path).unwrap());
        let s = VfsSession::open(store, "alice");
        s.mkdir("docs").unwrap();
        s.write("docs/notes.txt", "remember me").unwrap();
    }

    let store: Arc<dyn NodeStore> = Arc::new(SqliteStore::open(&path).unwrap());
    let mut s = VfsSession::open(store, "alice");
    assert!(!s.is_fresh().unwrap());
    s.cd("docs").unwrap();
    assert_eq!(s.cat("notes.txt").unwrap(), "remember me");
}

#[test]
fn test_sqlite_position_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vfs.db");

    {
        let store: Arc<dyn NodeStore> = Arc::new(SqliteStore::open(&path).unwrap());
        let mut s = VfsSession::open(store, "alice");
        s.mkdir("docs").unwrap();
        s.cd("docs").unwrap();
        s.save_position().unwrap();
    }

    let store: Arc<dyn NodeStore> = Arc::new(SqliteStore::open(&path).unwrap());
    let mut s = VfsSession::open(store, "alice");
    assert_eq!(s.pwd(), "/");
    assert_eq!(s.resume().unwrap(), "/docs");
}
