//! Integration tests for record persistence and reconciliation.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use wswd_core::{clean, record_name, Context, RecordStore, StorageConfig, Workspace, WorkspaceId};

fn long_path(fill: char) -> PathBuf {
    let segment: String = std::iter::repeat(fill).take(200).collect();
    let mut path = PathBuf::from("/");
    for _ in 0..40 {
        path.push(&segment);
    }
    path
}

#[test]
fn test_concurrent_reader_never_sees_partial_record() {
    let temp = tempfile::tempdir().unwrap();
    let store = RecordStore::new(temp.path());
    let id = WorkspaceId(0x42);
    let first = long_path('a');
    let second = long_path('b');
    store.write(id, &first).unwrap();

    let done = Arc::new(AtomicBool::new(false));
    let writer = {
        let store = store.clone();
        let (first, second) = (first.clone(), second.clone());
        let done = Arc::clone(&done);
        thread::spawn(move || {
            for i in 0..200 {
                let next = if i % 2 == 0 { &second } else { &first };
                store.write(id, next).unwrap();
            }
            done.store(true, Ordering::SeqCst);
        })
    };

    let mut reads = 0;
    while !done.load(Ordering::SeqCst) || reads == 0 {
        let seen = store.read(id).unwrap().expect("record must always exist");
        assert!(
            seen == first || seen == second,
            "observed a torn record of {} bytes",
            seen.as_os_str().len()
        );
        reads += 1;
    }
    writer.join().unwrap();
}

#[test]
fn test_interrupted_write_leaves_previous_record() {
    let temp = tempfile::tempdir().unwrap();
    let store = RecordStore::new(temp.path());
    let id = WorkspaceId(7);
    store.write(id, Path::new("/home/me/old")).unwrap();

    // A crashed writer leaves its temp file behind without renaming it.
    std::fs::write(temp.path().join(".wswd-crashed"), "/home/me/ne").unwrap();

    assert_eq!(store.read(id).unwrap(), Some(PathBuf::from("/home/me/old")));

    let report = clean(&store, &[id]).unwrap();
    assert_eq!(report.removed, vec![".wswd-crashed"]);
    assert_eq!(store.read(id).unwrap(), Some(PathBuf::from("/home/me/old")));
}

#[test]
fn test_record_name_is_stable_across_stores() {
    let a = tempfile::tempdir().unwrap();
    let b = tempfile::tempdir().unwrap();
    let id = WorkspaceId(0x5581_c1b2_e0a0);

    let first = RecordStore::new(a.path());
    let second = RecordStore::new(b.path());
    first.write(id, Path::new("/p")).unwrap();

    assert_eq!(
        first.record_path(id).file_name(),
        second.record_path(id).file_name()
    );
    assert_eq!(record_name(id), "id-5581c1b2e0a0");
    assert!(a.path().join(record_name(id)).is_file());
}

#[test]
fn test_full_lifecycle_through_context() {
    let temp = tempfile::tempdir().unwrap();
    let storage = StorageConfig::with_root(temp.path().join("wswd"));
    let workspaces = |focused: u64, live: &[u64]| -> Vec<Workspace> {
        live.iter()
            .map(|&id| Workspace {
                id: WorkspaceId(id),
                name: format!("ws{}", id),
                focused: id == focused,
            })
            .collect()
    };

    for id in [1, 2, 3] {
        let ctx = Context::new(&storage, &workspaces(id, &[1, 2, 3])).unwrap();
        ctx.set(&PathBuf::from(format!("/work/{}", id))).unwrap();
    }

    // Workspace 1 is closed.
    let ctx = Context::new(&storage, &workspaces(2, &[2, 3])).unwrap();
    let report = ctx.clean().unwrap();
    assert_eq!(report.removed, vec!["id-1"]);
    assert_eq!(ctx.show().unwrap(), Some(PathBuf::from("/work/2")));

    // A recreated workspace 1 starts fresh.
    let ctx = Context::new(&storage, &workspaces(1, &[1, 2, 3])).unwrap();
    assert_eq!(ctx.show().unwrap(), None);

    // Everything closed: the store disappears.
    let ctx = Context::new(&storage, &workspaces(9, &[9])).unwrap();
    let report = ctx.clean().unwrap();
    assert!(report.store_removed);
    assert!(!storage.store_dir().exists());
}
