mod common;

use common::*;
use regtune::{MemoryStore, RawValue, RegData};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_concurrent_stage_poll_apply() {
    let fixture = TestFixture::new();
    let store = fixture.store.clone();
    let manager = Arc::new(fixture.manager);
    let barrier = Arc::new(Barrier::new(10));
    let mut handles = vec![];

    for i in 0..10 {
        let m = Arc::clone(&manager);
        let b = Arc::clone(&barrier);
        let s = store.clone();
        handles.push(thread::spawn(move || {
            b.wait();
            for round in 0..20 {
                match i % 4 {
                    0 => {
                        let _ = m.stage("delay", (round % 20) * 100);
                    }
                    1 => {
                        let _ = m.poll_drift();
                    }
                    2 => {
                        m.apply_all().unwrap();
                    }
                    _ => {
                        s.insert(activity_loc(), RegData::Dword(round % 2));
                        let _ = m.undo();
                    }
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    // Engine is still consistent: one last apply leaves nothing pending
    manager.apply_all().unwrap();
    assert!(!manager.has_pending());
    let delay = manager.current("delay").unwrap();
    assert!(matches!(delay, RawValue::Text(_)));
}

#[test]
fn test_concurrent_staging_of_distinct_settings() {
    let fixture = TestFixture::configure(MemoryStore::new(), |b| b);
    let manager = Arc::new(fixture.manager);
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = ["x", "align", "delay", "activity"]
        .into_iter()
        .map(|id| {
            let m = Arc::clone(&manager);
            let b = Arc::clone(&barrier);
            thread::spawn(move || {
                b.wait();
                m.stage(id, 0).unwrap();
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(manager.pending_count(), 4);
    assert_eq!(manager.undo_len(), 4);
    assert_eq!(manager.apply_all().unwrap().counts(), (4, 0));
}
