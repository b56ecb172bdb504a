//! Staging, undo, refresh and drift behaviour of the state engine

mod common;

use common::*;
use regtune::{DisplayValue, Error, MemoryStore, RawValue, RegData};
use std::sync::{Arc, Mutex};

fn int(n: i64) -> RawValue {
    RawValue::Integer(n)
}

// =============================================================================
// Refresh
// =============================================================================

#[test]
fn test_refresh_reads_store_and_falls_back_to_default() {
    let store = MemoryStore::new();
    store.insert(x_loc(), RegData::Dword(0));
    store.insert(delay_loc(), RegData::Text("200".into()));
    let fixture = TestFixture::with_store(store);
    let m = &fixture.manager;

    assert_eq!(m.current("x").unwrap(), int(0));
    assert_eq!(m.current("delay").unwrap(), RawValue::Text("200".into()));
    // Missing value uses the default
    assert_eq!(m.current("activity").unwrap(), int(1));
    assert!(!m.has_pending());
}

#[test]
fn test_unreadable_value_uses_default() {
    let store = MemoryStore::new();
    store.insert(x_loc(), RegData::Dword(0));
    store.fail_reads_at(&x_loc());
    let fixture = TestFixture::with_store(store);

    assert_eq!(fixture.manager.current("x").unwrap(), int(1));
}

#[test]
fn test_refresh_keeps_staged_edits() {
    let fixture = TestFixture::new();
    let m = &fixture.manager;

    m.stage("x", 0).unwrap();
    fixture.set_external(x_loc(), 1);
    fixture.set_external(activity_loc(), 0);
    m.refresh().unwrap();

    let x = m.instance("x").unwrap();
    assert_eq!(x.staged(), Some(&int(0)));
    assert_eq!(m.current("activity").unwrap(), int(0));
}

#[test]
fn test_scenario_stage_and_apply_single_switch() {
    let store = MemoryStore::new();
    store.insert(x_loc(), RegData::Dword(0));
    let fixture = TestFixture::with_store(store);
    let m = &fixture.manager;

    let x = m.instance("x").unwrap();
    assert_eq!(x.external(), &int(0));
    assert!(!x.is_staged());

    m.stage("x", 1).unwrap();
    let x = m.instance("x").unwrap();
    assert!(x.is_staged());
    assert_eq!(x.staged(), Some(&int(1)));

    let report = m.apply_all().unwrap();
    assert_eq!(report.counts(), (1, 0));
    assert_eq!(fixture.stored(&x_loc()), Some(RegData::Dword(1)));
    assert!(!m.instance("x").unwrap().is_staged());
}

// =============================================================================
// Staging
// =============================================================================

#[test]
fn test_staging_twice_is_idempotent() {
    let fixture = TestFixture::new();
    let m = &fixture.manager;

    m.stage("x", 0).unwrap();
    let once = m.instance("x").unwrap();
    let undo_after_once = m.undo_len();

    m.stage("x", 0).unwrap();
    let twice = m.instance("x").unwrap();

    assert_eq!(once, twice);
    assert_eq!(m.undo_len(), undo_after_once + 1);
}

#[test]
fn test_staging_external_value_clears_edit() {
    let fixture = TestFixture::new();
    let m = &fixture.manager;

    m.stage("x", 0).unwrap();
    assert_eq!(m.pending_ids(), vec!["x".to_string()]);

    m.stage("x", 1).unwrap();
    assert!(!m.has_pending());
    assert_eq!(m.current("x").unwrap(), int(1));
}

#[test]
fn test_staging_external_value_skips_validation() {
    // 2 is neither on nor off, but it is what the store holds
    let store = MemoryStore::new();
    store.insert(x_loc(), RegData::Dword(2));
    let fixture = TestFixture::with_store(store);
    let m = &fixture.manager;

    m.stage("x", 0).unwrap();
    m.stage("x", 2).unwrap();
    assert!(!m.has_pending());
}

#[test]
fn test_invalid_values_are_rejected() {
    let fixture = TestFixture::new();
    let m = &fixture.manager;

    assert!(matches!(
        m.stage("x", 5),
        Err(Error::InvalidSettingValue { .. })
    ));
    assert!(matches!(
        m.stage("align", 2),
        Err(Error::InvalidSettingValue { .. })
    ));
    assert!(matches!(
        m.stage("delay", 2500),
        Err(Error::InvalidSettingValue { .. })
    ));
    assert!(matches!(
        m.stage("delay", "soon"),
        Err(Error::InvalidSettingValue { .. })
    ));
    assert!(matches!(m.stage("nope", 1), Err(Error::SettingNotFound(_))));

    assert!(!m.has_pending());
    assert_eq!(m.undo_len(), 0);
}

#[test]
fn test_text_encoded_values_are_normalized() {
    let fixture = TestFixture::new();
    let m = &fixture.manager;

    m.stage("delay", 100).unwrap();
    assert_eq!(m.current("delay").unwrap(), RawValue::Text("100".into()));

    // "400" equals the external default once normalized
    m.stage("delay", 400).unwrap();
    assert!(!m.has_pending());
}

#[test]
fn test_stage_display_values() {
    let fixture = TestFixture::new();
    let m = &fixture.manager;

    m.stage_display("x", DisplayValue::Switch(false)).unwrap();
    m.stage_display("align", DisplayValue::Choice(0)).unwrap();
    m.stage_display("delay", DisplayValue::Integer(250)).unwrap();

    assert_eq!(m.current("x").unwrap(), int(0));
    assert_eq!(m.current("align").unwrap(), int(0));
    assert_eq!(m.current("delay").unwrap(), RawValue::Text("250".into()));
    assert_eq!(
        m.instance("align").unwrap().display(),
        DisplayValue::Choice(0)
    );

    assert!(matches!(
        m.stage_display("align", DisplayValue::Choice(7)),
        Err(Error::InvalidSettingValue { .. })
    ));
}

#[test]
fn test_gated_setting_is_not_active() {
    let fixture = TestFixture::configure(MemoryStore::new(), |b| b.os_build(19045));
    let m = &fixture.manager;

    assert_eq!(m.os_build(), 19045);
    assert_eq!(m.instances().len(), 3);
    assert!(m.instance("align").is_none());
    assert!(matches!(m.stage("align", 0), Err(Error::SettingNotFound(_))));
}

#[test]
fn test_os_build_detected_from_store() {
    let store = MemoryStore::new();
    store.insert(
        loc(regtune::store::CURRENT_VERSION_PATH, regtune::store::CURRENT_BUILD_VALUE),
        RegData::Text("19045".into()),
    );
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let m = regtune::SettingsStateManager::builder("test-app", store)
        .data_dir(dir.path())
        .schema(test_schema())
        .build()
        .unwrap();

    assert_eq!(m.os_build(), 19045);
    assert!(m.instance("align").is_none());
}

// =============================================================================
// Reset / Discard
// =============================================================================

#[test]
fn test_reset_stages_default() {
    let store = MemoryStore::new();
    store.insert(x_loc(), RegData::Dword(0));
    let fixture = TestFixture::with_store(store);
    let m = &fixture.manager;

    m.reset("x").unwrap();
    assert_eq!(m.instance("x").unwrap().staged(), Some(&int(1)));
}

#[test]
fn test_reset_page() {
    let store = MemoryStore::new();
    store.insert(x_loc(), RegData::Dword(0));
    store.insert(delay_loc(), RegData::Text("100".into()));
    store.insert(activity_loc(), RegData::Dword(0));
    let fixture = TestFixture::with_store(store);
    let m = &fixture.manager;

    assert_eq!(m.reset_page("General").unwrap(), 2);
    assert_eq!(m.pending_ids(), vec!["x".to_string(), "delay".to_string()]);
    assert_eq!(m.current("activity").unwrap(), int(0));
}

#[test]
fn test_discard() {
    let fixture = TestFixture::new();
    let m = &fixture.manager;

    m.stage("x", 0).unwrap();
    assert!(m.discard("x").unwrap());
    assert!(!m.discard("x").unwrap());
    assert_eq!(m.current("x").unwrap(), int(1));
}

// =============================================================================
// Undo
// =============================================================================

#[test]
fn test_undo_restores_previous_current_value() {
    let fixture = TestFixture::new();
    let m = &fixture.manager;

    m.stage("delay", 300).unwrap();
    let before = m.current("delay").unwrap();
    m.stage("delay", 500).unwrap();

    let entry = m.undo().unwrap().unwrap();
    assert_eq!(entry.id, "delay");
    assert_eq!(entry.previous, before);
    assert_eq!(m.current("delay").unwrap(), before);

    m.undo().unwrap();
    m.undo().unwrap();
    assert_eq!(m.current("delay").unwrap(), RawValue::Text("400".into()));
}

#[test]
fn test_undo_back_to_external_clears_edit() {
    let fixture = TestFixture::new();
    let m = &fixture.manager;

    m.stage("x", 0).unwrap();
    m.undo().unwrap();

    assert!(!m.has_pending());
    assert_eq!(m.current("x").unwrap(), int(1));
}

#[test]
fn test_undo_twice_redoes() {
    let fixture = TestFixture::new();
    let m = &fixture.manager;

    m.stage("x", 0).unwrap();
    m.undo().unwrap();
    assert_eq!(m.undo_len(), 1);

    m.undo().unwrap();
    assert_eq!(m.current("x").unwrap(), int(0));
}

#[test]
fn test_undo_on_empty_log() {
    let fixture = TestFixture::new();
    assert!(fixture.manager.undo().unwrap().is_none());
}

// =============================================================================
// Drift / Revert
// =============================================================================

#[test]
fn test_poll_drift_reports_external_changes() {
    let fixture = TestFixture::new();
    let m = &fixture.manager;

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = Arc::clone(&seen);
    m.events().on_drift(move |count, ids| {
        seen_clone.lock().unwrap().push((count, ids.to_vec()));
    });

    assert!(m.poll_drift().unwrap().is_empty());

    fixture.set_external(activity_loc(), 0);
    let report = m.poll_drift().unwrap();
    assert_eq!(report.changed, vec!["activity".to_string()]);
    assert_eq!(m.current("activity").unwrap(), int(0));

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0], (1, vec!["activity".to_string()]));
}

#[test]
fn test_drift_never_clobbers_staged() {
    let store = MemoryStore::new();
    store.insert(x_loc(), RegData::Dword(0));
    let fixture = TestFixture::with_store(store);
    let m = &fixture.manager;

    m.stage("x", 1).unwrap();
    fixture.set_external(x_loc(), 2);

    let report = m.poll_drift().unwrap();
    assert!(report.is_empty());

    let x = m.instance("x").unwrap();
    assert_eq!(x.external(), &int(0));
    assert_eq!(x.staged(), Some(&int(1)));
}

#[test]
fn test_revert_all_restores_ground_truth() {
    let fixture = TestFixture::new();
    let m = &fixture.manager;

    m.stage("x", 0).unwrap();
    m.stage("delay", 100).unwrap();
    fixture.set_external(x_loc(), 0);
    fixture.set_external(activity_loc(), 0);

    assert_eq!(m.revert_all().unwrap(), 2);
    assert!(!m.has_pending());

    for instance in m.instances() {
        let stored = fixture
            .stored(&instance.definition().location)
            .map(|data| instance.definition().normalize(data.into()))
            .unwrap_or_else(|| instance.definition().default.clone());
        assert_eq!(instance.external(), &stored, "{}", instance.id());
    }

    // Undo history survives a revert
    assert_eq!(m.undo_len(), 2);
}

// =============================================================================
// Events
// =============================================================================

#[test]
fn test_change_listeners() {
    let fixture = TestFixture::new();
    let m = &fixture.manager;

    let changes = Arc::new(Mutex::new(Vec::new()));
    let changes_clone = Arc::clone(&changes);
    m.events().on_change(move |id, old, new| {
        changes_clone
            .lock()
            .unwrap()
            .push((id.to_string(), old.clone(), new.clone()));
    });

    let watched = Arc::new(Mutex::new(0));
    let watched_clone = Arc::clone(&watched);
    m.events().watch("delay", move |_, _, _| {
        *watched_clone.lock().unwrap() += 1;
    });

    m.stage("x", 0).unwrap();
    // No-op stage does not notify
    m.stage("x", 0).unwrap();
    m.stage("delay", 200).unwrap();
    m.undo().unwrap();

    let changes = changes.lock().unwrap();
    assert_eq!(changes.len(), 3);
    assert_eq!(changes[0], ("x".to_string(), int(1), int(0)));
    assert_eq!(*watched.lock().unwrap(), 2);
}

#[test]
fn test_custom_validator() {
    let fixture = TestFixture::new();
    let m = &fixture.manager;

    m.events().add_validator("delay", |v| match v.as_integer() {
        Some(n) if n % 100 == 0 => Ok(()),
        _ => Err("must be a multiple of 100".into()),
    });

    assert!(m.stage("delay", 200).is_ok());
    let err = m.stage("delay", 150).unwrap_err();
    assert!(err.to_string().contains("multiple of 100"));
}

#[test]
fn test_listener_may_call_back_into_manager() {
    let fixture = TestFixture::new();
    let manager = Arc::new(fixture.manager);

    let seen = Arc::new(Mutex::new(None));
    let seen_clone = Arc::clone(&seen);
    let weak = Arc::downgrade(&manager);
    manager.events().watch("x", move |_, _, _| {
        if let Some(m) = weak.upgrade() {
            *seen_clone.lock().unwrap() = Some(m.pending_count());
        }
    });

    manager.stage("x", 0).unwrap();
    assert_eq!(*seen.lock().unwrap(), Some(1));
}
