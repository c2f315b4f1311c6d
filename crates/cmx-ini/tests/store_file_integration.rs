//! Integration tests for `ConfigStore` against real files on disk.
//!
//! Each test works in its own temporary directory and checks the file bytes
//! directly, so these tests exercise the loader, cache, typed accessors,
//! writer, and file backing together.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;
use cmx_ini::{ConfigStore, StoreError};
use tempfile::TempDir;

fn settings_file(contents: Option<&str>) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("InstallCMX.ini");
    if let Some(text) = contents {
        fs::write(&path, text).expect("seed settings file");
    }
    (dir, path)
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read settings file")
}

// ── Worked example ────────────────────────────────────────────────────────────

#[test]
fn test_net_timeout_scenario() {
    // Arrange
    let (_dir, path) = settings_file(Some("[Net]\nTimeout=30\n"));
    let store = ConfigStore::open(&path).expect("open");

    // Act
    let timeout = store.get_int("Net", "Timeout", 5).expect("get");
    let retries = store.get_int("Net", "Retries", 3).expect("get");
    store.flush().expect("flush");

    // Assert
    assert_eq!(timeout, 30);
    assert_eq!(retries, 3);
    assert_eq!(read(&path), "[Net]\nTimeout=30\nRetries=3\n");
}

// ── Absence ───────────────────────────────────────────────────────────────────

#[test]
fn test_missing_file_opens_as_empty_clean_store() {
    let (_dir, path) = settings_file(None);

    let store = ConfigStore::open(&path).expect("missing file is not an error");

    assert!(store.section_names().is_empty());
    assert!(!store.is_dirty());
    store.flush().expect("flush");
    assert!(!path.exists(), "a clean flush must not create the file");
}

#[test]
fn test_default_materialization_on_fresh_store() {
    let (_dir, path) = settings_file(None);
    let store = ConfigStore::open(&path).expect("open");

    assert_eq!(store.get_string("s", "k", "d").expect("get"), "d");
    store.flush().expect("flush");

    assert_eq!(read(&path), "[s]\nk=d\n");
}

// ── First-wins on load ────────────────────────────────────────────────────────

#[test]
fn test_duplicate_sections_first_occurrence_wins() {
    let (_dir, path) = settings_file(Some("[A]\nk=first\n\n[A]\nk=second\n"));
    let store = ConfigStore::open(&path).expect("open");

    assert_eq!(store.get_string("A", "k", "x").expect("get"), "first");
}

#[test]
fn test_runtime_set_wins_over_loaded_value() {
    let (_dir, path) = settings_file(Some("[A]\nk=first\nk=second\n"));
    let store = ConfigStore::open(&path).expect("open");

    store.set_string("A", "k", "third").expect("set");
    store.close().expect("close");

    assert_eq!(read(&path), "[A]\nk=third\n");
}

// ── Dirty gating ──────────────────────────────────────────────────────────────

#[test]
fn test_flush_after_load_leaves_file_bytes_unchanged() {
    // Odd spacing and a duplicate key would be normalised by a rewrite.
    let original = "[S]\r\n  k = v  \r\nk=dup\r\n";
    let (_dir, path) = settings_file(Some(original));
    let store = ConfigStore::open(&path).expect("open");

    store.flush().expect("flush");

    assert_eq!(read(&path), original);
}

#[test]
fn test_second_flush_does_not_rewrite_file() {
    let (_dir, path) = settings_file(None);
    let store = ConfigStore::open(&path).expect("open");
    store.set_int("S", "k", 1).expect("set");
    store.flush().expect("first flush");

    // Replace the file behind the store's back; a second flush must not touch it.
    fs::write(&path, "external edit").expect("overwrite");
    store.flush().expect("second flush");

    assert_eq!(read(&path), "external edit");
}

#[test]
fn test_refresh_picks_up_external_edits() {
    let (_dir, path) = settings_file(Some("[S]\nk=1\n"));
    let store = ConfigStore::open(&path).expect("open");
    fs::write(&path, "[S]\nk=2\n").expect("external edit");

    store.refresh().expect("refresh");

    assert_eq!(store.get_int("S", "k", 0).expect("get"), 2);
}

// ── Round-trips through the file ──────────────────────────────────────────────

#[test]
fn test_typed_values_survive_flush_and_reopen() {
    // Arrange
    let (_dir, path) = settings_file(None);
    let stamp = NaiveDate::from_ymd_opt(2024, 2, 29)
        .and_then(|d| d.and_hms_opt(6, 30, 0))
        .expect("valid date");
    {
        let store = ConfigStore::open(&path).expect("open");
        store.set_bool("T", "flag", true).expect("set");
        store.set_int("T", "count", -12).expect("set");
        store.set_float("T", "ratio", 0.75).expect("set");
        store.set_bytes("T", "key", &[0x0A, 0xFF]).expect("set");
        store.set_timestamp("T", "when", stamp).expect("set");
        store.close().expect("close");
    }

    // Act
    let store = ConfigStore::open(&path).expect("reopen");

    // Assert – defaults differ from stored values so a miss would show
    assert!(store.get_bool("T", "flag", false).expect("get"));
    assert_eq!(store.get_int("T", "count", 0).expect("get"), -12);
    assert_eq!(store.get_float("T", "ratio", 0.0).expect("get"), 0.75);
    assert_eq!(store.get_bytes("T", "key", &[]).expect("get"), vec![0x0A, 0xFF]);
    assert_eq!(
        store.get_timestamp("T", "when", NaiveDate::MIN.and_hms_opt(0, 0, 0).unwrap()).expect("get"),
        stamp
    );
    assert_eq!(
        read(&path),
        "[T]\nflag=1\ncount=-12\nratio=0.75\nkey=0aff\nwhen=2024-02-29T06:30:00\n"
    );
}

#[test]
fn test_malformed_values_degrade_to_defaults() {
    let (_dir, path) = settings_file(Some(
        "[Bad]\nflag=yes\ncount=ten\nratio=1,5\nkey=xyz\nwhen=soon\n",
    ));
    let store = ConfigStore::open(&path).expect("open");
    let fallback = NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid date");

    assert!(store.get_bool("Bad", "flag", true).expect("get"));
    assert_eq!(store.get_int("Bad", "count", 7).expect("get"), 7);
    assert_eq!(store.get_float("Bad", "ratio", 2.5).expect("get"), 2.5);
    assert_eq!(store.get_bytes("Bad", "key", &[1]).expect("get"), vec![1]);
    assert_eq!(store.get_timestamp("Bad", "when", fallback).expect("get"), fallback);
    assert!(!store.is_dirty(), "malformed values must not be corrected");
}

#[test]
fn test_whitespace_padded_names_survive_reopen() {
    // Arrange
    let (_dir, path) = settings_file(None);
    let store = ConfigStore::open(&path).expect("open");
    store.set_int("S", " k ", 7).expect("set");
    store.close().expect("close");

    // Act
    let store = ConfigStore::open(&path).expect("reopen");
    let value = store.get_int("S", " k ", 1).expect("get");

    // Assert
    assert_eq!(value, 7);
    assert!(!store.is_dirty());
    assert_eq!(read(&path), "[S]\nk=7\n");
}

#[test]
fn test_bool_beyond_32_bits_reads_as_default() {
    let (_dir, path) = settings_file(Some("[S]\nflag=4294967296\n"));
    let store = ConfigStore::open(&path).expect("open");

    assert!(!store.get_bool("S", "flag", false).expect("get"));
    assert!(store.get_bool("S", "flag", true).expect("get"));
}

#[test]
fn test_multiline_value_is_not_written() {
    // Arrange
    let (_dir, path) = settings_file(Some("[S]\nk=v\n"));
    let store = ConfigStore::open(&path).expect("open");

    // Act
    store.set_string("S", "k", "v\n[Injected]\nx=1").expect("set");
    store.set_string("S", "a=b", "c").expect("set");
    store.close().expect("close");

    // Assert
    assert_eq!(read(&path), "[S]\nk=v\n");
}

// ── Failures ──────────────────────────────────────────────────────────────────

#[test]
fn test_open_on_unreadable_path_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");

    // A directory exists but cannot be read as a file.
    let result = ConfigStore::open(dir.path());

    assert!(matches!(result, Err(StoreError::Read { .. })));
}

#[test]
fn test_lazy_open_defers_read_errors_until_first_access() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ConfigStore::open_lazy(dir.path());

    assert!(!store.is_loaded());
    assert!(matches!(
        store.get_string("S", "k", "d"),
        Err(StoreError::Read { .. })
    ));
}

#[test]
fn test_flush_into_missing_directory_is_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ConfigStore::open(dir.path().join("missing").join("x.ini")).expect("open");
    store.set_string("S", "k", "v").expect("set");

    let result = store.flush();

    assert!(matches!(result, Err(StoreError::Write { .. })));
    assert!(store.is_dirty());
}

// ── Scoped disposal ───────────────────────────────────────────────────────────

#[test]
fn test_scope_flushes_on_success() {
    let (_dir, path) = settings_file(None);

    let value: Result<i32, StoreError> =
        ConfigStore::scope(&path, |store| store.get_int("S", "k", 4));

    assert_eq!(value.expect("scope"), 4);
    assert_eq!(read(&path), "[S]\nk=4\n");
}

#[derive(Debug)]
enum InstallError {
    Store(StoreError),
    Aborted,
}

impl From<StoreError> for InstallError {
    fn from(e: StoreError) -> Self {
        InstallError::Store(e)
    }
}

#[test]
fn test_scope_flushes_when_closure_fails() {
    let (_dir, path) = settings_file(None);

    let result: Result<(), InstallError> = ConfigStore::scope(&path, |store| {
        store.set_string("S", "k", "v")?;
        Err(InstallError::Aborted)
    });

    assert!(matches!(result, Err(InstallError::Aborted)));
    assert_eq!(read(&path), "[S]\nk=v\n");
}

#[test]
fn test_dropping_dirty_store_flushes() {
    let (_dir, path) = settings_file(None);
    {
        let store = ConfigStore::open(&path).expect("open");
        store.set_string("S", "k", "v").expect("set");
    }

    assert_eq!(read(&path), "[S]\nk=v\n");
}

// ── Concurrency ───────────────────────────────────────────────────────────────

#[test]
fn test_concurrent_sets_from_many_threads_are_all_persisted() {
    // Arrange
    let (_dir, path) = settings_file(None);
    let store = Arc::new(ConfigStore::open_lazy(&path));
    let thread_count = 8;
    let keys_per_thread = 50;

    // Act
    let handles: Vec<_> = (0..thread_count)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for k in 0..keys_per_thread {
                    store
                        .set_int(&format!("T{t}"), &format!("k{k}"), t * 1000 + k)
                        .expect("set");
                    if k % 10 == 0 {
                        store.flush().expect("flush");
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().expect("thread panicked");
    }
    store.flush().expect("final flush");

    // Assert
    let reopened = ConfigStore::open(&path).expect("reopen");
    assert_eq!(reopened.section_names().len(), thread_count as usize);
    for t in 0..thread_count {
        for k in 0..keys_per_thread {
            assert_eq!(
                reopened
                    .get_int(&format!("T{t}"), &format!("k{k}"), -1)
                    .expect("get"),
                t * 1000 + k
            );
        }
    }
}

#[test]
fn test_concurrent_first_access_loads_exactly_once() {
    let (_dir, path) = settings_file(Some("[S]\nk=loaded\n"));
    let store = Arc::new(ConfigStore::open_lazy(&path));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                store.set_int("W", &format!("w{i}"), i).expect("set");
                store.get_string("S", "k", "default").expect("get")
            })
        })
        .collect();

    for h in handles {
        assert_eq!(h.join().expect("thread panicked"), "loaded");
    }
    // A second load would have discarded the other threads' writes.
    let section = store.section_names();
    assert_eq!(section, vec!["S", "W"]);
    for i in 0..8 {
        assert_eq!(store.get_int("W", &format!("w{i}"), -1).expect("get"), i);
    }
}
