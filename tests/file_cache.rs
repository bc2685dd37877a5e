// ==============================================
// FILE CACHE TESTS (integration)
// ==============================================
//
// Files live in a fresh temp directory per test. Rewrites pin the
// modification time to an explicit value so the change is visible even on
// filesystems with coarse timestamp granularity.

use std::fs::{self, File, FileTimes};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, UNIX_EPOCH};

use memokit::error::FileCacheError;
use memokit::file::{self, FileCache, FileContents, FileRequest, file_cache};
use memokit::key::{NamedArgs, named};
use memokit::memo::MemoCache;
use tempfile::TempDir;

const SAMPLES: [(&str, &str); 4] = [
    ("sample.txt", "abc"),
    ("sample2.txt", "def"),
    ("sample3.txt", "ghi"),
    ("sample4.txt", "jkl"),
];

fn setup() -> (TempDir, Vec<PathBuf>) {
    let dir = tempfile::tempdir().unwrap();
    let paths = SAMPLES
        .iter()
        .map(|(name, data)| {
            let path = dir.path().join(name);
            fs::write(&path, data).unwrap();
            path
        })
        .collect();
    (dir, paths)
}

fn rewrite(path: &Path, data: &str, mtime_secs: u64) {
    fs::write(path, data).unwrap();
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(UNIX_EPOCH + Duration::from_secs(mtime_secs))
        .unwrap();
}

/// File cache built from the public key/value functions, counting reads.
fn counting_cache(capacity: isize) -> (FileCache, Arc<AtomicUsize>) {
    let reads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&reads);
    let cache = MemoCache::with_key_deriver(
        capacity,
        move |request: &FileRequest, named: &NamedArgs<String>| {
            counter.fetch_add(1, Ordering::SeqCst);
            file::read_contents(request, named)
        },
        file::derive_key,
    );
    (cache, reads)
}

fn text(cache: &mut FileCache, path: &Path) -> String {
    let contents = cache
        .get(&FileRequest::text(path), &NamedArgs::new())
        .unwrap();
    contents.as_text().unwrap().to_string()
}

// ==============================================
// Hits and misses
// ==============================================

#[test]
fn cached_files_are_not_read_again() {
    let (_dir, paths) = setup();
    let (mut cache, reads) = counting_cache(3);

    for (path, (_, data)) in paths.iter().zip(SAMPLES).take(3) {
        assert_eq!(text(&mut cache, path), data);
    }
    assert_eq!(reads.load(Ordering::SeqCst), 3);

    for (path, (_, data)) in paths.iter().zip(SAMPLES).take(3) {
        assert_eq!(text(&mut cache, path), data);
    }
    assert_eq!(reads.load(Ordering::SeqCst), 3);

    // A fourth file evicts sample.txt; the other two stay cached.
    assert_eq!(text(&mut cache, &paths[3]), "jkl");
    assert_eq!(text(&mut cache, &paths[1]), "def");
    assert_eq!(text(&mut cache, &paths[2]), "ghi");
    assert_eq!(reads.load(Ordering::SeqCst), 4);

    assert_eq!(text(&mut cache, &paths[0]), "abc");
    assert_eq!(reads.load(Ordering::SeqCst), 5);
}

#[test]
fn options_are_cached_separately() {
    let (_dir, paths) = setup();
    let (mut cache, reads) = counting_cache(6);
    let ascii = named([("encoding", "ascii".to_string())]);

    for path in &paths[..3] {
        text(&mut cache, path);
    }
    for (path, (_, data)) in paths.iter().zip(SAMPLES).take(3) {
        let contents = cache.get(&FileRequest::text(path), &ascii).unwrap();
        assert_eq!(contents.as_text(), Some(data));
    }

    assert_eq!(reads.load(Ordering::SeqCst), 6);
    assert_eq!(cache.len(), 6);
}

#[test]
fn text_mode_spellings_share_an_entry() {
    let (_dir, paths) = setup();
    let (mut cache, reads) = counting_cache(3);

    for mode in ["r", "rt", "r", "rt"] {
        let contents = cache
            .get(&FileRequest::new(&paths[0], mode), &NamedArgs::new())
            .unwrap();
        assert_eq!(contents.as_text(), Some("abc"));
    }

    assert_eq!(reads.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn cached_gets_leave_access_times_alone() {
    let (_dir, paths) = setup();
    let mut cache = file_cache(3);
    for path in &paths[..3] {
        text(&mut cache, path);
    }

    // Push atime behind mtime so that, even under relatime, any real read
    // would move it forward.
    let past = UNIX_EPOCH + Duration::from_secs(1_000_000);
    for path in &paths[..3] {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_times(FileTimes::new().set_accessed(past))
            .unwrap();
    }
    // Setting times bumps ctime, so each file is read once more to re-cache.
    for path in &paths[..3] {
        text(&mut cache, path);
    }
    let accessed = |path: &Path| fs::metadata(path).unwrap().accessed().unwrap();
    let before: Vec<_> = paths[..3].iter().map(|p| accessed(p)).collect();

    for _ in 0..3 {
        for (path, (_, data)) in paths.iter().zip(SAMPLES).take(3) {
            assert_eq!(text(&mut cache, path), data);
        }
    }

    let after: Vec<_> = paths[..3].iter().map(|p| accessed(p)).collect();
    assert_eq!(before, after);
    assert_eq!(cache.len(), 3);
}

#[test]
fn text_and_binary_modes_are_cached_separately() {
    let (_dir, paths) = setup();
    let (mut cache, reads) = counting_cache(4);

    let as_text = cache
        .get(&FileRequest::text(&paths[0]), &NamedArgs::new())
        .unwrap();
    let as_bytes = cache
        .get(&FileRequest::binary(&paths[0]), &NamedArgs::new())
        .unwrap();

    assert_eq!(*as_text, FileContents::Text("abc".to_string()));
    assert_eq!(*as_bytes, FileContents::Binary(b"abc".to_vec()));
    assert_eq!(reads.load(Ordering::SeqCst), 2);
}

// ==============================================
// Invalidation
// ==============================================

#[test]
fn rewritten_file_is_read_once_more() {
    let (_dir, paths) = setup();
    let (mut cache, reads) = counting_cache(3);
    for path in &paths[..3] {
        text(&mut cache, path);
    }

    rewrite(&paths[0], "ABC", 1_000_000);

    assert_eq!(text(&mut cache, &paths[0]), "ABC");
    assert_eq!(text(&mut cache, &paths[1]), "def");
    assert_eq!(text(&mut cache, &paths[2]), "ghi");
    assert_eq!(text(&mut cache, &paths[0]), "ABC");
    assert_eq!(reads.load(Ordering::SeqCst), 4);
}

#[test]
fn stale_entry_lingers_until_evicted() {
    let (_dir, paths) = setup();
    let (mut cache, _) = counting_cache(3);
    text(&mut cache, &paths[0]);

    rewrite(&paths[0], "ABC", 1_000_000);
    text(&mut cache, &paths[0]);

    // Old and new versions of the same path each hold a slot.
    assert_eq!(cache.len(), 2);
    let keyed_paths: Vec<&Path> = cache.keys().map(|key| key.path()).collect();
    assert_eq!(keyed_paths, vec![paths[0].as_path(), paths[0].as_path()]);

    text(&mut cache, &paths[1]);
    text(&mut cache, &paths[2]);
    assert_eq!(cache.len(), 3);

    // Capacity pressure pushed out the stale version, not the fresh one.
    let stamps: Vec<_> = cache
        .keys()
        .filter(|key| key.path() == paths[0].as_path())
        .map(|key| key.stamp().modified())
        .collect();
    assert_eq!(stamps, vec![Some(UNIX_EPOCH + Duration::from_secs(1_000_000))]);
}

#[test]
fn zero_capacity_reads_every_time() {
    let (_dir, paths) = setup();
    let (mut cache, reads) = counting_cache(0);

    for expected in 1..=4 {
        assert_eq!(text(&mut cache, &paths[0]), "abc");
        assert_eq!(reads.load(Ordering::SeqCst), expected);
    }
    assert!(cache.is_empty());
}

// ==============================================
// Text decoding
// ==============================================

#[test]
fn universal_newlines_by_default() {
    let (dir, _) = setup();
    let path = dir.path().join("crlf.txt");
    fs::write(&path, "one\r\ntwo\rthree\n").unwrap();
    let mut cache = file_cache(2);

    assert_eq!(text(&mut cache, &path), "one\ntwo\nthree\n");

    let raw = cache
        .get(&FileRequest::text(&path), &named([("newline", String::new())]))
        .unwrap();
    assert_eq!(raw.as_text(), Some("one\r\ntwo\rthree\n"));
}

#[test]
fn latin1_file_decodes_with_its_encoding() {
    let (dir, _) = setup();
    let path = dir.path().join("latin1.txt");
    fs::write(&path, b"caf\xe9").unwrap();
    let mut cache = file_cache(2);

    let contents = cache
        .get(&FileRequest::text(&path), &named([("encoding", "latin-1".to_string())]))
        .unwrap();
    assert_eq!(contents.as_text(), Some("caf\u{e9}"));
}

#[test]
fn shift_jis_file_decodes_with_its_encoding() {
    let (dir, _) = setup();
    let path = dir.path().join("sjis.txt");
    let (bytes, _, _) = encoding_rs::SHIFT_JIS.encode("日本語\r\nテキスト");
    fs::write(&path, &bytes).unwrap();
    let mut cache = file_cache(2);

    let contents = cache
        .get(&FileRequest::text(&path), &named([("encoding", "shift_jis".to_string())]))
        .unwrap();
    assert_eq!(contents.as_text(), Some("日本語\nテキスト"));

    // Read as UTF-8, the same bytes are not valid text.
    let err = cache
        .get(&FileRequest::text(&path), &NamedArgs::new())
        .unwrap_err();
    assert!(matches!(err, FileCacheError::Decode { encoding: "UTF-8", .. }));
}

#[test]
fn binary_read_keeps_bytes() {
    let (dir, _) = setup();
    let path = dir.path().join("blob.bin");
    fs::write(&path, [0xffu8, 0x00, b'\r', b'\n']).unwrap();
    let mut cache = file_cache(2);

    let contents = cache
        .get(&FileRequest::binary(&path), &NamedArgs::new())
        .unwrap();
    assert_eq!(contents.as_bytes(), &[0xff, 0x00, b'\r', b'\n']);
}

// ==============================================
// Errors
// ==============================================

#[test]
fn missing_file_is_access_error_and_not_cached() {
    let (dir, _) = setup();
    let mut cache = file_cache(2);
    let missing = dir.path().join("missing.txt");

    let err = cache
        .get(&FileRequest::text(&missing), &NamedArgs::new())
        .unwrap_err();
    assert!(matches!(err, FileCacheError::Access { .. }));
    assert!(cache.is_empty());

    fs::write(&missing, "now here").unwrap();
    assert_eq!(text(&mut cache, &missing), "now here");
}

#[test]
fn write_mode_is_unsupported() {
    let (_dir, paths) = setup();
    let (mut cache, _) = counting_cache(2);

    for mode in ["w", "a", "r+", "wb"] {
        let err = cache
            .get(&FileRequest::new(&paths[0], mode), &NamedArgs::new())
            .unwrap_err();
        assert!(
            matches!(err, FileCacheError::UnsupportedMode(ref m) if m == mode),
            "mode {mode}: {err}"
        );
    }
    assert!(cache.is_empty());
    assert_eq!(fs::read_to_string(&paths[0]).unwrap(), "abc");
}

#[test]
fn invalid_utf8_fails_in_strict_mode() {
    let (dir, _) = setup();
    let path = dir.path().join("latin1.txt");
    fs::write(&path, [b'c', b'a', b'f', 0xe9]).unwrap();
    let mut cache = file_cache(2);

    let err = cache
        .get(&FileRequest::text(&path), &NamedArgs::new())
        .unwrap_err();
    assert!(matches!(err, FileCacheError::Decode { offset: 3, .. }));

    let lossy = cache
        .get(&FileRequest::text(&path), &named([("errors", "replace".to_string())]))
        .unwrap();
    assert_eq!(lossy.as_text(), Some("caf\u{fffd}"));
    assert_eq!(cache.len(), 1);
}

#[test]
fn unknown_option_is_rejected() {
    let (_dir, paths) = setup();
    let mut cache = file_cache(2);

    let err = cache
        .get(
            &FileRequest::text(&paths[0]),
            &named([("buffering", "1".to_string())]),
        )
        .unwrap_err();
    assert!(matches!(err, FileCacheError::InvalidOption { ref name, .. } if name == "buffering"));
}

#[test]
fn cache_can_live_in_a_process_wide_singleton() {
    use std::sync::{LazyLock, Mutex};

    static SHARED: LazyLock<Mutex<FileCache>> = LazyLock::new(|| Mutex::new(file_cache(8)));

    let (_dir, paths) = setup();
    let handles: Vec<_> = paths
        .iter()
        .cloned()
        .map(|path| {
            std::thread::spawn(move || {
                let mut cache = SHARED.lock().unwrap();
                text(&mut cache, &path)
            })
        })
        .collect();

    let mut texts: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    texts.sort();
    assert_eq!(texts, vec!["abc", "def", "ghi", "jkl"]);
    assert_eq!(SHARED.lock().unwrap().len(), 4);
}
