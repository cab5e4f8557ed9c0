use std::fs::{self, OpenOptions};
use std::io::Write;

use feedlog::core::file::{FeedFile, WriteMode};
use feedlog::core::record::{decode, encode, RECORD_SIZE};
use feedlog::{Error, FeedStore, PostOutcome, Record};
use tempfile::tempdir;

fn read_records(store: &FeedStore, id: u32) -> Vec<(u32, f32)> {
    let bytes = fs::read(store.feed_path(id)).expect("read feed file");
    bytes
        .chunks_exact(RECORD_SIZE)
        .map(|chunk| decode(chunk).expect("decode"))
        .collect()
}

#[test]
fn monotonic_posts_append_in_order() {
    let dir = tempdir().expect("tempdir");
    let store = FeedStore::open(dir.path());
    assert!(store.create_feed(1));

    for i in 0..50u32 {
        let outcome = store.post(1, 1_000 + i * 10, i as f32).expect("post");
        assert_eq!(outcome, PostOutcome::Appended);
    }

    assert_eq!(store.feed_size(1).expect("size"), 50 * RECORD_SIZE as u64);
    assert_eq!(store.record_count(1).expect("count"), 50);
    let records = read_records(&store, 1);
    for (i, &(time, value)) in records.iter().enumerate() {
        assert_eq!(time, 1_000 + i as u32 * 10);
        assert_eq!(value, i as f32);
    }

    let raw = fs::read(store.feed_path(1)).expect("raw");
    assert!(raw.chunks_exact(RECORD_SIZE).all(|chunk| chunk[0] == 0xF9));
}

#[test]
fn older_matching_time_updates_in_place() {
    let dir = tempdir().expect("tempdir");
    let store = FeedStore::open(dir.path());
    store.create_feed(2);
    for (time, value) in [(100, 1.0), (110, 2.0), (120, 3.0)] {
        store.post(2, time, value).expect("post");
    }

    assert_eq!(store.post(2, 110, 9.5).expect("update"), PostOutcome::Updated);
    assert_eq!(store.update(2, 100, -1.0).expect("update"), PostOutcome::Updated);
    assert_eq!(store.post(2, 120, 7.0).expect("update last"), PostOutcome::Updated);

    assert_eq!(store.feed_size(2).expect("size"), 27);
    assert_eq!(
        read_records(&store, 2),
        vec![(100, -1.0), (110, 9.5), (120, 7.0)]
    );
}

#[test]
fn older_unmatched_time_is_dropped() {
    let dir = tempdir().expect("tempdir");
    let store = FeedStore::open(dir.path());
    store.create_feed(3);
    store.post(3, 100, 1.0).expect("post");
    store.post(3, 120, 2.0).expect("post");
    let before = fs::read(store.feed_path(3)).expect("before");

    let outcome = store.post(3, 110, 5.0).expect("post");
    assert_eq!(outcome, PostOutcome::Dropped);
    assert!(!outcome.is_written());
    assert_eq!(store.post(3, 50, 5.0).expect("post"), PostOutcome::Dropped);

    assert_eq!(fs::read(store.feed_path(3)).expect("after"), before);
}

#[test]
fn torn_tail_is_repaired_by_next_post() {
    let dir = tempdir().expect("tempdir");
    let store = FeedStore::open(dir.path());
    store.create_feed(4);
    store.post(4, 100, 1.0).expect("post");
    store.post(4, 110, 2.0).expect("post");

    {
        let mut file = OpenOptions::new()
            .append(true)
            .open(store.feed_path(4))
            .expect("open");
        file.write_all(&encode(120, 3.0)[..4]).expect("partial write");
    }
    assert_eq!(store.feed_size(4).expect("size"), 22);

    assert_eq!(store.post(4, 130, 4.0).expect("post"), PostOutcome::Repaired);
    assert_eq!(store.feed_size(4).expect("size"), 27);
    assert_eq!(
        read_records(&store, 4),
        vec![(100, 1.0), (110, 2.0), (130, 4.0)]
    );

    assert_eq!(store.post(4, 140, 5.0).expect("post"), PostOutcome::Appended);
    assert_eq!(store.feed_size(4).expect("size"), 36);
}

#[test]
fn tail_shorter_than_one_record_is_replaced() {
    let dir = tempdir().expect("tempdir");
    let store = FeedStore::open(dir.path());
    fs::write(store.feed_path(5), [0xF9, 0x01, 0x02]).expect("seed");

    assert_eq!(store.post(5, 42, 4.2).expect("post"), PostOutcome::Repaired);
    assert_eq!(read_records(&store, 5), vec![(42, 4.2)]);
}

#[test]
fn post_fails_fast_while_feed_is_locked() {
    let dir = tempdir().expect("tempdir");
    let store = FeedStore::open(dir.path());
    store.create_feed(6);
    store.post(6, 100, 1.0).expect("post");

    let holder = FeedFile::open_for_write(store.feed_path(6), WriteMode::ReadWrite).expect("lock");
    match store.post(6, 110, 2.0) {
        Err(Error::Locked(path)) => assert_eq!(path, store.feed_path(6)),
        other => panic!("expected Locked, got {other:?}"),
    }
    assert_eq!(store.feed_size(6).expect("size"), 9);

    holder.close();
    assert_eq!(store.post(6, 110, 2.0).expect("post"), PostOutcome::Appended);
}

#[test]
fn post_to_missing_feed_is_not_found() {
    let dir = tempdir().expect("tempdir");
    let store = FeedStore::open(dir.path());
    assert!(matches!(store.post(9, 100, 1.0), Err(Error::NotFound(9))));
    assert!(!store.feed_exists(9));
}

#[test]
fn create_is_idempotent_and_keeps_data() {
    let dir = tempdir().expect("tempdir");
    let store = FeedStore::open(dir.path());
    assert!(store.create_feed(7));
    store.post(7, 100, 1.0).expect("post");
    assert!(store.create_feed(7));
    assert_eq!(store.feed_size(7).expect("size"), 9);
}

#[test]
fn create_in_missing_directory_fails() {
    let dir = tempdir().expect("tempdir");
    let store = FeedStore::open(dir.path().join("does-not-exist"));
    assert!(!store.create_feed(1));
}

#[test]
fn delete_is_idempotent() {
    let dir = tempdir().expect("tempdir");
    let store = FeedStore::open(dir.path());
    store.create_feed(8);
    assert!(store.delete_feed(8).expect("delete"));
    assert!(!store.feed_exists(8));
    assert!(!store.delete_feed(8).expect("second delete"));
    assert!(matches!(store.feed_size(8), Err(Error::NotFound(8))));
}

#[test]
fn lastvalue_covers_missing_empty_and_populated() {
    let dir = tempdir().expect("tempdir");
    let store = FeedStore::open(dir.path());
    assert!(matches!(store.lastvalue(10), Err(Error::NotFound(10))));

    store.create_feed(10);
    assert_eq!(store.lastvalue(10).expect("empty"), Record::new(0, 0.0));

    store.post(10, 100, 1.0).expect("post");
    store.post(10, 200, 2.0).expect("post");
    assert_eq!(store.lastvalue(10).expect("last"), Record::new(200, 2.0));
}

#[test]
fn store_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<FeedStore>();
}
