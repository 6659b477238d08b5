use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use sharefs_provider::{DiskStore, ResourceRef, ShareProvider};

fn disk_provider(root: &Path) -> ShareProvider<DiskStore> {
    let store = DiskStore::new(root.to_path_buf()).unwrap();
    ShareProvider::new("com.example.viewer", store)
}

#[test]
fn consumer_blocks_until_producer_publishes() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(disk_provider(dir.path()));
    let address = provider.begin_share();

    let consumer = {
        let provider = Arc::clone(&provider);
        let address = address.clone();
        thread::spawn(move || provider.open_bytes(&address))
    };

    thread::sleep(Duration::from_millis(100));
    fs::create_dir_all(dir.path().join("exports")).unwrap();
    fs::write(dir.path().join("exports/data.txt"), b"finished payload").unwrap();
    let reference = ResourceRef::parse("exports/data.txt").unwrap();
    provider.publish(&address, Some(reference)).unwrap();

    let bytes = consumer.join().unwrap().unwrap().unwrap();
    assert_eq!(&bytes[..], b"finished payload");
}

#[test]
fn every_consumer_of_one_share_is_served() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(disk_provider(dir.path()));
    let address = provider.begin_share();

    let consumers: Vec<_> = (0..3)
        .map(|_| {
            let provider = Arc::clone(&provider);
            let address = address.clone();
            thread::spawn(move || provider.open_bytes(&address))
        })
        .collect();

    thread::sleep(Duration::from_millis(100));
    fs::write(dir.path().join("shared.txt"), b"one for all").unwrap();
    let reference = ResourceRef::parse("shared.txt").unwrap();
    provider.publish(&address, Some(reference)).unwrap();

    for consumer in consumers {
        let bytes = consumer.join().unwrap().unwrap().unwrap();
        assert_eq!(&bytes[..], b"one for all");
    }
}

#[test]
fn newer_share_releases_consumer_with_absence() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(disk_provider(dir.path()));
    let first = provider.begin_share();

    let consumer = {
        let provider = Arc::clone(&provider);
        let first = first.clone();
        thread::spawn(move || provider.open_bytes(&first))
    };

    thread::sleep(Duration::from_millis(100));
    let _second = provider.begin_share();

    assert!(consumer.join().unwrap().unwrap().is_none());
}

#[test]
fn delete_of_pending_address_releases_consumer() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(disk_provider(dir.path()));
    let address = provider.begin_share();

    let consumer = {
        let provider = Arc::clone(&provider);
        let address = address.clone();
        thread::spawn(move || provider.open_bytes(&address))
    };

    thread::sleep(Duration::from_millis(100));
    assert!(provider.delete(&address).unwrap());

    assert!(consumer.join().unwrap().unwrap().is_none());
    assert!(!provider.delete(&address).unwrap());
}

#[test]
fn superseded_publication_reaches_nobody() {
    let dir = tempfile::tempdir().unwrap();
    let provider = disk_provider(dir.path());

    let stale = provider.begin_share();
    let current = provider.begin_share();

    fs::write(dir.path().join("late.txt"), b"too late").unwrap();
    let reference = ResourceRef::parse("late.txt").unwrap();
    provider.publish(&stale, Some(reference.clone())).unwrap();

    // The stale publication neither serves its own address nor leaks into
    // the current one.
    assert!(provider.open_bytes(&stale).unwrap().is_none());
    provider.publish(&current, Some(reference)).unwrap();
    let bytes = provider.open_bytes(&current).unwrap().unwrap();
    assert_eq!(&bytes[..], b"too late");
}

#[test]
fn existing_resource_full_surface() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("reports")).unwrap();
    fs::write(dir.path().join("reports/q3.pdf"), b"%PDF-1.7").unwrap();

    let provider = disk_provider(dir.path());
    let reference = ResourceRef::parse("reports/q3.pdf").unwrap();
    let address = provider.share_existing(&reference);

    let bytes = provider.open_bytes(&address).unwrap().unwrap();
    assert_eq!(&bytes[..], b"%PDF-1.7");

    assert_eq!(
        provider.content_type(&address).unwrap(),
        Some("application/pdf")
    );

    let row = provider.query(&address).unwrap().unwrap();
    assert_eq!(row["name"], serde_json::json!("reports/q3.pdf"));
    assert_eq!(row["size"], serde_json::json!(8));
    assert!(row["data"].as_str().unwrap().ends_with("q3.pdf"));

    assert!(provider.delete(&address).unwrap());
    assert!(provider.open(&address).unwrap().is_none());
    assert!(provider.query(&address).unwrap().is_none());
}

#[test]
fn query_of_missing_resource_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let provider = disk_provider(dir.path());

    let reference = ResourceRef::parse("ghost.txt").unwrap();
    let address = provider.share_existing(&reference);

    assert!(provider.query(&address).unwrap().is_none());
    assert!(provider.open(&address).unwrap().is_none());
}
