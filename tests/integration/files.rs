//! File uploads: multipart shape, splitting, and failure isolation.

use std::time::Duration;

use crate::*;

#[tokio::test]
async fn small_file_uploads_as_single_multipart() {
    let hook = MockWebhook::start().await;
    let config = test_config(&hook.url());
    let dispatcher = dispatcher_for(&config);

    let dir = temp_dir("small-file");
    let path = dir.join("notes.txt");
    std::fs::write(&path, b"meeting at noon").unwrap();

    let summary = dispatcher.dispatch_files(vec![path]).await;

    assert_eq!(summary.delivered, 1);
    let requests = hook.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].file_name.as_deref(), Some("notes.txt"));
    assert_eq!(
        requests[0].file_bytes.as_deref(),
        Some(b"meeting at noon".as_slice())
    );
}

#[tokio::test]
async fn attachment_response_counts_as_delivered() {
    let hook = MockWebhook::start_with(vec![Reply::AttachmentJson], Duration::ZERO).await;
    let config = test_config(&hook.url());
    let dispatcher = dispatcher_for(&config);

    let dir = temp_dir("attachment-ok");
    let path = dir.join("photo.jpg");
    std::fs::write(&path, b"not really a jpeg").unwrap();

    let summary = dispatcher.dispatch_files(vec![path]).await;

    assert_eq!(summary.delivered, 1);
    assert!(summary.is_clean());
}

#[tokio::test]
async fn rejected_file_is_not_retried() {
    let hook = MockWebhook::start_with(vec![Reply::Rejected(413)], Duration::ZERO).await;
    let config = test_config(&hook.url());
    let dispatcher = dispatcher_for(&config);

    let dir = temp_dir("rejected-file");
    let path = dir.join("blob.bin");
    std::fs::write(&path, b"contents").unwrap();

    let summary = dispatcher.dispatch_files(vec![path]).await;

    assert_eq!(summary.gave_up, 1);
    assert_eq!(summary.delivered, 0);
    assert_eq!(hook.request_count(), 1);
}

#[tokio::test]
async fn oversized_file_splits_into_sequential_parts() {
    let hook = MockWebhook::start().await;
    let mut config = test_config(&hook.url());
    config.max_file_size = 10;
    let dispatcher = dispatcher_for(&config);

    let dir = temp_dir("oversized");
    let path = dir.join("blob.bin");
    let original: Vec<u8> = (0u8..25).collect();
    std::fs::write(&path, &original).unwrap();

    let summary = dispatcher.dispatch_files(vec![path.clone()]).await;

    assert_eq!(summary.delivered, 1);
    assert!(summary.is_clean());

    let requests = hook.requests();
    assert_eq!(requests.len(), 3);
    let names: Vec<&str> = requests
        .iter()
        .filter_map(|r| r.file_name.as_deref())
        .collect();
    assert_eq!(names, ["blob.bin.1", "blob.bin.2", "blob.bin.3"]);

    // Parts carry the whole file in order.
    let mut reassembled = Vec::new();
    for request in &requests {
        reassembled.extend_from_slice(request.file_bytes.as_deref().unwrap());
    }
    assert_eq!(reassembled, original);

    // Splitting leaves the original alone and the parts on disk.
    assert_eq!(std::fs::read(&path).unwrap(), original);
    assert!(dir.join("blob.bin.1").exists());
    assert!(dir.join("blob.bin.3").exists());
}

#[tokio::test]
async fn rejected_part_does_not_stop_remaining_parts() {
    let hook = MockWebhook::start_with(vec![Reply::Rejected(500)], Duration::ZERO).await;
    let mut config = test_config(&hook.url());
    config.max_file_size = 10;
    let dispatcher = dispatcher_for(&config);

    let dir = temp_dir("partial-parts");
    let path = dir.join("blob.bin");
    std::fs::write(&path, vec![7u8; 20]).unwrap();

    let summary = dispatcher.dispatch_files(vec![path]).await;

    // First part bounced, second still went out.
    assert_eq!(hook.request_count(), 2);
    assert_eq!(summary.gave_up, 1);
}

#[tokio::test]
async fn missing_file_fails_without_touching_the_network() {
    let hook = MockWebhook::start().await;
    let config = test_config(&hook.url());
    let dispatcher = dispatcher_for(&config);

    let summary = dispatcher
        .dispatch_files(vec!["/no/such/file.txt".into()])
        .await;

    assert_eq!(summary.failed, 1);
    assert_eq!(hook.request_count(), 0);
}

#[tokio::test]
async fn failures_are_isolated_between_files() {
    let hook = MockWebhook::start_with(vec![Reply::Rejected(500)], Duration::ZERO).await;
    let mut config = test_config(&hook.url());
    // One worker so the scripted rejection hits the first file.
    config.max_workers = 1;
    let dispatcher = dispatcher_for(&config);

    let dir = temp_dir("isolated");
    let first = dir.join("first.txt");
    let second = dir.join("second.txt");
    std::fs::write(&first, b"doomed").unwrap();
    std::fs::write(&second, b"fine").unwrap();

    let summary = dispatcher.dispatch_files(vec![first, second]).await;

    assert_eq!(summary.gave_up, 1);
    assert_eq!(summary.delivered, 1);
    assert_eq!(hook.request_count(), 2);
}
