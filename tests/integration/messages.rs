//! Message delivery end to end: chunking, ordering, rejection.

use crate::*;

#[tokio::test]
async fn single_chunk_message_is_delivered() {
    let hook = MockWebhook::start().await;
    let config = test_config(&hook.url());
    let dispatcher = dispatcher_for(&config);

    let summary = dispatcher
        .dispatch_message("status: all good", config.max_message_length)
        .await;

    assert_eq!(summary.delivered, 1);
    assert!(summary.is_clean());
    let requests = hook.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].content.as_deref(), Some("status: all good"));
}

#[tokio::test]
async fn long_message_splits_and_delivers_every_chunk() {
    let hook = MockWebhook::start().await;
    let config = test_config(&hook.url());
    let dispatcher = dispatcher_for(&config);

    let text = format!("alpha\n{}", "bcdefghijklmnopqrstuvwxyz");
    let summary = dispatcher.dispatch_message(&text, 10).await;

    assert_eq!(summary.delivered, 4);
    assert!(summary.is_clean());

    // Workers may finish out of order, so compare as a multiset.
    let mut contents: Vec<String> = hook
        .requests()
        .into_iter()
        .filter_map(|r| r.content)
        .collect();
    contents.sort();
    let mut expected = vec!["alpha", "bcdefghijk", "lmnopqrstu", "vwxyz"];
    expected.sort();
    assert_eq!(contents, expected);
}

#[tokio::test]
async fn rejected_chunk_is_abandoned_without_retry() {
    let hook = MockWebhook::start_with(vec![Reply::Rejected(400)], std::time::Duration::ZERO).await;
    let config = test_config(&hook.url());
    let dispatcher = dispatcher_for(&config);

    let summary = dispatcher.dispatch_message("bad payload", 2000).await;

    assert_eq!(summary.gave_up, 1);
    assert_eq!(summary.delivered, 0);
    // One request only: non-429 rejections are final.
    assert_eq!(hook.request_count(), 1);
}

#[tokio::test]
async fn empty_message_sends_nothing() {
    let hook = MockWebhook::start().await;
    let config = test_config(&hook.url());
    let dispatcher = dispatcher_for(&config);

    let summary = dispatcher.dispatch_message("", 2000).await;

    assert_eq!(summary.total(), 0);
    assert_eq!(hook.request_count(), 0);
}
