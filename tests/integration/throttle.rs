//! Rate limiting and 429 retry behaviour against a live endpoint.

use std::time::Duration;

use crate::*;

#[tokio::test]
async fn throttled_send_retries_until_accepted() {
    let script = vec![
        Reply::Throttled { retry_after_secs: 0 },
        Reply::Throttled { retry_after_secs: 0 },
    ];
    let hook = MockWebhook::start_with(script, Duration::ZERO).await;
    let config = test_config(&hook.url());
    let dispatcher = dispatcher_for(&config);

    let summary = dispatcher.dispatch_message("eventually lands", 2000).await;

    assert_eq!(summary.delivered, 1);
    assert!(summary.is_clean());
    assert_eq!(hook.request_count(), 3);
}

#[tokio::test]
async fn throttling_gives_up_after_five_attempts() {
    // More throttle replies than the retry budget allows.
    let script = vec![Reply::Throttled { retry_after_secs: 0 }; 8];
    let hook = MockWebhook::start_with(script, Duration::ZERO).await;
    let config = test_config(&hook.url());
    let dispatcher = dispatcher_for(&config);

    let summary = dispatcher.dispatch_message("never lands", 2000).await;

    assert_eq!(summary.gave_up, 1);
    assert_eq!(summary.delivered, 0);
    assert_eq!(hook.request_count(), 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn request_starts_respect_the_shared_rate_limit() {
    let hook = MockWebhook::start().await;
    let mut config = test_config(&hook.url());
    config.requests_per_second = 20.0;
    let dispatcher = dispatcher_for(&config);

    let chunks = vec!["one".to_string(), "two".to_string(), "three".to_string()];
    let summary = dispatcher.dispatch_chunks(chunks).await;
    assert!(summary.is_clean());

    let mut at: Vec<_> = hook.requests().into_iter().map(|r| r.received_at).collect();
    at.sort();
    assert_eq!(at.len(), 3);
    for pair in at.windows(2) {
        let gap = pair[1].duration_since(pair[0]);
        // Nominal spacing is 50ms; leave slack for timer coarseness.
        assert!(gap >= Duration::from_millis(35), "gap was {gap:?}");
    }
}
