//! Background queue: execution, backpressure, worker resilience, shutdown.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use keywarden::error::KeyCheckError;
use keywarden::queue::{BackgroundTaskQueue, WorkItem};

fn counting_item(counter: Arc<AtomicUsize>) -> WorkItem {
    Box::new(move |_cancel| {
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    })
}

async fn wait_for(counter: &AtomicUsize, expected: usize) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while counter.load(Ordering::SeqCst) < expected {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("counter never reached expected value");
}

#[tokio::test]
async fn items_are_executed_by_the_pool() {
    let queue = BackgroundTaskQueue::new(16, 2);
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..5 {
        queue
            .enqueue(counting_item(counter.clone()))
            .await
            .expect("enqueue");
    }

    wait_for(&counter, 5).await;
    queue.shutdown().await;
    assert_eq!(counter.load(Ordering::SeqCst), 5);
}

#[tokio::test]
async fn enqueue_blocks_at_capacity() {
    let queue = BackgroundTaskQueue::new(1, 1);
    let gate = Arc::new(tokio::sync::Notify::new());
    let started = Arc::new(AtomicUsize::new(0));

    // First item parks the only worker until released.
    let worker_gate = gate.clone();
    let worker_started = started.clone();
    let blocking: WorkItem = Box::new(move |_cancel| {
        Box::pin(async move {
            worker_started.fetch_add(1, Ordering::SeqCst);
            worker_gate.notified().await;
            Ok(())
        })
    });
    queue.enqueue(blocking).await.expect("enqueue blocker");
    wait_for(&started, 1).await;

    // Second item fills the single channel slot.
    let counter = Arc::new(AtomicUsize::new(0));
    queue
        .enqueue(counting_item(counter.clone()))
        .await
        .expect("enqueue filler");

    // Third enqueue must block: that is the backpressure contract.
    let overflow = tokio::time::timeout(
        Duration::from_millis(100),
        queue.enqueue(counting_item(counter.clone())),
    )
    .await;
    assert!(overflow.is_err(), "enqueue should block while full");

    // Release the worker; the queue drains and accepts new work again.
    gate.notify_one();
    wait_for(&counter, 1).await;
    queue.shutdown().await;
}

#[tokio::test]
async fn failing_items_never_kill_a_worker() {
    let queue = BackgroundTaskQueue::new(8, 1);
    let counter = Arc::new(AtomicUsize::new(0));

    let failing: WorkItem = Box::new(|_cancel| {
        Box::pin(async { Err(KeyCheckError::InternalError("item failed".into())) })
    });
    queue.enqueue(failing).await.expect("enqueue failing");
    queue
        .enqueue(counting_item(counter.clone()))
        .await
        .expect("enqueue counting");

    // The lone worker survived the failure and ran the next item.
    wait_for(&counter, 1).await;
    queue.shutdown().await;
}

#[tokio::test]
async fn shutdown_waits_for_workers() {
    let queue = BackgroundTaskQueue::new(8, 3);
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        queue
            .enqueue(counting_item(counter.clone()))
            .await
            .expect("enqueue");
    }
    wait_for(&counter, 3).await;

    // Returns only after every worker has observed the signal and exited.
    tokio::time::timeout(Duration::from_secs(5), queue.shutdown())
        .await
        .expect("shutdown should complete promptly");
}
