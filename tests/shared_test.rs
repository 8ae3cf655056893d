//! Tests for the shared, lock-guarded queue handle.

use std::collections::HashSet;

use process_queue::{ItemId, ItemState, QueueConfig, Record, SharedQueue};
use serde_json::json;

fn shared(config: QueueConfig) -> SharedQueue<Record> {
    SharedQueue::new(config)
}

#[test]
fn clones_share_one_queue() {
    let queue = shared(QueueConfig::default());
    let other = queue.clone();

    queue.queue_item(Record::new("a").with("value", 1)).unwrap();
    assert_eq!(other.len(), 1);

    let claimed = other.next_item().unwrap();
    assert!(queue.is_processing(&claimed.id));
    assert_eq!(queue.state_of("a"), Some(ItemState::InProcess));
    assert!(queue.busy());

    queue.done_processing("a");
    assert!(!other.busy());
}

#[test]
fn with_runs_several_operations_atomically() {
    let queue = shared(QueueConfig::default().emplace(true));
    queue.queue_item(Record::new("a")).unwrap();
    queue.queue_item(Record::new("b")).unwrap();

    let (claimed, left) = queue.with(|q| {
        let claimed = q.next_item();
        (claimed, q.len())
    });
    assert_eq!(claimed.unwrap().id, ItemId::from("a"));
    assert_eq!(left, 1);
}

#[test]
fn counts_and_clear_through_the_handle() {
    let queue = shared(QueueConfig::default());
    queue.queue_item(Record::new("1").with("value", 10)).unwrap();
    queue.queue_item(Record::new("2").with("value", 20)).unwrap();
    queue.queue_item(Record::new("3").with("value", 10)).unwrap();

    assert_eq!(queue.length(Some("value"), Some(&json!(10))), 2);
    assert_eq!(queue.count_where("value", &json!(20)), 1);
    assert!(queue.remove_from_queue("2"));
    assert_eq!(queue.get_queue(true).len(), 2);
    assert_eq!(queue.process_size(), 2);

    queue.done_all();
    queue.clear();
    assert!(queue.is_empty());
    assert_eq!(queue.process_size(), 0);
}

#[tokio::test]
async fn concurrent_workers_claim_each_item_once() {
    let queue = shared(QueueConfig::default().unbounded());
    for n in 0..200 {
        queue.queue_item(Record::new(n)).unwrap();
    }

    let mut handles = Vec::new();
    for _ in 0..4 {
        let queue = queue.clone();
        handles.push(tokio::spawn(async move {
            let mut seen = Vec::new();
            loop {
                let batch = queue.process_batch(7);
                if batch.is_empty() {
                    break;
                }
                for item in batch {
                    tokio::task::yield_now().await;
                    queue.done_processing(&item.id);
                    seen.push(item.id.to_string());
                }
            }
            seen
        }));
    }

    let mut all = Vec::new();
    for handle in handles {
        all.extend(handle.await.unwrap());
    }

    let unique: HashSet<_> = all.iter().cloned().collect();
    assert_eq!(all.len(), 200);
    assert_eq!(unique.len(), 200);
    assert!(queue.is_empty());
    assert!(!queue.busy());
}

#[test]
fn poisoned_lock_still_serves_the_queue() {
    let queue = shared(QueueConfig::default());
    queue.queue_item(Record::new("a")).unwrap();

    let other = queue.clone();
    let result = std::thread::spawn(move || {
        let _: () = other.with(|_| panic!("worker crashed while holding the lock"));
    })
    .join();
    assert!(result.is_err());

    assert_eq!(queue.len(), 1);
    assert!(queue.next_item().is_some());
}
