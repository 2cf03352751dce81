//! 协调器算法集成测试
//!
//! 基于内存存储验证互斥、重试边界、所有权校验释放与 TTL 恢复，
//! 不依赖任何外部服务。时间相关的用例在暂停的运行时中推进虚拟时钟。

use std::sync::Arc;
use std::time::Duration;

use tokio_test::assert_ok;

use distlock_core::test_utils::{CountingLockStore, FailingLockStore};
use distlock_core::{
    ExponentialBackoff, LockCoordinator, LockDescriptor, LockError, LockStore, MemoryLockStore,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

fn descriptor(owner: &str, retry_count: u32) -> LockDescriptor {
    LockDescriptor::new(
        "order",
        "42",
        owner,
        Duration::from_secs(30),
        retry_count,
        Duration::from_millis(100),
    )
}

#[tokio::test]
async fn test_acquire_succeeds_first_attempt_on_empty_store() {
    init_tracing();
    let coordinator = LockCoordinator::new(CountingLockStore::new(MemoryLockStore::new()));

    let acquired = coordinator
        .acquire(&descriptor("worker-a", 2))
        .await
        .unwrap();

    assert!(acquired);
    // 首次即成功，只发起 1 次条件设置
    assert_eq!(coordinator.store().set_if_absent_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_contended_acquire_uses_exactly_retry_count_plus_one_attempts() {
    let coordinator = LockCoordinator::new(CountingLockStore::new(MemoryLockStore::new()));

    assert!(coordinator
        .acquire(&descriptor("worker-a", 0))
        .await
        .unwrap());

    let acquired = coordinator
        .acquire(&descriptor("worker-b", 2))
        .await
        .unwrap();

    assert!(!acquired);
    // 持有者 1 次 + 竞争者 2+1 次
    assert_eq!(coordinator.store().set_if_absent_calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn test_fixed_delay_sleeps_only_between_attempts() {
    let coordinator = LockCoordinator::new(MemoryLockStore::new());
    assert!(coordinator
        .acquire(&descriptor("worker-a", 0))
        .await
        .unwrap());

    let start = tokio::time::Instant::now();
    assert!(!coordinator
        .acquire(&descriptor("worker-b", 2))
        .await
        .unwrap());

    // 3 次尝试只有 2 个间隔，最后一次失败后立即返回
    assert_eq!(start.elapsed(), Duration::from_millis(200));
}

#[tokio::test(start_paused = true)]
async fn test_exponential_backoff_stretches_delays() {
    let coordinator = LockCoordinator::with_delay_strategy(
        MemoryLockStore::new(),
        ExponentialBackoff {
            multiplier: 2.0,
            max_delay: Duration::from_secs(30),
        },
    );
    assert!(coordinator
        .acquire(&descriptor("worker-a", 0))
        .await
        .unwrap());

    let start = tokio::time::Instant::now();
    assert!(!coordinator
        .acquire(&descriptor("worker-b", 2))
        .await
        .unwrap());

    // 100ms + 200ms，尝试次数契约不变
    assert_eq!(start.elapsed(), Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn test_contended_lock_round_trip() {
    init_tracing();
    let coordinator = LockCoordinator::new(MemoryLockStore::new());
    let worker_a = descriptor("worker-a", 2);
    let worker_b = descriptor("worker-b", 2);

    assert!(coordinator.acquire(&worker_a).await.unwrap());
    assert!(!coordinator.acquire(&worker_b).await.unwrap());

    tokio_test::assert_ok!(coordinator.release(&worker_a).await);

    assert!(coordinator.acquire(&worker_b).await.unwrap());
}

#[tokio::test]
async fn test_release_by_non_owner_leaves_lock_untouched() {
    let coordinator = LockCoordinator::new(MemoryLockStore::new());
    let worker_a = descriptor("worker-a", 0);
    let worker_b = descriptor("worker-b", 0);

    assert!(coordinator.acquire(&worker_a).await.unwrap());

    // 非持有者释放是无害的空操作
    tokio_test::assert_ok!(coordinator.release(&worker_b).await);
    assert_eq!(
        coordinator.store().get("order42").await.unwrap(),
        Some("worker-a".to_string())
    );
    assert!(!coordinator.acquire(&worker_b).await.unwrap());
}

#[tokio::test]
async fn test_release_absent_lock_completes_without_side_effects() {
    let coordinator = LockCoordinator::new(CountingLockStore::new(MemoryLockStore::new()));

    tokio_test::assert_ok!(coordinator.release(&descriptor("worker-a", 0)).await);

    assert_eq!(coordinator.store().get_calls(), 1);
    assert_eq!(coordinator.store().delete_if_value_calls(), 0);
    assert_eq!(coordinator.store().delete_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_ttl_expiry_allows_reacquisition() {
    let coordinator = LockCoordinator::new(MemoryLockStore::new());

    assert!(coordinator
        .acquire(&descriptor("worker-a", 0))
        .await
        .unwrap());

    // 持有者从未释放，TTL 到期后锁自动恢复可用
    tokio::time::advance(Duration::from_secs(31)).await;

    assert!(coordinator
        .acquire(&descriptor("worker-b", 0))
        .await
        .unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_stale_release_keeps_new_owner_after_expiry() {
    let coordinator = LockCoordinator::new(MemoryLockStore::new());
    let worker_a = descriptor("worker-a", 0);
    let worker_b = descriptor("worker-b", 0);

    assert!(coordinator.acquire(&worker_a).await.unwrap());
    tokio::time::advance(Duration::from_secs(31)).await;
    assert!(coordinator.acquire(&worker_b).await.unwrap());

    // worker-a 的迟到释放不得移除 worker-b 的锁
    tokio_test::assert_ok!(coordinator.release(&worker_a).await);
    assert_eq!(
        coordinator.store().get("order42").await.unwrap(),
        Some("worker-b".to_string())
    );
}

#[tokio::test]
async fn test_store_outage_aborts_acquire_without_retry() {
    let coordinator = LockCoordinator::new(CountingLockStore::new(FailingLockStore));
    let desc = descriptor("worker-a", 5);

    let err = coordinator.acquire(&desc).await.unwrap_err();
    assert!(matches!(err, LockError::Store(_)));
    // 传输故障不消耗重试预算，第一次失败立即中止
    assert_eq!(coordinator.store().set_if_absent_calls(), 1);

    let err = coordinator.release(&desc).await.unwrap_err();
    assert!(matches!(err, LockError::Store(_)));
}

#[tokio::test]
async fn test_concurrent_acquires_have_single_winner() {
    let coordinator = Arc::new(LockCoordinator::new(MemoryLockStore::new()));

    let mut handles = Vec::new();
    for i in 0..16 {
        let coordinator = Arc::clone(&coordinator);
        handles.push(tokio::spawn(async move {
            let desc = LockDescriptor::new(
                "order",
                "42",
                format!("worker-{i}"),
                Duration::from_secs(30),
                0,
                Duration::from_millis(1),
            );
            coordinator.acquire(&desc).await.unwrap()
        }));
    }

    let results = futures::future::join_all(handles).await;
    let winners = results
        .into_iter()
        .filter(|r| *r.as_ref().unwrap())
        .count();

    assert_eq!(winners, 1);
}
