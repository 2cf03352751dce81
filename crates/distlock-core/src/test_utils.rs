//! 测试工具模块
//!
//! 提供无外部依赖测试所需的存储装饰器：按操作计数与故障注入，
//! 用于验证尝试次数边界与传输故障的传播行为。

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{LockError, Result};
use crate::store::LockStore;

// ==================== 计数装饰器 ====================

/// 按操作计数的存储装饰器
///
/// 包裹任意存储实现，记录每类操作被调用的次数后原样转发。
pub struct CountingLockStore<S> {
    inner: S,
    set_if_absent_calls: AtomicU64,
    get_calls: AtomicU64,
    delete_calls: AtomicU64,
    delete_if_value_calls: AtomicU64,
}

impl<S> CountingLockStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            set_if_absent_calls: AtomicU64::new(0),
            get_calls: AtomicU64::new(0),
            delete_calls: AtomicU64::new(0),
            delete_if_value_calls: AtomicU64::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn set_if_absent_calls(&self) -> u64 {
        self.set_if_absent_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> u64 {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> u64 {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn delete_if_value_calls(&self) -> u64 {
        self.delete_if_value_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: LockStore> LockStore for CountingLockStore<S> {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        self.set_if_absent_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.set_if_absent(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<u64> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(key).await
    }

    // 转发到内层实现而不是默认组合，保持内层的原子性语义
    async fn delete_if_value(&self, key: &str, value: &str) -> Result<u64> {
        self.delete_if_value_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_if_value(key, value).await
    }
}

// ==================== 故障注入 ====================

/// 所有操作都失败的存储实现，模拟存储不可达
#[derive(Debug, Default)]
pub struct FailingLockStore;

impl FailingLockStore {
    fn outage() -> LockError {
        LockError::Store("模拟存储不可达".to_string())
    }
}

#[async_trait]
impl LockStore for FailingLockStore {
    async fn set_if_absent(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<bool> {
        Err(Self::outage())
    }

    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(Self::outage())
    }

    async fn delete(&self, _key: &str) -> Result<u64> {
        Err(Self::outage())
    }

    async fn delete_if_value(&self, _key: &str, _value: &str) -> Result<u64> {
        Err(Self::outage())
    }
}
