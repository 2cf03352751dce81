//! 进程内存储实现
//!
//! 基于互斥保护的哈希表，TTL 在访问时惰性判定。可作为单进程场景的
//! 退化后端，也用于在无外部依赖的测试中验证协调器算法。

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use crate::error::Result;
use crate::store::LockStore;

struct Entry {
    value: String,
    expires_at: Instant,
}

/// 内存键值存储
///
/// 条目过期不靠后台任务清理，而是在下一次访问该 key 时剔除，
/// 对外语义与存储端主动过期一致。
#[derive(Default)]
pub struct MemoryLockStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryLockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 清除所有条目
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// 当前存活条目数
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn purge_expired(entries: &mut HashMap<String, Entry>, key: &str, now: Instant) {
        if let Some(entry) = entries.get(key) {
            if entry.expires_at <= now {
                entries.remove(key);
            }
        }
    }
}

#[async_trait]
impl LockStore for MemoryLockStore {
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        Self::purge_expired(&mut entries, key, now);

        if entries.contains_key(key) {
            return Ok(false);
        }

        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        Self::purge_expired(&mut entries, key, now);
        Ok(entries.get(key).map(|e| e.value.clone()))
    }

    async fn delete(&self, key: &str) -> Result<u64> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        Self::purge_expired(&mut entries, key, now);
        Ok(entries.remove(key).map_or(0, |_| 1))
    }

    async fn delete_if_value(&self, key: &str, value: &str) -> Result<u64> {
        // 比较与删除在同一把锁内完成，没有竞态窗口
        let now = Instant::now();
        let mut entries = self.entries.lock();
        Self::purge_expired(&mut entries, key, now);

        match entries.get(key) {
            Some(entry) if entry.value == value => Ok(entries.remove(key).map_or(0, |_| 1)),
            _ => Ok(0),
        }
    }
}
