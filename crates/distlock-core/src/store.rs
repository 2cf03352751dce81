//! 键值存储能力抽象
//!
//! 协调器依赖的最小存储接口：原子的"不存在才设置"、读取与删除。
//! 互斥完全由存储端的条件设置保证，协调器不做任何进程内加锁，
//! 因此算法可以脱离真实存储、基于内存实现独立验证。

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// 键值存储能力
///
/// 所有方法的错误都表示传输或协议层故障，统一以
/// [`LockError::Store`](crate::error::LockError::Store) 上抛。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LockStore: Send + Sync {
    /// 仅当 key 不存在时原子设置，并附带 TTL
    ///
    /// TTL 为秒级精度，由存储端从设置成功的时刻起计时强制过期。
    /// 返回 true 表示设置成功（key 原本不存在，现在持有 value）。
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool>;

    /// 读取 key 当前值，不存在返回 None
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// 删除 key，返回删除数量（0 或 1）
    async fn delete(&self, key: &str) -> Result<u64>;

    /// 仅当 key 当前值等于 value 时删除，返回删除数量
    ///
    /// 默认实现由 get + delete 组合而成，读取与删除之间存在竞态窗口：
    /// key 可能在中间过期并被其他 owner 重新获取，随后的删除会误删
    /// 新 owner 的锁。支持服务端原子比较删除的后端（如 Redis Lua
    /// 脚本）应覆盖此方法以消除该窗口。
    async fn delete_if_value(&self, key: &str, value: &str) -> Result<u64> {
        match self.get(key).await? {
            Some(current) if current == value => self.delete(key).await,
            _ => Ok(0),
        }
    }
}
