//! Redis 存储实现
//!
//! 每次操作从客户端取出一条多路复用连接，无论成功、竞争失败还是
//! 出错都随作用域结束自动归还，不会在错误路径上泄漏连接。

use std::time::Duration;

use async_trait::async_trait;
use distlock_core::error::{LockError, Result};
use distlock_core::store::LockStore;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};
use tracing::{info, instrument};

use crate::config::RedisConfig;

/// Lua 脚本：只有当 key 的当前值与给定 owner 匹配时才删除
///
/// 比较与删除在 Redis 服务端原子完成，消除了先读后删的竞态窗口。
const COMPARE_AND_DELETE: &str = r#"
    if redis.call("get", KEYS[1]) == ARGV[1] then
        return redis.call("del", KEYS[1])
    else
        return 0
    end
"#;

/// Redis 键值存储
#[derive(Clone, Debug)]
pub struct RedisLockStore {
    client: Client,
}

impl RedisLockStore {
    /// 创建 Redis 客户端
    pub fn new(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str()).map_err(store_err)?;
        info!("Redis lock store client created");
        Ok(Self { client })
    }

    /// 获取连接
    async fn get_conn(&self) -> Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(store_err)
    }

    /// 健康检查
    pub async fn health_check(&self) -> Result<()> {
        let mut conn = self.get_conn().await?;
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map(|_| ())
            .map_err(store_err)
    }
}

fn store_err(e: redis::RedisError) -> LockError {
    LockError::Store(e.to_string())
}

#[async_trait]
impl LockStore for RedisLockStore {
    #[instrument(skip(self, value))]
    async fn set_if_absent(&self, key: &str, value: &str, ttl: Duration) -> Result<bool> {
        let mut conn = self.get_conn().await?;

        // SET key value NX EX seconds
        // NX: 只在 key 不存在时设置
        // EX: 过期时间（秒），由 Redis 端从设置时刻起计时
        let result: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs())
            .query_async(&mut conn)
            .await
            .map_err(store_err)?;

        // SET NX 成功时返回 "OK"，失败时返回 nil
        Ok(result.is_some())
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.get_conn().await?;
        let value: Option<String> = conn.get(key).await.map_err(store_err)?;
        Ok(value)
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<u64> {
        let mut conn = self.get_conn().await?;
        let count: u64 = conn.del(key).await.map_err(store_err)?;
        Ok(count)
    }

    #[instrument(skip(self, value))]
    async fn delete_if_value(&self, key: &str, value: &str) -> Result<u64> {
        let mut conn = self.get_conn().await?;
        let removed: u64 = redis::Script::new(COMPARE_AND_DELETE)
            .key(key)
            .arg(value)
            .invoke_async(&mut conn)
            .await
            .map_err(store_err)?;
        Ok(removed)
    }
}
