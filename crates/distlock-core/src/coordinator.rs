//! 锁协调器
//!
//! 将存储端的原子条件设置转化为安全的分布式互斥锁：
//! 有界重试的获取，以及带所有权校验的释放。
//!
//! 协调器本身无状态（存储句柄与间隔策略之外），单个实例可被任意
//! 多的调用方并发共享；不同请求者之间的先后顺序完全由存储端的
//! 条件设置裁决。

use tracing::{debug, info, instrument, warn};

use crate::delay::{DelayStrategy, FixedDelay};
use crate::descriptor::LockDescriptor;
use crate::error::Result;
use crate::store::LockStore;

/// 锁协调器
///
/// 持有存储句柄与重试间隔策略。获取与释放都是调用方视角的阻塞
/// 操作，唯一的挂起点是获取过程中两次尝试之间的等待；没有后台
/// 任务，也不续期——TTL 到期即失效。
pub struct LockCoordinator<S> {
    store: S,
    delay: Box<dyn DelayStrategy>,
}

impl<S: LockStore> LockCoordinator<S> {
    /// 使用固定间隔重试策略创建协调器
    pub fn new(store: S) -> Self {
        Self {
            store,
            delay: Box::new(FixedDelay),
        }
    }

    /// 使用自定义重试间隔策略创建协调器
    pub fn with_delay_strategy(store: S, delay: impl DelayStrategy + 'static) -> Self {
        Self {
            store,
            delay: Box::new(delay),
        }
    }

    /// 底层存储句柄
    pub fn store(&self) -> &S {
        &self.store
    }

    /// 获取锁
    ///
    /// 最多发起 retry_count + 1 次原子条件设置。返回 `Ok(true)` 表示
    /// 获取成功，存储端已写入 owner 并从此刻起按 max_lock_time 计时
    /// 过期；`Ok(false)` 表示重试耗尽仍被占用，这是竞争下的正常结果，
    /// 不是错误。存储通信失败立即中止整个操作并上抛——重试只针对
    /// "key 已存在"的竞争场景，从不用于存储故障。
    #[instrument(
        skip(self, descriptor),
        fields(lock_type = %descriptor.lock_type(), lock_key = %descriptor.lock_key())
    )]
    pub async fn acquire(&self, descriptor: &LockDescriptor) -> Result<bool> {
        let key = descriptor.store_key();
        let attempts = descriptor.retry_count().saturating_add(1);

        for attempt in 1..=attempts {
            let acquired = self
                .store
                .set_if_absent(&key, descriptor.owner(), descriptor.max_lock_time())
                .await?;

            if acquired {
                info!(attempt, "lock acquired");
                return Ok(true);
            }

            debug!(attempt, "lock busy, attempt failed");

            // 最后一次尝试失败后不再等待
            if attempt < attempts {
                let delay = self
                    .delay
                    .delay_for_attempt(attempt, descriptor.retry_delay());
                tokio::time::sleep(delay).await;
            }
        }

        info!(attempts, "lock not acquired, attempts exhausted");
        Ok(false)
    }

    /// 释放锁
    ///
    /// 读取存储键当前值并校验所有权：只有值等于本描述符 owner 时才
    /// 删除。锁不存在（已过期或从未持有）与锁被其他 owner 持有都不是
    /// 错误，记录日志后正常返回；仅存储通信失败会上抛。
    #[instrument(
        skip(self, descriptor),
        fields(lock_type = %descriptor.lock_type(), lock_key = %descriptor.lock_key())
    )]
    pub async fn release(&self, descriptor: &LockDescriptor) -> Result<()> {
        let key = descriptor.store_key();

        let Some(current) = self.store.get(&key).await? else {
            warn!("lock not found on release, already expired or never held");
            return Ok(());
        };

        if current != descriptor.owner() {
            // 获取操作对调用方报错但在存储端实际成功、key 过期后又被
            // 他人重新获取的场景会走到这里；删除会破坏新 owner 的互斥
            warn!(
                owner = %descriptor.owner(),
                current_owner = %current,
                "lock owned by another owner, not releasing"
            );
            return Ok(());
        }

        let removed = self.store.delete_if_value(&key, descriptor.owner()).await?;

        if removed == 0 {
            // 校验与删除之间锁过期并消失，净效果相同
            warn!(owner = %descriptor.owner(), "lock vanished between check and delete");
        } else {
            info!(owner = %descriptor.owner(), "lock released");
        }

        Ok(())
    }
}
