//! 锁描述符
//!
//! 描述一次锁请求的不可变值对象：锁定哪个资源、请求者是谁、
//! 最长持有时间与重试策略。纯数据，不包含任何协议行为。

use std::time::Duration;

use uuid::Uuid;

use crate::error::{LockError, Result};

/// 锁描述符
///
/// 每次加锁请求构造一个，协调器不会修改它。释放锁必须使用与加锁时
/// 相同的 owner，否则释放会被拒绝。owner 是普通字符串，不具备
/// 防伪造能力——知道他人 owner 的进程可以冒充它，调用方自行保证
/// owner 不外泄。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockDescriptor {
    /// 锁类别，隔离不同子系统对同名资源的锁
    lock_type: String,
    /// 类别内的具体资源标识
    lock_key: String,
    /// 请求者身份，用于声明并在释放时证明所有权
    owner: String,
    /// 存储端自动过期时间，持有者崩溃后的兜底恢复手段
    max_lock_time: Duration,
    /// 首次尝试之外的额外重试次数
    retry_count: u32,
    /// 两次尝试之间的等待时间
    retry_delay: Duration,
}

impl LockDescriptor {
    /// 创建锁描述符
    pub fn new(
        lock_type: impl Into<String>,
        lock_key: impl Into<String>,
        owner: impl Into<String>,
        max_lock_time: Duration,
        retry_count: u32,
        retry_delay: Duration,
    ) -> Self {
        Self {
            lock_type: lock_type.into(),
            lock_key: lock_key.into(),
            owner: owner.into(),
            max_lock_time,
            retry_count,
            retry_delay,
        }
    }

    /// 校验描述符字段
    ///
    /// 协调器不做重复校验，字段合法性由调用方负责，此方法仅为
    /// 调用方提供便利。过期时间要求至少 1 秒，存储端 TTL 为秒级精度。
    pub fn validate(&self) -> Result<()> {
        if self.lock_key.is_empty() {
            return Err(LockError::InvalidDescriptor(
                "lock_key 不能为空".to_string(),
            ));
        }
        if self.owner.is_empty() {
            return Err(LockError::InvalidDescriptor("owner 不能为空".to_string()));
        }
        if self.max_lock_time.as_secs() == 0 {
            return Err(LockError::InvalidDescriptor(
                "max_lock_time 必须至少为 1 秒".to_string(),
            ));
        }
        Ok(())
    }

    /// 存储键：lock_type 与 lock_key 的确定性拼接
    ///
    /// 这是唯一持久化到存储端的状态，映射 存储键 -> owner 并附带 TTL。
    pub fn store_key(&self) -> String {
        format!("{}{}", self.lock_type, self.lock_key)
    }

    pub fn lock_type(&self) -> &str {
        &self.lock_type
    }

    pub fn lock_key(&self) -> &str {
        &self.lock_key
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn max_lock_time(&self) -> Duration {
        self.max_lock_time
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }
}

/// 生成不易冲突的 owner 令牌
///
/// 格式为 `instance_id:uuid`，实例标识加随机 uuid，保证同一实例的
/// 多次加锁请求彼此独立。
pub fn generate_owner(instance_id: &str) -> String {
    format!("{}:{}", instance_id, Uuid::new_v4())
}
