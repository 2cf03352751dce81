//! 重试间隔策略
//!
//! 默认为固定间隔：竞争解决策略简单可预测，便于推理。
//! 需要自适应行为的调用方可注入指数退避策略，
//! 尝试次数契约（retry_count + 1 次）不受策略影响。

use std::time::Duration;

/// 重试间隔策略
pub trait DelayStrategy: Send + Sync {
    /// 第 attempt 次尝试失败后的等待时间（attempt 从 1 开始计数）
    ///
    /// base 为描述符中配置的 retry_delay。
    fn delay_for_attempt(&self, attempt: u32, base: Duration) -> Duration;
}

/// 固定间隔（默认策略）
///
/// 每次失败后等待相同的 base 时长。
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedDelay;

impl DelayStrategy for FixedDelay {
    fn delay_for_attempt(&self, _attempt: u32, base: Duration) -> Duration {
        base
    }
}

/// 指数退避
///
/// 公式: base * multiplier^(attempt-1)，结果不超过 max_delay。
/// 使用 f64 运算后再转回 Duration，接受微秒级精度损失。
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    /// 每次重试的退避倍数
    pub multiplier: f64,
    /// 退避时间上限，防止等待过长
    pub max_delay: Duration,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            multiplier: 2.0,
            max_delay: Duration::from_secs(30),
        }
    }
}

impl DelayStrategy for ExponentialBackoff {
    fn delay_for_attempt(&self, attempt: u32, base: Duration) -> Duration {
        let base_ms = base.as_millis() as f64;
        let exponent = attempt.saturating_sub(1) as i32;
        let delay_ms = base_ms * self.multiplier.powi(exponent);
        let capped_ms = delay_ms.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped_ms as u64)
    }
}
