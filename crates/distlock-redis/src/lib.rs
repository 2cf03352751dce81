//! Redis 存储后端
//!
//! 基于 Redis 的 SET NX EX / GET / DEL 与 Lua 比较删除脚本，
//! 为锁协调器提供存储能力实现。
//!
//! ## 使用示例
//!
//! ```ignore
//! let store = RedisLockStore::new(&RedisConfig::default())?;
//! let coordinator = LockCoordinator::new(store);
//! ```

mod config;
mod store;

pub use config::RedisConfig;
pub use store::RedisLockStore;
