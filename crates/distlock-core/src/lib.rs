//! 分布式互斥锁核心库
//!
//! 借助共享键值存储的原子"不存在才设置"原语，在多个独立进程间对命名资源
//! 达成互斥。正确性完全委托给存储端的条件设置，进程内不做任何加锁。
//!
//! ## 使用示例
//!
//! ```ignore
//! let coordinator = LockCoordinator::new(store);
//! let descriptor = LockDescriptor::new(
//!     "order", "42", generate_owner("worker-a"),
//!     Duration::from_secs(30), 2, Duration::from_millis(100),
//! );
//!
//! if coordinator.acquire(&descriptor).await? {
//!     do_critical_work().await?;
//!     coordinator.release(&descriptor).await?;
//! }
//! ```

pub mod config;
pub mod coordinator;
pub mod delay;
pub mod descriptor;
pub mod error;
pub mod memory;
pub mod store;
pub mod test_utils;

pub use config::LockConfig;
pub use coordinator::LockCoordinator;
pub use delay::{DelayStrategy, ExponentialBackoff, FixedDelay};
pub use descriptor::{LockDescriptor, generate_owner};
pub use error::{LockError, Result};
pub use memory::MemoryLockStore;
pub use store::LockStore;
