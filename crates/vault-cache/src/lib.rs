//! # Vault Cache
//!
//! 分頁快取：有效時間判斷與變更後的失效規則

pub mod clock;
pub mod invalidation;
pub mod tab_cache;

// Re-export 主要類型
pub use clock::{Clock, ManualClock, SystemClock};
pub use invalidation::Mutation;
pub use tab_cache::{CacheEntry, CacheKey, TabCache, DEFAULT_TTL_MS};
