mod coordinator;
mod l1;
mod l2;

pub use coordinator::{CacheCoordinator, CacheHitTier};
pub use l1::L1Cache;
pub use l2::L2SqliteCache;
