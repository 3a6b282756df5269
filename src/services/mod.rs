pub mod org_cache;

pub use org_cache::{CacheState, OrgCache};
