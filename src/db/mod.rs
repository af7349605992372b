pub mod postgres;
pub mod redis;

pub use postgres::{create_pool, run_migrations, PgAccountStore};
pub use self::redis::create_redis_client;
pub use self::redis::Cache;
pub use self::redis::CacheKey;
