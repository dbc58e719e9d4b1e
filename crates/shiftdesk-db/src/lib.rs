//! # Shiftdesk DB
//!
//! Tenant data store for Shiftdesk.
//!
//! [`TenantStore`] is the only way the service reads or writes profiles,
//! audit entries, shift slots, availability and shifts. [`PgTenantStore`]
//! backs it with Postgres; [`MemoryTenantStore`] keeps everything in process.
//!
//! # Example
//!
//! ```ignore
//! use shiftdesk_db::{PgTenantStore, init_db_pool};
//!
//! let pool = init_db_pool(&database_url).await?;
//! let store = PgTenantStore::new(pool);
//! ```

pub mod memory;
pub mod pg;
pub mod store;

pub use memory::MemoryTenantStore;
pub use pg::PgTenantStore;
pub use store::TenantStore;

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Connects to Postgres and applies pending migrations.
pub async fn init_db_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    sqlx::migrate!("../../migrations").run(&pool).await?;

    Ok(pool)
}
