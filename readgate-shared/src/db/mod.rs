/// Database layer for readgate
///
/// # Modules
///
/// - `pool`: SQLite connection pool management with health checks
/// - Models are in the `models` module at crate root level
///
/// The schema lives in `migrations/` at the workspace root and is applied
/// out-of-band (`sqlx migrate run`); the server never migrates on startup.
///
/// # Example
///
/// ```no_run
/// use readgate_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     Ok(())
/// }
/// ```

pub mod pool;
