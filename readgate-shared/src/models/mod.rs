/// Database models for readgate
///
/// Each model exposes its queries as associated functions taking a
/// `&SqlitePool`, which is the repository interface the API handlers use.
///
/// # Models
///
/// - `user`: Accounts that can claim a session identity
/// - `article`: Read-only content served by the API
///
/// # Example
///
/// ```no_run
/// use readgate_shared::models::article::Article;
/// use readgate_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// for article in Article::find_all(&pool).await? {
///     println!("{}: {}", article.id, article.title);
/// }
/// # Ok(())
/// # }
/// ```

pub mod article;
pub mod user;
