use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use crate::{
    error::{AppError, AppResult},
    models::{Favorite, MovieId, User, UserRecord},
    services::accounts::AccountStore,
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the schema migrations under `migrations/`
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Account store backed by the `users` and `favorites` tables
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AccountStore for PgAccountStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> AppResult<User> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            ON CONFLICT (username) DO NOTHING
            RETURNING id, username, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or_else(|| {
            AppError::Conflict(format!("Username '{}' is already taken", username))
        })?;

        Ok(User {
            user_id: row.try_get("id")?,
            username: row.try_get("username")?,
            created_at: row.try_get("created_at")?,
        })
    }

    async fn find_user(&self, username: &str) -> AppResult<Option<UserRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| -> AppResult<UserRecord> {
            Ok(UserRecord {
                user: User {
                    user_id: row.try_get("id")?,
                    username: row.try_get("username")?,
                    created_at: row.try_get("created_at")?,
                },
                password_hash: row.try_get("password_hash")?,
            })
        })
        .transpose()
    }

    async fn add_favorite(&self, user_id: i64, movie_id: &MovieId) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO favorites (user_id, movie_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, movie_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(&movie_id.0)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove_favorite(&self, user_id: i64, movie_id: &MovieId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND movie_id = $2")
            .bind(user_id)
            .bind(&movie_id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_favorites(&self, user_id: i64) -> AppResult<Vec<Favorite>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, movie_id, added_at
            FROM favorites
            WHERE user_id = $1
            ORDER BY added_at, movie_id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> AppResult<Favorite> {
                Ok(Favorite {
                    user_id: row.try_get("user_id")?,
                    movie_id: MovieId(row.try_get("movie_id")?),
                    added_at: row.try_get("added_at")?,
                })
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
