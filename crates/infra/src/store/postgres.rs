//! Postgres-backed store implementations.
//!
//! Uniqueness and referential cleanup live at the database level: the email
//! column carries a unique constraint and comments cascade on ad deletion.

use std::sync::Arc;

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::instrument;

use adboard_core::{AdId, CommentId, UserId};
use adboard_discussion::Comment;
use adboard_identity::{Role, User};
use adboard_listings::{Ad, AdFilter};

use super::r#trait::{
    AdStore, CommentStore, PAGE_SIZE, Page, PageRequest, StoreError, StoreResult, UserStore,
};

/// Create the tables this crate reads and writes, if absent.
pub async fn ensure_schema(pool: &PgPool) -> StoreResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id            UUID PRIMARY KEY,
            email         TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            first_name    TEXT NOT NULL,
            last_name     TEXT NOT NULL,
            phone         TEXT NOT NULL,
            role          TEXT NOT NULL,
            image_url     TEXT NULL,
            is_staff      BOOLEAN NOT NULL,
            is_superuser  BOOLEAN NOT NULL,
            is_active     BOOLEAN NOT NULL,
            created_at    TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| map_sqlx_error("create_users_table", e))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS ads (
            id          UUID PRIMARY KEY,
            title       TEXT NOT NULL,
            price       BIGINT NOT NULL CHECK (price > 0),
            description TEXT NOT NULL,
            author_id   UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            image_url   TEXT NULL,
            created_at  TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| map_sqlx_error("create_ads_table", e))?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id         UUID PRIMARY KEY,
            ad_id      UUID NOT NULL REFERENCES ads (id) ON DELETE CASCADE,
            author_id  UUID NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            text       TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| map_sqlx_error("create_comments_table", e))?;

    Ok(())
}

/// Postgres-backed account store.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: Arc<PgPool>,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn insert(&self, user: User) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, password_hash, first_name, last_name,
                phone, role, image_url, is_staff, is_superuser, is_active, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(&user.image_url)
        .bind(user.staff)
        .bind(user.superuser)
        .bind(user.active)
        .bind(user.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Duplicate("a user with this email already exists".to_string())
            } else {
                map_sqlx_error("insert_user", e)
            }
        })?;
        Ok(())
    }

    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn update(&self, user: User) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                email = $2,
                password_hash = $3,
                first_name = $4,
                last_name = $5,
                phone = $6,
                role = $7,
                image_url = $8,
                is_staff = $9,
                is_superuser = $10,
                is_active = $11
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(&user.image_url)
        .bind(user.staff)
        .bind(user.superuser)
        .bind(user.active)
        .execute(&*self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Duplicate("a user with this email already exists".to_string())
            } else {
                map_sqlx_error("update_user", e)
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Backend(format!(
                "update of missing user {}",
                user.id
            )));
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: UserId) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, first_name, last_name,
                   phone, role, image_url, is_staff, is_superuser, is_active, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_user", e))?;

        row.map(|r| decode(user_from_row(&r), "user")).transpose()
    }

    #[instrument(skip_all, err)]
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, email, password_hash, first_name, last_name,
                   phone, role, image_url, is_staff, is_superuser, is_active, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.trim().to_lowercase())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user_by_email", e))?;

        row.map(|r| decode(user_from_row(&r), "user")).transpose()
    }
}

/// Postgres-backed ad store.
#[derive(Debug, Clone)]
pub struct PostgresAdStore {
    pool: Arc<PgPool>,
}

impl PostgresAdStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl AdStore for PostgresAdStore {
    #[instrument(skip(self, ad), fields(ad_id = %ad.id), err)]
    async fn insert(&self, ad: Ad) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO ads (id, title, price, description, author_id, image_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(ad.id.as_uuid())
        .bind(&ad.title)
        .bind(ad.price as i64)
        .bind(&ad.description)
        .bind(ad.author.as_uuid())
        .bind(&ad.image_url)
        .bind(ad.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_ad", e))?;
        Ok(())
    }

    #[instrument(skip(self, ad), fields(ad_id = %ad.id), err)]
    async fn update(&self, ad: Ad) -> StoreResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE ads SET
                title = $2,
                price = $3,
                description = $4,
                image_url = $5
            WHERE id = $1
            "#,
        )
        .bind(ad.id.as_uuid())
        .bind(&ad.title)
        .bind(ad.price as i64)
        .bind(&ad.description)
        .bind(&ad.image_url)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_ad", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Backend(format!(
                "update of missing ad {}",
                ad.id
            )));
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn get(&self, id: AdId) -> StoreResult<Option<Ad>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, price, description, author_id, image_url, created_at
            FROM ads
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_ad", e))?;

        row.map(|r| decode(ad_from_row(&r), "ad")).transpose()
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: AdId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM ads WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_ad", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, filter), err)]
    async fn list(&self, filter: &AdFilter, page: PageRequest) -> StoreResult<Page<Ad>> {
        let search = filter
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(escape_like);
        let price_min = filter.price_min.map(|p| p as i64);
        let price_max = filter.price_max.map(|p| p as i64);

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM ads
            WHERE ($1::text IS NULL OR title ILIKE '%' || $1 || '%'
                                    OR description ILIKE '%' || $1 || '%')
              AND ($2::bigint IS NULL OR price >= $2)
              AND ($3::bigint IS NULL OR price <= $3)
            "#,
        )
        .bind(&search)
        .bind(price_min)
        .bind(price_max)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("count_ads", e))?;

        let rows = sqlx::query(
            r#"
            SELECT id, title, price, description, author_id, image_url, created_at
            FROM ads
            WHERE ($1::text IS NULL OR title ILIKE '%' || $1 || '%'
                                    OR description ILIKE '%' || $1 || '%')
              AND ($2::bigint IS NULL OR price >= $2)
              AND ($3::bigint IS NULL OR price <= $3)
            ORDER BY created_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(&search)
        .bind(price_min)
        .bind(price_max)
        .bind(i64::from(PAGE_SIZE))
        .bind(page.offset() as i64)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_ads", e))?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(decode(ad_from_row(&row), "ad")?);
        }

        Ok(Page {
            items,
            total: total as u64,
        })
    }
}

/// Postgres-backed comment store.
#[derive(Debug, Clone)]
pub struct PostgresCommentStore {
    pool: Arc<PgPool>,
}

impl PostgresCommentStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl CommentStore for PostgresCommentStore {
    #[instrument(skip(self, comment), fields(comment_id = %comment.id), err)]
    async fn insert(&self, comment: Comment) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, ad_id, author_id, text, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(comment.id.as_uuid())
        .bind(comment.ad.as_uuid())
        .bind(comment.author.as_uuid())
        .bind(&comment.text)
        .bind(comment.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_comment", e))?;
        Ok(())
    }

    #[instrument(skip(self, comment), fields(comment_id = %comment.id), err)]
    async fn update(&self, comment: Comment) -> StoreResult<()> {
        let result = sqlx::query("UPDATE comments SET text = $3 WHERE ad_id = $1 AND id = $2")
            .bind(comment.ad.as_uuid())
            .bind(comment.id.as_uuid())
            .bind(&comment.text)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("update_comment", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Backend(format!(
                "update of missing comment {}",
                comment.id
            )));
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn get(&self, ad: AdId, id: CommentId) -> StoreResult<Option<Comment>> {
        let row = sqlx::query(
            r#"
            SELECT id, ad_id, author_id, text, created_at
            FROM comments
            WHERE ad_id = $1 AND id = $2
            "#,
        )
        .bind(ad.as_uuid())
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_comment", e))?;

        row.map(|r| decode(comment_from_row(&r), "comment"))
            .transpose()
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, ad: AdId, id: CommentId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE ad_id = $1 AND id = $2")
            .bind(ad.as_uuid())
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_comment", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn list_for_ad(&self, ad: AdId) -> StoreResult<Vec<Comment>> {
        let rows = sqlx::query(
            r#"
            SELECT id, ad_id, author_id, text, created_at
            FROM comments
            WHERE ad_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(ad.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_comments", e))?;

        let mut comments = Vec::with_capacity(rows.len());
        for row in rows {
            comments.push(decode(comment_from_row(&row), "comment")?);
        }
        Ok(comments)
    }

    #[instrument(skip(self), err)]
    async fn delete_for_ad(&self, ad: AdId) -> StoreResult<()> {
        sqlx::query("DELETE FROM comments WHERE ad_id = $1")
            .bind(ad.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_comments_for_ad", e))?;
        Ok(())
    }
}

// Row mapping

fn user_from_row(row: &PgRow) -> Result<User, sqlx::Error> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: UserId::from_uuid(row.try_get("id")?),
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        phone: row.try_get("phone")?,
        role: role.parse::<Role>().map_err(|e| sqlx::Error::ColumnDecode {
            index: "role".to_string(),
            source: Box::new(e),
        })?,
        image_url: row.try_get("image_url")?,
        staff: row.try_get("is_staff")?,
        superuser: row.try_get("is_superuser")?,
        active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

fn ad_from_row(row: &PgRow) -> Result<Ad, sqlx::Error> {
    let price: i64 = row.try_get("price")?;
    Ok(Ad {
        id: AdId::from_uuid(row.try_get("id")?),
        title: row.try_get("title")?,
        price: price as u64,
        description: row.try_get("description")?,
        author: UserId::from_uuid(row.try_get("author_id")?),
        image_url: row.try_get("image_url")?,
        created_at: row.try_get("created_at")?,
    })
}

fn comment_from_row(row: &PgRow) -> Result<Comment, sqlx::Error> {
    Ok(Comment {
        id: CommentId::from_uuid(row.try_get("id")?),
        ad: AdId::from_uuid(row.try_get("ad_id")?),
        author: UserId::from_uuid(row.try_get("author_id")?),
        text: row.try_get("text")?,
        created_at: row.try_get("created_at")?,
    })
}

fn decode<T>(result: Result<T, sqlx::Error>, entity: &str) -> StoreResult<T> {
    result.map_err(|e| StoreError::Backend(format!("failed to decode {entity} row: {e}")))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    StoreError::Backend(format!("{operation}: {err}"))
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

/// Escape `%`, `_`, and `\` so user search text matches literally inside
/// ILIKE patterns.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50% off"), "50\\% off");
        assert_eq!(escape_like("snake_case"), "snake\\_case");
        assert_eq!(escape_like(r"back\slash"), r"back\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }
}
