//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{ClickOutcome, Link, LinkKey, NewLink};
use crate::domain::errors::StoreError;
use crate::domain::repositories::LinkRepository;

const LINK_COLUMNS: &str = "id, short_code, domain, destination_url, owner_id, password_hash, \
     expires_at, max_clicks, click_count, is_one_time, active, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    short_code: String,
    domain: Option<String>,
    destination_url: String,
    owner_id: Option<String>,
    password_hash: Option<String>,
    expires_at: Option<DateTime<Utc>>,
    max_clicks: Option<i64>,
    click_count: i64,
    is_one_time: bool,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Link {
            id: row.id,
            short_code: row.short_code,
            domain: row.domain,
            destination_url: row.destination_url,
            owner_id: row.owner_id,
            password_hash: row.password_hash,
            expires_at: row.expires_at,
            max_clicks: row.max_clicks,
            click_count: row.click_count,
            is_one_time: row.is_one_time,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ClickStateRow {
    active: bool,
    expires_at: Option<DateTime<Utc>>,
}

/// PostgreSQL repository for link storage and click accounting.
///
/// Keys match on `COALESCE(domain, '')` so lookups use the partial unique
/// index `links_active_key_uidx`.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Explains why a conditional increment matched no row.
    async fn classify_denied_click(
        &self,
        key: &LinkKey,
        now: DateTime<Utc>,
    ) -> Result<ClickOutcome, StoreError> {
        let row = sqlx::query_as::<_, ClickStateRow>(
            r#"
            SELECT active, expires_at
            FROM links
            WHERE short_code = $1 AND COALESCE(domain, '') = COALESCE($2::text, '')
            ORDER BY active DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(&key.code)
        .bind(key.domain.as_deref())
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(match row {
            Some(row) if !row.active => ClickOutcome::Inactive,
            Some(row) if row.expires_at.is_some_and(|at| now >= at) => ClickOutcome::Expired,
            Some(_) => ClickOutcome::Exhausted,
            None => ClickOutcome::Inactive,
        })
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn put(&self, new_link: NewLink) -> Result<Link, StoreError> {
        let key = new_link.key();

        let row = sqlx::query_as::<_, LinkRow>(&format!(
            r#"
            INSERT INTO links (short_code, domain, destination_url, owner_id, password_hash,
                               expires_at, max_clicks, is_one_time)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {LINK_COLUMNS}
            "#
        ))
        .bind(&new_link.short_code)
        .bind(new_link.domain.as_deref())
        .bind(&new_link.destination_url)
        .bind(new_link.owner_id.as_deref())
        .bind(new_link.password_hash.as_deref())
        .bind(new_link.expires_at)
        .bind(new_link.max_clicks)
        .bind(new_link.is_one_time)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| match StoreError::from(e) {
            StoreError::DuplicateKey(_) => StoreError::DuplicateKey(key.to_string()),
            other => other,
        })?;

        Ok(row.into())
    }

    async fn get_active(&self, key: &LinkKey) -> Result<Option<Link>, StoreError> {
        // Records of the exact domain sort first; the default-domain record
        // is only reached when the exact domain has no record at all.
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM links
            WHERE short_code = $1 AND (domain = $2 OR domain IS NULL)
            ORDER BY (domain IS NULL), active DESC, id DESC
            LIMIT 1
            "#
        ))
        .bind(&key.code)
        .bind(key.domain.as_deref())
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.filter(|r| r.active).map(Link::from))
    }

    async fn exists(&self, key: &LinkKey) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM links
                WHERE short_code = $1
                  AND COALESCE(domain, '') = COALESCE($2::text, '')
                  AND active
            )
            "#,
        )
        .bind(&key.code)
        .bind(key.domain.as_deref())
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn increment_clicks(
        &self,
        key: &LinkKey,
        now: DateTime<Utc>,
    ) -> Result<ClickOutcome, StoreError> {
        let counted = sqlx::query_as::<_, (i64, bool)>(
            r#"
            UPDATE links
            SET click_count = click_count + 1,
                active = NOT is_one_time,
                updated_at = $3
            WHERE short_code = $1
              AND COALESCE(domain, '') = COALESCE($2::text, '')
              AND active
              AND (expires_at IS NULL OR expires_at > $3)
              AND (max_clicks IS NULL OR click_count < max_clicks)
            RETURNING click_count, active
            "#,
        )
        .bind(&key.code)
        .bind(key.domain.as_deref())
        .bind(now)
        .fetch_optional(self.pool.as_ref())
        .await?;

        match counted {
            Some((click_count, active)) => Ok(ClickOutcome::Counted {
                click_count,
                deactivated: !active,
            }),
            None => self.classify_denied_click(key, now).await,
        }
    }

    async fn deactivate(&self, key: &LinkKey) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE links
            SET active = FALSE, updated_at = NOW()
            WHERE short_code = $1
              AND COALESCE(domain, '') = COALESCE($2::text, '')
              AND active
            "#,
        )
        .bind(&key.code)
        .bind(key.domain.as_deref())
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find(&self, key: &LinkKey) -> Result<Option<Link>, StoreError> {
        let row = sqlx::query_as::<_, LinkRow>(&format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM links
            WHERE short_code = $1 AND COALESCE(domain, '') = COALESCE($2::text, '')
            ORDER BY active DESC, id DESC
            LIMIT 1
            "#
        ))
        .bind(&key.code)
        .bind(key.domain.as_deref())
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn list_by_owner(
        &self,
        owner_id: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Link>, StoreError> {
        let rows = sqlx::query_as::<_, LinkRow>(&format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM links
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#
        ))
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Link::from).collect())
    }

    async fn count_by_owner(&self, owner_id: &str) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM links WHERE owner_id = $1")
            .bind(owner_id)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
