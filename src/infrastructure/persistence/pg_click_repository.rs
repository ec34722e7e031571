//! PostgreSQL implementation of click repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::{ClickSummary, ReferrerKind};
use crate::domain::errors::StoreError;
use crate::domain::repositories::ClickRepository;

/// PostgreSQL repository for the append-only click log.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn record(&self, event: &ClickEvent) -> Result<(), StoreError> {
        let kind = ReferrerKind::classify(event.referrer.as_deref());

        sqlx::query(
            r#"
            INSERT INTO link_clicks
                (link_id, domain, short_code, clicked_at, client_ip, user_agent, referrer, referrer_kind)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(event.link_id)
        .bind(event.domain.as_deref())
        .bind(&event.short_code)
        .bind(event.timestamp)
        .bind(event.client_ip.as_deref())
        .bind(event.user_agent.as_deref())
        .bind(event.referrer.as_deref())
        .bind(kind.as_str())
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn summarize(&self, link_id: i64) -> Result<ClickSummary, StoreError> {
        let rows = sqlx::query_as::<_, (String, i64, Option<DateTime<Utc>>)>(
            r#"
            SELECT referrer_kind, COUNT(*), MAX(clicked_at)
            FROM link_clicks
            WHERE link_id = $1
            GROUP BY referrer_kind
            "#,
        )
        .bind(link_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        let mut summary = ClickSummary::default();
        for (kind, count, last_clicked_at) in rows {
            summary.add(ReferrerKind::from_label(&kind), count, last_clicked_at);
        }

        Ok(summary)
    }
}
