use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::pipeline::weights::WeightsOverride;

use super::models::{CandidateRow, SignalRow, TrendingScoreRecord};

const WEIGHTS_SETTINGS_KEY: &str = "trending_weights";

/// トレンディング計算が読むシグナル／候補テーブルと、書き込む
/// `trending_scores` テーブルへのアクセスをまとめた DAO。
#[derive(Debug, Clone)]
pub(crate) struct TrendingDao {
    pool: PgPool,
}

impl TrendingDao {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Readiness probe. Fails when the pool cannot reach Postgres.
    pub(crate) async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("database ping failed")?;
        Ok(())
    }

    /// Reminder sends in the trailing window, attributed through the parent
    /// reminder to its `(entity_kind, entity_id)`.
    pub(crate) async fn fetch_reminder_signals(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<SignalRow>> {
        let rows = sqlx::query(
            r"
            SELECT r.entity_kind, r.entity_id, COUNT(*) AS cnt
            FROM reminder_logs l
            JOIN reminders r ON r.id = l.reminder_id
            WHERE l.sent_at >= $1
            GROUP BY r.entity_kind, r.entity_id
            ",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch reminder signals")?;

        rows.iter().map(signal_row).collect()
    }

    /// Follows created in the trailing window; the row carries its own entity
    /// reference.
    pub(crate) async fn fetch_follow_signals(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<SignalRow>> {
        let rows = sqlx::query(
            r"
            SELECT entity_kind, entity_id, COUNT(*) AS cnt
            FROM follows
            WHERE created_at >= $1
            GROUP BY entity_kind, entity_id
            ",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch follow signals")?;

        rows.iter().map(signal_row).collect()
    }

    /// Affiliate clicks in the trailing window, attributed through the offer
    /// join tables to the owning event or match. A link can back offers on
    /// several entities; each join row counts. There is no movie-offer join,
    /// so movies never receive click attribution.
    pub(crate) async fn fetch_affiliate_click_signals(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<SignalRow>> {
        let rows = sqlx::query(
            r"
            SELECT 'event' AS entity_kind, eo.event_id AS entity_id, COUNT(*) AS cnt
            FROM affiliate_clicks c
            JOIN event_offers eo ON eo.affiliate_link_id = c.affiliate_link_id
            WHERE c.clicked_at >= $1
            GROUP BY eo.event_id
            UNION ALL
            SELECT 'match' AS entity_kind, mo.match_id AS entity_id, COUNT(*) AS cnt
            FROM affiliate_clicks c
            JOIN match_offers mo ON mo.affiliate_link_id = c.affiliate_link_id
            WHERE c.clicked_at >= $1
            GROUP BY mo.match_id
            ",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch affiliate click signals")?;

        rows.iter().map(signal_row).collect()
    }

    /// Events starting inside `[from, to]`.
    pub(crate) async fn fetch_event_candidates(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<CandidateRow>> {
        let rows = sqlx::query(
            r"
            SELECT id, starts_at AS reference_time
            FROM events
            WHERE starts_at >= $1 AND starts_at <= $2
            ",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch event candidates")?;

        rows.iter().map(candidate_row).collect()
    }

    /// Matches with kickoff inside `[from, to]`.
    pub(crate) async fn fetch_match_candidates(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<CandidateRow>> {
        let rows = sqlx::query(
            r"
            SELECT id, kickoff_at AS reference_time
            FROM matches
            WHERE kickoff_at >= $1 AND kickoff_at <= $2
            ",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch match candidates")?;

        rows.iter().map(candidate_row).collect()
    }

    /// Movies whose earliest known release date (cinema first, streaming as
    /// fallback) is known and no further out than `horizon`. Past releases
    /// stay eligible; decay handles staleness.
    pub(crate) async fn fetch_movie_candidates(
        &self,
        horizon: DateTime<Utc>,
    ) -> Result<Vec<CandidateRow>> {
        let rows = sqlx::query(
            r"
            SELECT id, COALESCE(cinema_release_at, streaming_release_at) AS reference_time
            FROM movies
            WHERE COALESCE(cinema_release_at, streaming_release_at) IS NOT NULL
              AND COALESCE(cinema_release_at, streaming_release_at) <= $1
            ",
        )
        .bind(horizon)
        .fetch_all(&self.pool)
        .await
        .context("failed to fetch movie candidates")?;

        rows.iter().map(candidate_row).collect()
    }

    /// Operator override for the blend weights, if any is configured.
    ///
    /// Any error here (missing table, malformed JSON) is the caller's cue to
    /// fall back to defaults; this method just reports what it found.
    pub(crate) async fn fetch_weights_override(&self) -> Result<Option<WeightsOverride>> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = $1")
            .bind(WEIGHTS_SETTINGS_KEY)
            .fetch_optional(&self.pool)
            .await
            .context("failed to fetch weights override")?;

        let Some(row) = row else {
            return Ok(None);
        };
        let value: serde_json::Value = row
            .try_get("value")
            .context("weights override value column missing")?;
        let over = serde_json::from_value(value).context("weights override is not valid JSON")?;
        Ok(Some(over))
    }

    /// Upserts the full run's scores inside one transaction.
    ///
    /// Keyed on `(entity_kind, entity_id)`, so re-runs overwrite instead of
    /// accumulating. The transaction makes a run all-or-nothing: a failing
    /// upsert rolls back every score written so far.
    pub(crate) async fn upsert_scores(
        &self,
        records: &[TrendingScoreRecord],
        computed_at: DateTime<Utc>,
    ) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .context("failed to begin trending score transaction")?;

        for record in records {
            sqlx::query(
                r"
                INSERT INTO trending_scores (entity_kind, entity_id, score, reasons, computed_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (entity_kind, entity_id) DO UPDATE SET
                    score = EXCLUDED.score,
                    reasons = EXCLUDED.reasons,
                    computed_at = EXCLUDED.computed_at
                ",
            )
            .bind(record.entity_kind)
            .bind(record.entity_id)
            .bind(record.score)
            .bind(&record.reasons)
            .bind(computed_at)
            .execute(&mut *tx)
            .await
            .with_context(|| {
                format!(
                    "failed to upsert trending score for {}:{}",
                    record.entity_kind, record.entity_id
                )
            })?;
        }

        tx.commit()
            .await
            .context("failed to commit trending scores")?;

        Ok(())
    }
}

fn signal_row(row: &sqlx::postgres::PgRow) -> Result<SignalRow> {
    Ok(SignalRow {
        entity_kind: row.try_get("entity_kind").context("entity_kind column")?,
        entity_id: row.try_get("entity_id").context("entity_id column")?,
        count: row.try_get("cnt").context("cnt column")?,
    })
}

fn candidate_row(row: &sqlx::postgres::PgRow) -> Result<CandidateRow> {
    Ok(CandidateRow {
        id: row.try_get("id").context("id column")?,
        reference_time: row
            .try_get("reference_time")
            .context("reference_time column")?,
    })
}
