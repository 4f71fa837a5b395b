pub mod aggregate;
pub mod candidates;
pub mod normalize;
pub mod proximity;
pub mod signals;
pub mod weights;

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::{
    observability::metrics::Metrics,
    store::{dao::TrendingDao, models::TrendingScoreRecord},
};

use self::{
    candidates::{
        EVENT_HORIZON_DAYS, MATCH_HORIZON_HOURS, MATCH_LOOKBACK_HOURS, MOVIE_HORIZON_DAYS,
    },
    signals::{ENGAGEMENT_WINDOW_HOURS, SignalCounts},
    weights::Weights,
};

/// Outcome of one complete recomputation.
#[derive(Debug, Clone, Copy)]
pub struct RunReport {
    pub updated: usize,
}

/// Single-pass trending score builder: collect signals, enumerate candidates,
/// score, persist.
///
/// Stateless between runs; each invocation is a full recomputation over the
/// current store snapshot. Overlapping runs resolve by last-writer-wins on the
/// upsert key, which is acceptable because every run is idempotent given the
/// same inputs.
pub struct TrendingBuilder {
    dao: Arc<TrendingDao>,
    metrics: Arc<Metrics>,
}

impl TrendingBuilder {
    pub(crate) fn new(dao: Arc<TrendingDao>, metrics: Arc<Metrics>) -> Self {
        Self { dao, metrics }
    }

    /// Runs one recomputation against the current clock.
    ///
    /// # Errors
    /// Any collector query, candidate query, or upsert failure aborts the run;
    /// no partial scores are written in that case.
    #[allow(clippy::cast_precision_loss)]
    pub async fn run(&self) -> Result<RunReport> {
        let timer = self.metrics.run_duration.start_timer();
        let result = self.run_at(Utc::now()).await;
        timer.observe_duration();

        match &result {
            Ok(report) => {
                self.metrics.runs_completed.inc();
                self.metrics.candidates_scored.inc_by(report.updated as f64);
            }
            Err(_) => self.metrics.runs_failed.inc(),
        }
        result
    }

    #[allow(clippy::cast_precision_loss)]
    async fn run_at(&self, now: DateTime<Utc>) -> Result<RunReport> {
        let since = now - Duration::hours(ENGAGEMENT_WINDOW_HOURS);

        // the five reads are independent; join them for latency only
        let collect_timer = self.metrics.collect_duration.start_timer();
        let (reminder_rows, follow_rows, click_rows) = tokio::try_join!(
            self.dao.fetch_reminder_signals(since),
            self.dao.fetch_follow_signals(since),
            self.dao.fetch_affiliate_click_signals(since),
        )
        .context("signal collection failed")?;

        let (events, matches, movies) = tokio::try_join!(
            self.dao
                .fetch_event_candidates(now, now + Duration::days(EVENT_HORIZON_DAYS)),
            self.dao.fetch_match_candidates(
                now - Duration::hours(MATCH_LOOKBACK_HOURS),
                now + Duration::hours(MATCH_HORIZON_HOURS),
            ),
            self.dao
                .fetch_movie_candidates(now + Duration::days(MOVIE_HORIZON_DAYS)),
        )
        .context("candidate enumeration failed")?;
        collect_timer.observe_duration();

        let (signal_counts, discarded) =
            SignalCounts::from_rows(reminder_rows, follow_rows, click_rows);
        if discarded > 0 {
            self.metrics.signal_rows_discarded.inc_by(discarded as f64);
            debug!(discarded, "dropped signal rows outside the trending pool");
        }

        let candidates = candidates::assemble(events, matches, movies);
        if candidates.is_empty() {
            info!("no candidates in window, nothing to score");
            return Ok(RunReport { updated: 0 });
        }

        let weights = self.load_weights().await;
        let scored = aggregate::compute_scores(&candidates, &signal_counts, weights, now);

        let records = scored
            .into_iter()
            .map(|s| {
                Ok(TrendingScoreRecord {
                    entity_kind: s.key.kind.as_str(),
                    entity_id: s.key.id,
                    score: s.score,
                    reasons: serde_json::to_value(&s.reasons)
                        .context("failed to serialize score reasons")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let persist_timer = self.metrics.persist_duration.start_timer();
        self.dao.upsert_scores(&records, now).await?;
        persist_timer.observe_duration();

        info!(candidates = records.len(), "trending scores recomputed");
        Ok(RunReport {
            updated: records.len(),
        })
    }

    /// Settings override is best-effort: any fetch or parse failure falls back
    /// to the hard-coded defaults without failing the run.
    async fn load_weights(&self) -> Weights {
        match self.dao.fetch_weights_override().await {
            Ok(Some(over)) => {
                let merged = Weights::default().merged(&over);
                debug!(?merged, "using weights override from settings");
                merged
            }
            Ok(None) => Weights::default(),
            Err(error) => {
                warn!(
                    error = ?error,
                    "weights override fetch failed, falling back to defaults"
                );
                Weights::default()
            }
        }
    }
}
