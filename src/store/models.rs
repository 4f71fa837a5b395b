use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

/// One aggregate row from a signal collector query.
///
/// `entity_kind` stays a raw string here; mapping into the trending pool (and
/// discarding countdown/holiday rows) happens in the pipeline layer.
#[derive(Debug, Clone)]
pub(crate) struct SignalRow {
    pub entity_kind: String,
    pub entity_id: Uuid,
    pub count: i64,
}

/// One row from the per-kind candidate window queries.
#[derive(Debug, Clone)]
pub(crate) struct CandidateRow {
    pub id: Uuid,
    pub reference_time: Option<DateTime<Utc>>,
}

/// Output record for the `trending_scores` upsert.
#[derive(Debug, Clone)]
pub(crate) struct TrendingScoreRecord {
    pub entity_kind: &'static str,
    pub entity_id: Uuid,
    pub score: f64,
    pub reasons: Value,
}
