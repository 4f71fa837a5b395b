use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::store::models::CandidateRow;

/// 候補となるエンティティ種別。ストアはカウントダウンや祝日のエンゲージメントも
/// 記録するが、トレンディング対象はこの3種別のみ。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Event,
    Match,
    Movie,
}

impl EntityKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Event => "event",
            Self::Match => "match",
            Self::Movie => "movie",
        }
    }

    /// Maps a stored `entity_kind` discriminator. Kinds outside the trending
    /// pool (countdown, holiday, ...) map to `None` and are discarded upstream.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "event" => Some(Self::Event),
            "match" => Some(Self::Match),
            "movie" => Some(Self::Movie),
            _ => None,
        }
    }
}

/// Compound key for one scoreable entity.
///
/// Used directly as a map key across the signal maps so attribution can never
/// collide on string formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: Uuid,
}

impl EntityKey {
    #[must_use]
    pub fn new(kind: EntityKind, id: Uuid) -> Self {
        Self { kind, id }
    }
}

/// One entity eligible for scoring this run.
///
/// `reference_time` is the event start, match kickoff, or the movie's earliest
/// known release date. A candidate without one still gets scored; it simply
/// receives zero proximity.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub key: EntityKey,
    pub reference_time: Option<DateTime<Utc>>,
}

impl Candidate {
    #[must_use]
    pub fn new(key: EntityKey, reference_time: Option<DateTime<Utc>>) -> Self {
        Self {
            key,
            reference_time,
        }
    }
}

/// Forward window for event candidates.
pub(crate) const EVENT_HORIZON_DAYS: i64 = 14;
/// Matches stay candidates for a few hours after kickoff (live / just finished).
pub(crate) const MATCH_LOOKBACK_HOURS: i64 = 4;
/// Forward window for match candidates.
pub(crate) const MATCH_HORIZON_HOURS: i64 = 72;
/// Forward window for movie release dates; past releases stay eligible.
pub(crate) const MOVIE_HORIZON_DAYS: i64 = 14;

/// Flattens the per-kind window query results into one candidate list.
///
/// No cross-kind deduplication happens here: the three id spaces are disjoint
/// in the store, and within a kind the window queries return distinct rows.
pub(crate) fn assemble(
    events: Vec<CandidateRow>,
    matches: Vec<CandidateRow>,
    movies: Vec<CandidateRow>,
) -> Vec<Candidate> {
    let mut candidates = Vec::with_capacity(events.len() + matches.len() + movies.len());
    candidates.extend(tagged(EntityKind::Event, events));
    candidates.extend(tagged(EntityKind::Match, matches));
    candidates.extend(tagged(EntityKind::Movie, movies));
    candidates
}

fn tagged(kind: EntityKind, rows: Vec<CandidateRow>) -> impl Iterator<Item = Candidate> {
    rows.into_iter()
        .map(move |row| Candidate::new(EntityKey::new(kind, row.id), row.reference_time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_trending_kinds_only() {
        assert_eq!(EntityKind::parse("event"), Some(EntityKind::Event));
        assert_eq!(EntityKind::parse("match"), Some(EntityKind::Match));
        assert_eq!(EntityKind::parse("movie"), Some(EntityKind::Movie));
        assert_eq!(EntityKind::parse("countdown"), None);
        assert_eq!(EntityKind::parse("holiday"), None);
        assert_eq!(EntityKind::parse(""), None);
    }

    #[test]
    fn assemble_tags_rows_with_their_kind() {
        let event_id = Uuid::new_v4();
        let match_id = Uuid::new_v4();
        let candidates = assemble(
            vec![CandidateRow {
                id: event_id,
                reference_time: None,
            }],
            vec![CandidateRow {
                id: match_id,
                reference_time: None,
            }],
            vec![],
        );

        assert_eq!(candidates.len(), 2);
        assert_eq!(
            candidates[0].key,
            EntityKey::new(EntityKind::Event, event_id)
        );
        assert_eq!(
            candidates[1].key,
            EntityKey::new(EntityKind::Match, match_id)
        );
    }
}
