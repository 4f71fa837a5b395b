use chrono::{DateTime, Utc};

use super::candidates::{Candidate, EntityKind};

// The three domains run on different natural timescales, so each kind gets its
// own decay constant and out-of-window handling.
const MATCH_LOOKBACK_HOURS: f64 = 4.0;
const MATCH_HORIZON_HOURS: f64 = 72.0;
const MATCH_DECAY_HOURS: f64 = 36.0;
const MATCH_LIVE_SCORE: f64 = 0.9;
const MATCH_FLOOR: f64 = 0.1;

const EVENT_HORIZON_HOURS: f64 = 336.0;
const EVENT_DECAY_HOURS: f64 = 120.0;

const MOVIE_HORIZON_HOURS: f64 = 336.0;
const MOVIE_DECAY_HOURS: f64 = 168.0;
const MOVIE_RELEASED_SCORE: f64 = 0.4;

const LONG_TAIL_FLOOR: f64 = 0.05;

/// Time-proximity decay score for one candidate, `0` when no reference time
/// could be resolved.
pub(crate) fn for_candidate(candidate: &Candidate, now: DateTime<Utc>) -> f64 {
    match candidate.reference_time {
        Some(reference) => decay_score(candidate.key.kind, hours_from_now(reference, now)),
        None => 0.0,
    }
}

/// 種別ごとの時間減衰スコア。`delta_hours` は参照時刻までの符号付き時間差。
///
/// Pure and reproducible: the same `(kind, delta_hours)` always yields the
/// same score. Boundary operators are deliberate; a match at exactly
/// `delta_hours = -4` is still "live-hot" (the `<` below is strict).
#[must_use]
pub fn decay_score(kind: EntityKind, delta_hours: f64) -> f64 {
    match kind {
        EntityKind::Match => {
            if delta_hours < -MATCH_LOOKBACK_HOURS {
                0.0
            } else if delta_hours < 0.0 {
                // recently finished or in progress
                MATCH_LIVE_SCORE
            } else if delta_hours > MATCH_HORIZON_HOURS {
                MATCH_FLOOR
            } else {
                (-delta_hours / MATCH_DECAY_HOURS).exp()
            }
        }
        EntityKind::Event => {
            if delta_hours < 0.0 {
                0.0
            } else if delta_hours > EVENT_HORIZON_HOURS {
                LONG_TAIL_FLOOR
            } else {
                (-delta_hours / EVENT_DECAY_HOURS).exp()
            }
        }
        EntityKind::Movie => {
            if delta_hours < 0.0 {
                // already released, moderate ongoing interest
                MOVIE_RELEASED_SCORE
            } else if delta_hours > MOVIE_HORIZON_HOURS {
                LONG_TAIL_FLOOR
            } else {
                (-delta_hours / MOVIE_DECAY_HOURS).exp()
            }
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn hours_from_now(reference: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    reference.signed_duration_since(now).num_milliseconds() as f64 / 3_600_000.0
}
