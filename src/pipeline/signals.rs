use std::collections::HashMap;

use crate::store::models::SignalRow;

use super::candidates::{EntityKey, EntityKind};

/// Trailing attribution window for all engagement signals.
pub(crate) const ENGAGEMENT_WINDOW_HOURS: i64 = 24;

/// Raw engagement counts for the trailing window, keyed by entity.
///
/// An entity with no activity simply has no entry; lookups default to 0.
/// Movies never appear in the affiliate map because no movie-offer join
/// exists in the store — a known asymmetry that is preserved here.
#[derive(Debug, Default, Clone)]
pub struct SignalCounts {
    reminders: HashMap<EntityKey, i64>,
    follows: HashMap<EntityKey, i64>,
    affiliate_clicks: HashMap<EntityKey, i64>,
}

impl SignalCounts {
    #[must_use]
    pub fn from_parts(
        reminders: HashMap<EntityKey, i64>,
        follows: HashMap<EntityKey, i64>,
        affiliate_clicks: HashMap<EntityKey, i64>,
    ) -> Self {
        Self {
            reminders,
            follows,
            affiliate_clicks,
        }
    }

    /// Indexes the three collector result sets, dropping rows whose kind is
    /// outside the trending pool. Returns the counts plus how many rows were
    /// discarded so the caller can surface that in metrics.
    pub(crate) fn from_rows(
        reminders: Vec<SignalRow>,
        follows: Vec<SignalRow>,
        affiliate_clicks: Vec<SignalRow>,
    ) -> (Self, u64) {
        let mut discarded = 0;
        let counts = Self {
            reminders: index_rows(reminders, &mut discarded),
            follows: index_rows(follows, &mut discarded),
            affiliate_clicks: index_rows(affiliate_clicks, &mut discarded),
        };
        (counts, discarded)
    }

    #[must_use]
    pub fn reminders(&self, key: EntityKey) -> i64 {
        self.reminders.get(&key).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn follows(&self, key: EntityKey) -> i64 {
        self.follows.get(&key).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn affiliate_clicks(&self, key: EntityKey) -> i64 {
        self.affiliate_clicks.get(&key).copied().unwrap_or(0)
    }
}

fn index_rows(rows: Vec<SignalRow>, discarded: &mut u64) -> HashMap<EntityKey, i64> {
    let mut map = HashMap::with_capacity(rows.len());
    for row in rows {
        let Some(kind) = EntityKind::parse(&row.entity_kind) else {
            *discarded += 1;
            continue;
        };
        // aggregate queries group by entity, so collisions only happen when a
        // collector mixes sources; summing keeps that case correct anyway
        *map.entry(EntityKey::new(kind, row.entity_id)).or_insert(0) += row.count;
    }
    map
}
