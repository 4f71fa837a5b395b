use serde::Deserialize;

/// Blend coefficients for the five scoring components.
///
/// Defaults mirror the production settings fallback; operators can override
/// any subset through the `trending_weights` settings key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    pub pageviews: f64,
    pub growth: f64,
    pub engagement: f64,
    pub proximity: f64,
    pub affiliate: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            pageviews: 0.35,
            growth: 0.20,
            engagement: 0.25,
            proximity: 0.15,
            affiliate: 0.05,
        }
    }
}

/// Partial override as stored in settings. Unknown JSON keys are ignored so an
/// operator typo cannot take the whole run down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct WeightsOverride {
    pub pageviews: Option<f64>,
    pub growth: Option<f64>,
    pub engagement: Option<f64>,
    pub proximity: Option<f64>,
    pub affiliate: Option<f64>,
}

impl Weights {
    /// Key-by-key merge: keys absent from the override keep their defaults.
    #[must_use]
    pub fn merged(self, over: &WeightsOverride) -> Self {
        Self {
            pageviews: over.pageviews.unwrap_or(self.pageviews),
            growth: over.growth.unwrap_or(self.growth),
            engagement: over.engagement.unwrap_or(self.engagement),
            proximity: over.proximity.unwrap_or(self.proximity),
            affiliate: over.affiliate.unwrap_or(self.affiliate),
        }
    }
}
