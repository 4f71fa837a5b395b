/// Min-max scaler fitted on one signal category across the run's candidate set.
///
/// Normalization is relative to the current run only; absolute scores are not
/// comparable across runs, only the ordering within a run is meaningful.
#[derive(Debug, Clone, Copy)]
pub struct MinMax {
    // (min, span) when the fitted values have spread; `None` collapses every
    // input to 0 (empty set, singleton, or all values tied).
    params: Option<(f64, f64)>,
}

impl MinMax {
    #[must_use]
    pub fn fit(values: &[f64]) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &value in values {
            min = min.min(value);
            max = max.max(value);
        }
        let params = (max > min).then_some((min, max - min));
        Self { params }
    }

    /// Rescales `value` into `[0, 1]` relative to the fitted set.
    ///
    /// A degenerate fit returns 0 for every input: a signal with no spread
    /// across the candidate set contributes nothing this run. That is the
    /// intended behavior, not a defect.
    #[must_use]
    pub fn apply(&self, value: f64) -> f64 {
        match self.params {
            Some((min, span)) => (value - min) / span,
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_bounded_and_max_maps_to_one() {
        let values = [3.0, 0.0, 7.5, 1.0, 7.5];
        let scale = MinMax::fit(&values);
        for &value in &values {
            let normalized = scale.apply(value);
            assert!(
                (0.0..=1.0).contains(&normalized),
                "{normalized} out of range"
            );
        }
        assert!((scale.apply(7.5) - 1.0).abs() < f64::EPSILON);
        assert!(scale.apply(0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn tied_values_collapse_to_zero() {
        let scale = MinMax::fit(&[4.0, 4.0, 4.0]);
        assert!(scale.apply(4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn singleton_collapses_to_zero() {
        let scale = MinMax::fit(&[9.0]);
        assert!(scale.apply(9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_fit_collapses_to_zero() {
        let scale = MinMax::fit(&[]);
        assert!(scale.apply(123.0).abs() < f64::EPSILON);
    }
}
