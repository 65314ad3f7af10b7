pub struct OverlapCalculator;

impl OverlapCalculator {
    // Simple moving average, aligned with the input.
    // The first `window - 1` entries have no full window and are NaN.
    pub fn moving_average(series: &[f64], window: usize) -> Vec<f64> {
        if window == 0 {
            return vec![f64::NAN; series.len()];
        }

        (0..series.len())
            .map(|i| {
                if i + 1 < window {
                    f64::NAN
                } else {
                    series[i + 1 - window..=i].iter().sum::<f64>() / window as f64
                }
            })
            .collect()
    }

    /// Latest value of the moving average, `None` when there is not a full window.
    pub fn latest_moving_average(series: &[f64], window: usize) -> Option<f64> {
        Self::moving_average(series, window)
            .last()
            .copied()
            .filter(|v| !v.is_nan())
    }
}
