use super::overlaps::OverlapCalculator;
use crate::error::{IndexError, Result};

pub struct MomentumCalculator;

impl MomentumCalculator {
    // Percent distance of the latest close from its moving average.
    // 0% lands on 50, saturating at +/-5%.
    pub fn score(closes: &[f64], window: usize) -> Result<f64> {
        let price = *closes
            .last()
            .ok_or_else(|| IndexError::undefined("momentum needs at least one close"))?;

        let average = OverlapCalculator::latest_moving_average(closes, window).ok_or_else(|| {
            IndexError::undefined(format!(
                "{}-period moving average undefined with {} closes",
                window,
                closes.len()
            ))
        })?;

        if average == 0.0 {
            return Err(IndexError::undefined("moving average is zero"));
        }

        let pct_diff = (price - average) / average * 100.0;
        if !pct_diff.is_finite() {
            return Err(IndexError::undefined("momentum deviation is not finite"));
        }

        Ok(((pct_diff + 5.0) * 10.0).clamp(0.0, 100.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_prices_score_50() {
        let score = MomentumCalculator::score(&[100.0; 130], 125).unwrap();
        assert_eq!(score, 50.0);
    }

    #[test]
    fn test_above_average() {
        // average of 124 x 100 and one 102.5 is 100.02
        let mut closes = vec![100.0; 124];
        closes.push(102.5);
        let score = MomentumCalculator::score(&closes, 125).unwrap();
        let average = (124.0 * 100.0 + 102.5) / 125.0;
        let expected = ((102.5 - average) / average * 100.0 + 5.0) * 10.0;
        assert!((score - expected).abs() < 1e-9);
        assert!(score > 50.0);
    }

    #[test]
    fn test_saturates() {
        let mut rally = vec![100.0; 124];
        rally.push(200.0);
        assert_eq!(MomentumCalculator::score(&rally, 125).unwrap(), 100.0);

        let mut crash = vec![100.0; 124];
        crash.push(50.0);
        assert_eq!(MomentumCalculator::score(&crash, 125).unwrap(), 0.0);
    }

    #[test]
    fn test_short_history_is_undefined() {
        assert!(matches!(
            MomentumCalculator::score(&[100.0; 124], 125),
            Err(IndexError::ComputationUndefined(_))
        ));
    }

    #[test]
    fn test_zero_average_is_undefined() {
        assert!(MomentumCalculator::score(&[0.0; 10], 5).is_err());
        assert!(MomentumCalculator::score(&[], 5).is_err());
    }
}
