pub mod calculator;
pub mod momentum;
pub mod overlaps;
pub mod volatility;

// Re-export the calculators
pub use self::calculator::IndexCalculator;
pub use self::momentum::MomentumCalculator;
pub use self::overlaps::OverlapCalculator;
pub use self::volatility::VolatilityCalculator;
