// Price model: fair value draws and the linear volatility decay

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::config::MarketConfig;

/// Draws fair values and reports the noise level for a given tick
#[derive(Debug, Clone)]
pub struct PriceModel {
    std_min: f64,
    std_max: f64,
    total_ticks: usize,
    settlement_std: f64,
}

impl PriceModel {
    pub fn new(config: &MarketConfig) -> Self {
        Self {
            std_min: config.std_min,
            std_max: config.std_max,
            total_ticks: config.ticks,
            settlement_std: config.settlement_std,
        }
    }

    /// Fair value for a new instrument, uniform on `[min, max]`
    pub fn theoretical_value<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        rng.gen_range(min..=max)
    }

    /// Settlement drawn around the fair value
    pub fn settlement_value<R: Rng + ?Sized>(&self, rng: &mut R, theo: f64) -> f64 {
        sample_normal(rng, theo, self.settlement_std)
    }

    /// Volatility for `tick` under this session's horizon
    pub fn volatility_at(&self, tick: usize) -> f64 {
        decayed_volatility(tick, self.total_ticks, self.std_min, self.std_max)
    }
}

/// Linear decay from `std_max` at tick 0 to `std_min` at `total_ticks`.
/// Not clamped past the horizon.
pub fn decayed_volatility(tick: usize, total_ticks: usize, std_min: f64, std_max: f64) -> f64 {
    if total_ticks == 0 {
        return std_min;
    }
    let decay_per_tick = (std_max - std_min) / total_ticks as f64;
    std_max - tick as f64 * decay_per_tick
}

/// Normal sample that degrades to the mean for a zero or invalid std
pub(crate) fn sample_normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, std: f64) -> f64 {
    match Normal::new(mean, std) {
        Ok(dist) if std > 0.0 => dist.sample(rng),
        _ => mean,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_decay_endpoints() {
        assert_eq!(decayed_volatility(0, 35, 5.0, 50.0), 50.0);
        assert!((decayed_volatility(35, 35, 5.0, 50.0) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_decay_is_linear() {
        // 45 over 45 ticks: one unit per tick
        assert!((decayed_volatility(10, 45, 5.0, 50.0) - 40.0).abs() < 1e-9);
        assert!((decayed_volatility(44, 45, 5.0, 50.0) - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_decay_not_clamped_past_horizon() {
        let v = decayed_volatility(40, 35, 5.0, 50.0);
        assert!(v < 5.0);
    }

    #[test]
    fn test_theoretical_value_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let theo = PriceModel::theoretical_value(&mut rng, 100.0, 250.0);
            assert!((100.0..=250.0).contains(&theo));
        }
    }

    #[test]
    fn test_degenerate_range_and_std() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(PriceModel::theoretical_value(&mut rng, 150.0, 150.0), 150.0);
        assert_eq!(sample_normal(&mut rng, 42.0, 0.0), 42.0);
    }
}
