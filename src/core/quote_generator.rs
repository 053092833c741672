// Quote generation: noisy prices around fair value with deliberate self-crosses

use rand::seq::index;
use rand::Rng;
use rand_distr::{Distribution, Exp};

use crate::core::price_model::sample_normal;
use crate::core::types::{Quote, Side};

/// Mean of the exponential draw for quotes per tick
pub const QUOTE_COUNT_SCALE: f64 = 2.0;

#[derive(Debug, Clone)]
pub struct QuoteGenerator {
    cross_prob: f64,
}

impl QuoteGenerator {
    pub fn new(cross_prob: f64) -> Self {
        Self { cross_prob }
    }

    /// Sample a quote for one instrument. Pure with respect to book state.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        label: &str,
        theo: f64,
        volatility: f64,
    ) -> Quote {
        let raw = sample_normal(rng, theo, volatility);
        let is_self_cross = rng.gen_bool(self.cross_prob.clamp(0.0, 1.0));
        let quote = Quote::new(label, raw, Side::Bid);
        let side = assign_side(quote.price, theo, is_self_cross);
        Quote { side, ..quote }
    }

    /// Pick which instruments quote this tick, returned as indices in draw order
    pub fn select_instruments<R: Rng + ?Sized>(&self, rng: &mut R, n_instruments: usize) -> Vec<usize> {
        let n = quote_count(rng, n_instruments).min(n_instruments);
        index::sample(rng, n_instruments, n).into_vec()
    }
}

impl Default for QuoteGenerator {
    fn default() -> Self {
        Self::new(0.4)
    }
}

/// Below fair value is buying interest, above is selling interest;
/// a self-cross inverts that so the quote can trade against the book.
pub fn assign_side(price: f64, theo: f64, is_self_cross: bool) -> Side {
    match (price < theo, is_self_cross) {
        (true, false) => Side::Bid,
        (true, true) => Side::Offer,
        (false, false) => Side::Offer,
        (false, true) => Side::Bid,
    }
}

/// `max(ceil(Exp(scale)), n)` for several instruments, otherwise exactly one.
/// Callers cap the result at the instrument count.
pub fn quote_count<R: Rng + ?Sized>(rng: &mut R, n_instruments: usize) -> usize {
    if n_instruments <= 1 {
        return n_instruments;
    }
    let draw = match Exp::new(1.0 / QUOTE_COUNT_SCALE) {
        Ok(dist) => dist.sample(rng).ceil() as usize,
        Err(_) => 1,
    };
    draw.max(n_instruments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_side_assignment_table() {
        assert_eq!(assign_side(140.0, 150.0, false), Side::Bid);
        assert_eq!(assign_side(140.0, 150.0, true), Side::Offer);
        assert_eq!(assign_side(160.0, 150.0, false), Side::Offer);
        assert_eq!(assign_side(160.0, 150.0, true), Side::Bid);
        // At fair value counts as the upper branch
        assert_eq!(assign_side(150.0, 150.0, false), Side::Offer);
    }

    #[test]
    fn test_generated_prices_are_whole_units() {
        let mut rng = StdRng::seed_from_u64(3);
        let generator = QuoteGenerator::default();
        for _ in 0..100 {
            let q = generator.generate(&mut rng, "a", 150.3, 20.0);
            assert_eq!(q.price, q.price.round());
            assert_eq!(q.label, "a");
        }
    }

    #[test]
    fn test_no_cross_probability_never_inverts() {
        let mut rng = StdRng::seed_from_u64(11);
        let generator = QuoteGenerator::new(0.0);
        for _ in 0..200 {
            let q = generator.generate(&mut rng, "a", 150.0, 25.0);
            let expected = if q.price < 150.0 { Side::Bid } else { Side::Offer };
            assert_eq!(q.side, expected);
        }
    }

    #[test]
    fn test_certain_cross_always_inverts() {
        let mut rng = StdRng::seed_from_u64(12);
        let generator = QuoteGenerator::new(1.0);
        for _ in 0..200 {
            let q = generator.generate(&mut rng, "a", 150.0, 25.0);
            let expected = if q.price < 150.0 { Side::Offer } else { Side::Bid };
            assert_eq!(q.side, expected);
        }
    }

    #[test]
    fn test_quote_count() {
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(quote_count(&mut rng, 1), 1);
        assert_eq!(quote_count(&mut rng, 0), 0);
        for _ in 0..50 {
            assert!(quote_count(&mut rng, 3) >= 3);
        }
    }

    #[test]
    fn test_selection_without_replacement() {
        let mut rng = StdRng::seed_from_u64(9);
        let generator = QuoteGenerator::default();
        for _ in 0..50 {
            let mut picked = generator.select_instruments(&mut rng, 3);
            assert_eq!(picked.len(), 3);
            picked.sort_unstable();
            picked.dedup();
            assert_eq!(picked, vec![0, 1, 2]);
        }
        assert_eq!(generator.select_instruments(&mut rng, 1), vec![0]);
    }
}
