// Order Book
// One-unit-per-entry bid/offer levels with cross detection and a depth cap

use std::collections::BTreeMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::types::{Quote, Side};

/// Default number of entries kept per side
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Wrapper for f64 to use as BTreeMap key (handles NaN/Inf properly)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct OrderedFloat(pub f64);

impl Eq for OrderedFloat {}

impl Ord for OrderedFloat {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Multiset of resting prices on one side. Each entry is one unit.
#[derive(Debug, Clone, Default)]
pub struct PriceLevels {
    levels: BTreeMap<OrderedFloat, usize>,
    len: usize,
}

impl PriceLevels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, price: f64) {
        *self.levels.entry(OrderedFloat(price)).or_insert(0) += 1;
        self.len += 1;
    }

    /// Remove one unit at `price`. Returns false if nothing rests there.
    pub fn remove_one(&mut self, price: f64) -> bool {
        let key = OrderedFloat(price);
        match self.levels.get_mut(&key) {
            Some(count) if *count > 1 => {
                *count -= 1;
            }
            Some(_) => {
                self.levels.remove(&key);
            }
            None => return false,
        }
        self.len -= 1;
        true
    }

    pub fn highest(&self) -> Option<f64> {
        self.levels.keys().next_back().map(|k| k.0)
    }

    pub fn lowest(&self) -> Option<f64> {
        self.levels.keys().next().map(|k| k.0)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Every unit, highest price first
    pub fn prices_desc(&self) -> Vec<f64> {
        self.levels
            .iter()
            .rev()
            .flat_map(|(price, count)| std::iter::repeat(price.0).take(*count))
            .collect()
    }
}

/// What happened to a submitted quote
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubmitOutcome {
    /// Quote rested; `evicted` is the worst price dropped to respect the depth cap
    Rested { side: Side, price: f64, evicted: Option<f64> },
    /// Aggressive bid took the best offer at `price`
    Lifted { price: f64 },
    /// Aggressive offer took the best bid at `price`
    Hit { price: f64 },
}

impl SubmitOutcome {
    pub fn is_fill(&self) -> bool {
        matches!(self, SubmitOutcome::Lifted { .. } | SubmitOutcome::Hit { .. })
    }
}

/// Read-only view handed to the display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub label: String,
    pub name: String,
    /// Sorted descending
    pub bids: Vec<f64>,
    /// Sorted descending
    pub offers: Vec<f64>,
    /// Best offer minus best bid, when both sides are quoted
    pub spread: Option<f64>,
    pub mid: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Bid/offer book for a single instrument
#[derive(Debug, Clone)]
pub struct OrderBook {
    bids: PriceLevels,
    offers: PriceLevels,
    max_depth: usize,
    pub last_update: DateTime<Utc>,
    pub sequence: u64,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl OrderBook {
    /// Create new empty order book
    pub fn new(max_depth: usize) -> Self {
        Self {
            bids: PriceLevels::new(),
            offers: PriceLevels::new(),
            max_depth,
            last_update: Utc::now(),
            sequence: 0,
        }
    }

    /// Seed a book with resting prices. The depth cap is not applied.
    pub fn from_levels(bids: &[f64], offers: &[f64], max_depth: usize) -> Self {
        let mut book = Self::new(max_depth);
        for &price in bids {
            book.bids.insert(price);
        }
        for &price in offers {
            book.offers.insert(price);
        }
        book
    }

    /// Highest bid, or negative infinity when there are no bids
    pub fn best_bid(&self) -> f64 {
        self.bids.highest().unwrap_or(f64::NEG_INFINITY)
    }

    /// Lowest offer, or positive infinity when there are no offers
    pub fn best_offer(&self) -> f64 {
        self.offers.lowest().unwrap_or(f64::INFINITY)
    }

    /// Route a quote: take the opposite side if it crosses, otherwise rest it.
    /// Only a strictly better price crosses; a quote touching the opposite
    /// best rests, so a resting book can be locked but never crossed.
    pub fn submit(&mut self, quote: &Quote) -> SubmitOutcome {
        self.touch();

        let best_offer = self.best_offer();
        let best_bid = self.best_bid();

        match quote.side {
            Side::Bid if quote.price > best_offer => {
                self.offers.remove_one(best_offer);
                SubmitOutcome::Lifted { price: best_offer }
            }
            Side::Offer if quote.price < best_bid => {
                self.bids.remove_one(best_bid);
                SubmitOutcome::Hit { price: best_bid }
            }
            side => {
                let evicted = self.rest(side, quote.price);
                SubmitOutcome::Rested { side, price: quote.price, evicted }
            }
        }
    }

    /// Insert then drop the worst entry on that side if over the cap
    fn rest(&mut self, side: Side, price: f64) -> Option<f64> {
        match side {
            Side::Bid => {
                self.bids.insert(price);
                if self.bids.len() > self.max_depth {
                    let worst = self.bids.lowest()?;
                    self.bids.remove_one(worst);
                    debug!("Evicted {} Bid", worst);
                    return Some(worst);
                }
            }
            Side::Offer => {
                self.offers.insert(price);
                if self.offers.len() > self.max_depth {
                    let worst = self.offers.highest()?;
                    self.offers.remove_one(worst);
                    debug!("Evicted {} Offer", worst);
                    return Some(worst);
                }
            }
        }
        None
    }

    /// Remove and return the best bid
    pub fn take_best_bid(&mut self) -> Option<f64> {
        let price = self.bids.highest()?;
        self.bids.remove_one(price);
        self.touch();
        Some(price)
    }

    /// Remove and return the best offer
    pub fn take_best_offer(&mut self) -> Option<f64> {
        let price = self.offers.lowest()?;
        self.offers.remove_one(price);
        self.touch();
        Some(price)
    }

    fn touch(&mut self) {
        self.last_update = Utc::now();
        self.sequence += 1;
    }

    pub fn bids(&self) -> Vec<f64> {
        self.bids.prices_desc()
    }

    pub fn offers(&self) -> Vec<f64> {
        self.offers.prices_desc()
    }

    /// Get order book depth (entries per side)
    pub fn depth(&self) -> (usize, usize) {
        (self.bids.len(), self.offers.len())
    }

    /// Get bid-offer spread
    pub fn spread(&self) -> Option<f64> {
        match (self.offers.lowest(), self.bids.highest()) {
            (Some(offer), Some(bid)) => Some(offer - bid),
            _ => None,
        }
    }

    /// Get mid price
    pub fn mid_price(&self) -> Option<f64> {
        match (self.offers.lowest(), self.bids.highest()) {
            (Some(offer), Some(bid)) => Some((offer + bid) / 2.0),
            _ => None,
        }
    }

    pub fn snapshot(&self, label: &str, name: &str) -> BookSnapshot {
        BookSnapshot {
            label: label.to_string(),
            name: name.to_string(),
            bids: self.bids(),
            offers: self.offers(),
            spread: self.spread(),
            mid: self.mid_price(),
            timestamp: self.last_update,
        }
    }

    /// Validate order book integrity
    pub fn validate(&self) -> Result<(), String> {
        if let (Some(bid), Some(offer)) = (self.bids.highest(), self.offers.lowest()) {
            if bid > offer {
                return Err(format!(
                    "Crossed book: best bid ({}) > best offer ({})",
                    bid, offer
                ));
            }
        }

        let (bid_depth, offer_depth) = self.depth();
        if bid_depth > self.max_depth || offer_depth > self.max_depth {
            return Err(format!(
                "Depth {}x{} exceeds cap of {}",
                bid_depth, offer_depth, self.max_depth
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bid(price: f64) -> Quote {
        Quote::new("a", price, Side::Bid)
    }

    fn offer(price: f64) -> Quote {
        Quote::new("a", price, Side::Offer)
    }

    #[test]
    fn test_order_book_creation() {
        let book = OrderBook::default();
        assert_eq!(book.depth(), (0, 0));
        assert_eq!(book.best_bid(), f64::NEG_INFINITY);
        assert_eq!(book.best_offer(), f64::INFINITY);
        assert_eq!(book.spread(), None);
    }

    #[test]
    fn test_rest_then_lift() {
        let mut book = OrderBook::default();

        assert_eq!(
            book.submit(&bid(140.0)),
            SubmitOutcome::Rested { side: Side::Bid, price: 140.0, evicted: None }
        );
        assert_eq!(
            book.submit(&offer(160.0)),
            SubmitOutcome::Rested { side: Side::Offer, price: 160.0, evicted: None }
        );
        assert_eq!(book.bids(), vec![140.0]);
        assert_eq!(book.offers(), vec![160.0]);

        assert_eq!(book.submit(&bid(170.0)), SubmitOutcome::Lifted { price: 160.0 });
        assert!(book.offers().is_empty());
        assert_eq!(book.bids(), vec![140.0]);
    }

    #[test]
    fn test_aggressive_offer_hits_best_bid() {
        let mut book = OrderBook::from_levels(&[100.0, 110.0], &[], 5);
        assert_eq!(book.submit(&offer(105.0)), SubmitOutcome::Hit { price: 110.0 });
        assert_eq!(book.bids(), vec![100.0]);
        assert!(book.offers().is_empty());
    }

    #[test]
    fn test_empty_side_never_crosses() {
        let mut book = OrderBook::default();
        // No offers: a bid at any price rests
        assert!(!book.submit(&bid(1_000_000.0)).is_fill());
        // Best bid is 1e6 so a low offer hits it
        assert!(book.submit(&offer(5.0)).is_fill());
        assert_eq!(book.depth(), (0, 0));
    }

    #[test]
    fn test_touching_price_rests() {
        let mut book = OrderBook::from_levels(&[150.0], &[160.0], 5);
        assert_eq!(
            book.submit(&bid(160.0)),
            SubmitOutcome::Rested { side: Side::Bid, price: 160.0, evicted: None }
        );
        assert_eq!(book.best_bid(), book.best_offer());
        assert!(book.validate().is_ok());

        // Locked at 160: an offer at the best bid rests too
        assert_eq!(
            book.submit(&offer(160.0)),
            SubmitOutcome::Rested { side: Side::Offer, price: 160.0, evicted: None }
        );
        assert_eq!(book.depth(), (2, 2));

        // One tick through the touch trades
        assert_eq!(book.submit(&offer(159.0)), SubmitOutcome::Hit { price: 160.0 });
        assert_eq!(book.bids(), vec![150.0]);
    }

    #[test]
    fn test_depth_cap_evicts_worst_bid() {
        let mut book = OrderBook::from_levels(&[100.0, 105.0, 110.0, 115.0, 120.0], &[], 5);
        let outcome = book.submit(&bid(90.0));
        assert_eq!(
            outcome,
            SubmitOutcome::Rested { side: Side::Bid, price: 90.0, evicted: Some(90.0) }
        );
        assert_eq!(book.bids(), vec![120.0, 115.0, 110.0, 105.0, 100.0]);

        let outcome = book.submit(&bid(112.0));
        assert_eq!(
            outcome,
            SubmitOutcome::Rested { side: Side::Bid, price: 112.0, evicted: Some(100.0) }
        );
        assert_eq!(book.bids(), vec![120.0, 115.0, 112.0, 110.0, 105.0]);
    }

    #[test]
    fn test_depth_cap_evicts_worst_offer() {
        let mut book = OrderBook::from_levels(&[], &[200.0, 205.0, 210.0, 215.0, 220.0], 5);
        let outcome = book.submit(&offer(201.0));
        assert_eq!(
            outcome,
            SubmitOutcome::Rested { side: Side::Offer, price: 201.0, evicted: Some(220.0) }
        );
        assert_eq!(book.offers(), vec![215.0, 210.0, 205.0, 201.0, 200.0]);
    }

    #[test]
    fn test_duplicate_prices_are_separate_units() {
        let mut book = OrderBook::default();
        book.submit(&bid(100.0));
        book.submit(&bid(100.0));
        assert_eq!(book.depth(), (2, 0));
        assert_eq!(book.take_best_bid(), Some(100.0));
        assert_eq!(book.bids(), vec![100.0]);
    }

    #[test]
    fn test_take_best() {
        let mut book = OrderBook::from_levels(&[100.0, 110.0], &[120.0, 125.0], 5);
        assert_eq!(book.take_best_bid(), Some(110.0));
        assert_eq!(book.take_best_offer(), Some(120.0));
        assert_eq!(book.spread(), Some(25.0));
        assert_eq!(book.mid_price(), Some(112.5));

        let mut empty = OrderBook::default();
        assert_eq!(empty.take_best_bid(), None);
        assert_eq!(empty.take_best_offer(), None);
    }

    #[test]
    fn test_snapshot_sorted_descending() {
        let book = OrderBook::from_levels(&[101.0, 99.0, 100.0], &[110.0, 108.0], 5);
        let snap = book.snapshot("a", "Future A");
        assert_eq!(snap.bids, vec![101.0, 100.0, 99.0]);
        assert_eq!(snap.offers, vec![110.0, 108.0]);
        assert_eq!(snap.spread, Some(7.0));
        assert_eq!(snap.mid, Some(104.5));
        assert_eq!(snap.label, "a");

        let one_sided = OrderBook::from_levels(&[101.0], &[], 5).snapshot("a", "Future A");
        assert_eq!(one_sided.spread, None);
        assert_eq!(one_sided.mid, None);
    }

    #[test]
    fn test_validate_flags_crossed_book() {
        let book = OrderBook::from_levels(&[120.0], &[110.0], 5);
        assert!(book.validate().is_err());
        let book = OrderBook::from_levels(&[100.0], &[110.0], 5);
        assert!(book.validate().is_ok());
        // Locked is allowed
        let book = OrderBook::from_levels(&[110.0], &[110.0], 5);
        assert!(book.validate().is_ok());
    }
}
