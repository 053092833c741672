// Common types used across the simulator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the book a quote rests on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Bid,
    Offer,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => write!(f, "Bid"),
            Side::Offer => write!(f, "Offer"),
        }
    }
}

/// Direction of an executed trade from the player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    /// +1 for a buy, -1 for a sell
    pub fn sign(self) -> i64 {
        match self {
            Direction::Buy => 1,
            Direction::Sell => -1,
        }
    }
}

/// A player's aggressive action against resting liquidity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Sell into the best bid
    Hit,
    /// Buy the best offer
    Lift,
}

impl PlayerAction {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'h' => Some(PlayerAction::Hit),
            'l' => Some(PlayerAction::Lift),
            _ => None,
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            PlayerAction::Hit => Direction::Sell,
            PlayerAction::Lift => Direction::Buy,
        }
    }
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerAction::Hit => write!(f, "hit"),
            PlayerAction::Lift => write!(f, "lift"),
        }
    }
}

/// A proposed price from the quote generator. Consumed on submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub label: String,
    pub price: f64,
    pub side: Side,
}

impl Quote {
    /// Build a quote, rounding the price to the nearest whole unit (halves to even)
    pub fn new(label: impl Into<String>, price: f64, side: Side) -> Self {
        Self {
            label: label.into(),
            price: price.round_ties_even(),
            side,
        }
    }
}

impl fmt::Display for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.label, self.side, self.price)
    }
}

/// A player fill recorded in the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub label: String,
    pub direction: Direction,
    pub price: f64,
    pub tick: usize,
    pub executed_at: DateTime<Utc>,
}

impl Trade {
    pub fn new(label: impl Into<String>, direction: Direction, price: f64, tick: usize) -> Self {
        Self {
            label: label.into(),
            direction,
            price,
            tick,
            executed_at: Utc::now(),
        }
    }

    /// Cash flow convention: +price for a buy, -price for a sell
    pub fn signed_value(&self) -> f64 {
        self.direction.sign() as f64 * self.price
    }
}

/// Round to cents
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
