// Plain-text board printed to stdout

use std::fmt::Write as _;

use super::DisplaySink;
use crate::core::ledger::Reconciliation;
use crate::core::types::Direction;
use crate::error::MarketError;
use crate::simulation::matching_engine::{MarketEvent, MatchingStats};
use crate::simulation::order_book::BookSnapshot;

const COLUMN_WIDTH: usize = 22;

pub struct ConsoleDisplay {
    depth: usize,
    show_quotes: bool,
}

impl ConsoleDisplay {
    pub fn new(depth: usize) -> Self {
        Self { depth, show_quotes: true }
    }

    /// Hide individual quote/eviction lines and only print the board
    pub fn quiet(mut self) -> Self {
        self.show_quotes = false;
        self
    }
}

impl DisplaySink for ConsoleDisplay {
    fn on_event(&mut self, event: &MarketEvent) {
        let line = match event {
            MarketEvent::QuoteRested { label, side, price } if self.show_quotes => {
                format!("{}: {} {}", label, side, price)
            }
            MarketEvent::Evicted { label, side, price } if self.show_quotes => {
                format!("{}: Removed {} {}", label, price, side)
            }
            MarketEvent::OfferLifted { label, price } => format!("{}: {} Offer Lifted", label, price),
            MarketEvent::BidHit { label, price } => format!("{}: {} Bid Hit", label, price),
            MarketEvent::PlayerFilled(trade) => match trade.direction {
                Direction::Buy => format!("{}: Bought @ {}!", trade.label, trade.price),
                Direction::Sell => format!("{}: Sold @ {}!", trade.label, trade.price),
            },
            _ => return,
        };
        println!("{}", line);
    }

    fn show_books(&mut self, tick: usize, books: &[BookSnapshot]) {
        println!("{}", "-".repeat(COLUMN_WIDTH * books.len().max(1)));
        println!("Tick {}", tick + 1);
        print!("{}", render_books(books, self.depth));
    }

    fn show_error(&mut self, error: &MarketError) {
        println!("{}", error.user_message());
    }

    fn show_reconciliation(&mut self, report: &Reconciliation, stats: &MatchingStats) {
        print!("{}", render_reconciliation(report));
        println!(
            "Quotes: {} | Rested: {} | Bot fills: {} | Your fills: {} | Rejected: {}",
            stats.quotes_submitted,
            stats.quotes_rested,
            stats.generator_fills,
            stats.player_fills,
            stats.rejected_actions
        );
    }
}

/// Books side by side: offers stacked on top of bids, best prices meeting
/// in the middle, blank rows padding each side out to `depth`.
pub fn render_books(books: &[BookSnapshot], depth: usize) -> String {
    let mut out = String::new();

    for book in books {
        let _ = write!(out, "{:<width$}", format!("{} ('{}')", book.name, book.label), width = COLUMN_WIDTH);
    }
    out.push('\n');
    for _ in books {
        let _ = write!(out, "{:<width$}", "-".repeat(15), width = COLUMN_WIDTH);
    }
    out.push('\n');

    for row in 0..depth {
        for book in books {
            let pad = depth.saturating_sub(book.offers.len());
            let cell = row
                .checked_sub(pad)
                .and_then(|i| book.offers.get(i))
                .map(|p| format!("{:.0}", p))
                .unwrap_or_default();
            let _ = write!(out, "{:<width$}", format!("      | {}", cell), width = COLUMN_WIDTH);
        }
        out.push('\n');
    }

    for row in 0..depth {
        for book in books {
            let cell = book
                .bids
                .get(row)
                .map(|p| format!("{:.0}", p))
                .unwrap_or_default();
            let _ = write!(out, "{:<width$}", format!("{:>5} |", cell), width = COLUMN_WIDTH);
        }
        out.push('\n');
    }

    for book in books {
        let cell = match book.spread {
            Some(spread) => format!("spread {:.0}", spread),
            None => "spread -".to_string(),
        };
        let _ = write!(out, "{:<width$}", cell, width = COLUMN_WIDTH);
    }
    out.push('\n');

    out
}

pub fn render_reconciliation(report: &Reconciliation) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "=".repeat(60));
    for r in &report.instruments {
        let trades: Vec<String> = r.trades.iter().map(|t| format!("{:.0}", t)).collect();
        let _ = writeln!(out, "{} ('{}')", r.name, r.label);
        let _ = writeln!(out, "  Position:    {}", r.position);
        let _ = writeln!(out, "  Trades:      [{}]", trades.join(", "));
        let _ = writeln!(out, "  Settles:     {:.2}", r.settlement);
        let _ = writeln!(out, "  Market Theo: {:.2}", r.theo);
        let _ = writeln!(out, "  PnL:         $ {:.2}", r.pnl);
    }
    let _ = writeln!(out, "Total PnL: $ {:.2}", report.total_pnl);
    out
}
