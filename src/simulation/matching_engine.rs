// Matching Engine
// Routes generated quotes into books and executes player actions

use serde::Serialize;
use tracing::{debug, info};

use crate::core::instrument::Instrument;
use crate::core::ledger::Ledger;
use crate::core::types::{PlayerAction, Quote, Side, Trade};
use crate::error::{MarketError, MarketResult};
use crate::simulation::order_book::SubmitOutcome;

/// Something the display should hear about
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum MarketEvent {
    QuoteRested { label: String, side: Side, price: f64 },
    Evicted { label: String, side: Side, price: f64 },
    OfferLifted { label: String, price: f64 },
    BidHit { label: String, price: f64 },
    PlayerFilled(Trade),
}

impl MarketEvent {
    /// Events describing one submit outcome
    pub fn from_outcome(label: &str, outcome: SubmitOutcome) -> Vec<MarketEvent> {
        let label = label.to_string();
        match outcome {
            SubmitOutcome::Lifted { price } => vec![MarketEvent::OfferLifted { label, price }],
            SubmitOutcome::Hit { price } => vec![MarketEvent::BidHit { label, price }],
            SubmitOutcome::Rested { side, price, evicted } => {
                let mut events = vec![MarketEvent::QuoteRested { label: label.clone(), side, price }];
                if let Some(worst) = evicted {
                    events.push(MarketEvent::Evicted { label, side, price: worst });
                }
                events
            }
        }
    }
}

/// Counters for the session summary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchingStats {
    pub quotes_submitted: u64,
    pub quotes_rested: u64,
    pub evictions: u64,
    pub generator_fills: u64,
    pub player_fills: u64,
    pub rejected_actions: u64,
}

#[derive(Debug, Clone, Default)]
pub struct MatchingEngine {
    stats: MatchingStats,
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Submit a generated quote to the instrument it names.
    /// Generator fills thin the book but never reach the ledger.
    pub fn route_quote(
        &mut self,
        quote: &Quote,
        instruments: &mut [Instrument],
    ) -> MarketResult<SubmitOutcome> {
        let instrument = find_mut(instruments, &quote.label)?;
        let outcome = instrument.book.submit(quote);

        self.stats.quotes_submitted += 1;
        match outcome {
            SubmitOutcome::Rested { evicted, .. } => {
                self.stats.quotes_rested += 1;
                if evicted.is_some() {
                    self.stats.evictions += 1;
                }
                debug!("📥 {} rested", quote);
            }
            SubmitOutcome::Lifted { price } => {
                self.stats.generator_fills += 1;
                debug!("⚡ {}: {} Offer lifted by {}", instrument.name, price, quote);
            }
            SubmitOutcome::Hit { price } => {
                self.stats.generator_fills += 1;
                debug!("⚡ {}: {} Bid hit by {}", instrument.name, price, quote);
            }
        }

        Ok(outcome)
    }

    /// Take the best opposing price for the player and book the trade
    pub fn execute(
        &mut self,
        action: PlayerAction,
        label: &str,
        tick: usize,
        instruments: &mut [Instrument],
        ledger: &mut Ledger,
    ) -> MarketResult<Trade> {
        let result = execute_on(action, label, tick, instruments, ledger);
        match &result {
            Ok(trade) => {
                self.stats.player_fills += 1;
                info!("🤝 {:?} {} @ {}", trade.direction, trade.label, trade.price);
            }
            Err(e) => {
                self.stats.rejected_actions += 1;
                debug!("⚠️  {} {} rejected: {}", action, label, e);
            }
        }
        result
    }

    /// Count an action that never reached a book (bad token, settled session)
    pub fn note_rejected(&mut self) {
        self.stats.rejected_actions += 1;
    }

    pub fn stats(&self) -> &MatchingStats {
        &self.stats
    }
}

fn execute_on(
    action: PlayerAction,
    label: &str,
    tick: usize,
    instruments: &mut [Instrument],
    ledger: &mut Ledger,
) -> MarketResult<Trade> {
    let instrument = find_mut(instruments, label)?;
    if ledger.entry(label).is_none() {
        return Err(MarketError::UnknownInstrument(label.to_string()));
    }

    let price = match action {
        PlayerAction::Hit => instrument.book.take_best_bid(),
        PlayerAction::Lift => instrument.book.take_best_offer(),
    }
    .ok_or_else(|| MarketError::NoLiquidity {
        label: label.to_string(),
        action,
    })?;

    let trade = Trade::new(label, action.direction(), price, tick);
    ledger.record(trade.clone())?;
    Ok(trade)
}

fn find_mut<'a>(instruments: &'a mut [Instrument], label: &str) -> MarketResult<&'a mut Instrument> {
    instruments
        .iter_mut()
        .find(|i| i.label == label)
        .ok_or_else(|| MarketError::UnknownInstrument(label.to_string()))
}
