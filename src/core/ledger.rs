// Trade ledger and mark-to-settlement reconciliation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

use crate::core::instrument::Instrument;
use crate::core::types::{round2, Trade};
use crate::error::{MarketError, MarketResult};

/// Trades for one instrument, in execution order
#[derive(Debug, Clone, Default)]
pub struct LedgerEntry {
    pub label: String,
    trades: Vec<Trade>,
}

impl LedgerEntry {
    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Net units held: +1 per buy, -1 per sell
    pub fn position(&self) -> i64 {
        self.trades.iter().map(|t| t.direction.sign()).sum()
    }

    /// Net cash paid across all trades
    pub fn trade_sum(&self) -> f64 {
        self.trades.iter().map(Trade::signed_value).sum()
    }

    pub fn pnl(&self, settlement: f64) -> f64 {
        round2(settlement * self.position() as f64 - self.trade_sum())
    }
}

/// Append-only record of player fills
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
    index: HashMap<String, usize>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger with an entry for each instrument
    pub fn for_instruments(instruments: &[Instrument]) -> Self {
        let mut ledger = Self::new();
        for instrument in instruments {
            ledger.register(&instrument.label);
        }
        ledger
    }

    /// Open an entry for `label`. Registering twice is a no-op.
    pub fn register(&mut self, label: &str) {
        if self.index.contains_key(label) {
            return;
        }
        self.index.insert(label.to_string(), self.entries.len());
        self.entries.push(LedgerEntry {
            label: label.to_string(),
            trades: Vec::new(),
        });
    }

    pub fn record(&mut self, trade: Trade) -> MarketResult<()> {
        let idx = *self
            .index
            .get(&trade.label)
            .ok_or_else(|| MarketError::UnknownInstrument(trade.label.clone()))?;
        self.entries[idx].trades.push(trade);
        Ok(())
    }

    pub fn entry(&self, label: &str) -> Option<&LedgerEntry> {
        self.index.get(label).map(|&idx| &self.entries[idx])
    }

    pub fn position(&self, label: &str) -> i64 {
        self.entry(label).map(LedgerEntry::position).unwrap_or(0)
    }

    pub fn trade_count(&self) -> usize {
        self.entries.iter().map(|e| e.trades.len()).sum()
    }

    /// Value every position at its instrument's settlement. Read-only.
    pub fn reconcile(&self, instruments: &[Instrument]) -> Reconciliation {
        let results: Vec<InstrumentResult> = instruments
            .iter()
            .map(|instrument| {
                let (position, trades, pnl) = match self.entry(&instrument.label) {
                    Some(entry) => (
                        entry.position(),
                        entry.trades.iter().map(Trade::signed_value).collect(),
                        entry.pnl(instrument.settlement),
                    ),
                    None => (0, Vec::new(), 0.0),
                };
                InstrumentResult {
                    name: instrument.name.clone(),
                    label: instrument.label.clone(),
                    position,
                    trades,
                    settlement: instrument.settlement,
                    theo: instrument.theo,
                    pnl,
                }
            })
            .collect();

        let total_pnl = round2(results.iter().map(|r| r.pnl).sum());
        info!("💰 Reconciled {} instruments, total PnL ${:.2}", results.len(), total_pnl);

        Reconciliation {
            instruments: results,
            total_pnl,
        }
    }
}

/// Per-instrument reconciliation line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentResult {
    pub name: String,
    pub label: String,
    pub position: i64,
    /// Signed trade values in execution order
    pub trades: Vec<f64>,
    pub settlement: f64,
    pub theo: f64,
    pub pnl: f64,
}

/// End-of-session report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub instruments: Vec<InstrumentResult>,
    pub total_pnl: f64,
}

impl Reconciliation {
    pub fn get(&self, label: &str) -> Option<&InstrumentResult> {
        self.instruments.iter().find(|r| r.label == label)
    }
}
