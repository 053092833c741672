// Core market model: prices, quotes, instruments and the ledger

pub mod types;
pub mod price_model;
pub mod quote_generator;
pub mod instrument;
pub mod ledger;

// Re-export commonly used types
pub use types::{Side, Direction, PlayerAction, Quote, Trade};
pub use price_model::{PriceModel, decayed_volatility};
pub use quote_generator::{QuoteGenerator, assign_side};
pub use instrument::{Instrument, InstrumentKind, InstrumentSpec};
pub use ledger::{Ledger, Reconciliation, InstrumentResult};
