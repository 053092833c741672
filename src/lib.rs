// Mock Market Library
//
// A two-sided market simulator for practising market making: a bot quotes
// around a hidden fair value, the player hits bids and lifts offers, and the
// ledger settles everything at the end.

pub mod core;
pub mod clients;
pub mod config;
pub mod error;
pub mod simulation;

// Re-export core market types
pub use crate::core::{
    Side, Direction, PlayerAction, Quote, Trade,
    PriceModel, QuoteGenerator, Instrument, InstrumentKind, InstrumentSpec,
    Ledger, Reconciliation, InstrumentResult,
};

// Re-export error types
pub use error::{MarketError, MarketResult};

// Re-export configuration
pub use config::{SessionConfig, MarketConfig, TimingConfig, Difficulty, ConfigError};

// Re-export simulation components
pub use simulation::{
    OrderBook, BookSnapshot, SubmitOutcome,
    MatchingEngine, MarketEvent, MatchingStats,
    MarketSession, SessionState,
};

// Re-export collaborators
pub use clients::{
    InputSource, DisplaySink, InputEvent, ActionRequest,
    ConsoleInput, ConsoleDisplay, ScriptedInput, RecordingDisplay,
};
