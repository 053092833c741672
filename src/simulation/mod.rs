// Simulation Module
// Order books, matching and the session loop that drives them

pub mod order_book;
pub mod matching_engine;
pub mod market_session;

pub use order_book::{OrderBook, BookSnapshot, SubmitOutcome};
pub use matching_engine::{MatchingEngine, MarketEvent, MatchingStats};
pub use market_session::{MarketSession, SessionState};
