// Common test utilities and helpers
#![allow(dead_code)]

use mock_market::{
    Instrument, InstrumentKind, OrderBook, SessionConfig, TimingConfig,
};
use tempfile::TempDir;
use std::path::PathBuf;

/// Default instruments, fixed seed, no waiting between windows
pub fn create_test_config(ticks: usize, seed: u64) -> SessionConfig {
    let mut config = SessionConfig::default();
    config.market.ticks = ticks;
    config.market.seed = Some(seed);
    config.timing = TimingConfig::instant();
    config
}

/// Create a temporary directory for config files
pub fn create_temp_config_path() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("mock-market.toml");
    (temp_dir, path)
}

/// A future with known values and a hand-built book
pub fn fixed_future(
    label: &str,
    theo: f64,
    settlement: f64,
    bids: &[f64],
    offers: &[f64],
) -> Instrument {
    let mut instrument = Instrument::new(
        format!("Future {}", label.to_uppercase()),
        label,
        InstrumentKind::Future { theo_min: theo, theo_max: theo },
        theo,
        settlement,
        5,
    );
    instrument.book = OrderBook::from_levels(bids, offers, 5);
    instrument
}

/// Assert every book in the slice is uncrossed and within its depth cap
pub fn assert_books_valid(instruments: &[Instrument]) {
    for instrument in instruments {
        if let Err(e) = instrument.book.validate() {
            panic!("book {} invalid: {}", instrument.label, e);
        }
    }
}
