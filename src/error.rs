//! Error handling for the market simulator
//!
//! Every player-facing failure is non-fatal: the session reports it and
//! moves on to the next window. Only configuration and console I/O errors
//! can stop the binary.

use std::io;
use thiserror::Error;

use crate::config::ConfigError;
use crate::core::types::PlayerAction;

/// Main error type for the market simulator
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("No liquidity to {action} on {label}")]
    NoLiquidity { label: String, action: PlayerAction },

    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("Session already settled")]
    SessionSettled,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Console I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),
}

impl MarketError {
    /// Short message suitable for the board, with a hint where one helps
    pub fn user_message(&self) -> String {
        match self {
            MarketError::InvalidAction(token) => {
                format!(
                    "Invalid action '{}'\n💡 Use h<label> to hit the bid or l<label> to lift the offer, q to quit",
                    token
                )
            }
            MarketError::NoLiquidity { label, action } => match action {
                PlayerAction::Hit => format!("No bids to hit on '{}'", label),
                PlayerAction::Lift => format!("No offers to lift on '{}'", label),
            },
            MarketError::UnknownInstrument(label) => {
                format!("No instrument labelled '{}'", label)
            }
            _ => self.to_string(),
        }
    }

    /// True for the errors a session swallows and keeps running after
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MarketError::InvalidAction(_)
                | MarketError::NoLiquidity { .. }
                | MarketError::UnknownInstrument(_)
        )
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            MarketError::InvalidAction(_) | MarketError::UnknownInstrument(_) => "input",
            MarketError::NoLiquidity { .. } => "liquidity",
            MarketError::SessionSettled => "session",
            MarketError::Config(_) => "config",
            MarketError::Io(_) | MarketError::Report(_) => "io",
        }
    }
}

/// Result type alias using MarketError
pub type MarketResult<T> = Result<T, MarketError>;
