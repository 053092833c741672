// Collaborators at the edge of the simulator: where actions come from
// and where the board goes

pub mod console_display;
pub mod console_input;
pub mod scripted;

use std::time::Duration;

use crate::core::ledger::Reconciliation;
use crate::core::types::PlayerAction;
use crate::error::{MarketError, MarketResult};
use crate::simulation::matching_engine::{MarketEvent, MatchingStats};
use crate::simulation::order_book::BookSnapshot;

pub use console_display::ConsoleDisplay;
pub use console_input::ConsoleInput;
pub use scripted::{RecordingDisplay, ScriptedInput};

/// A well-formed `(action, label)` pair. The label may still be unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub action: PlayerAction,
    pub label: String,
}

/// Outcome of one input window
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Window closed with nothing submitted
    Timeout,
    /// Parsed actions in submission order, plus tokens that failed to parse
    Actions {
        actions: Vec<ActionRequest>,
        rejected: Vec<String>,
    },
    /// Player asked to end the session
    End,
}

/// Source of player actions. Each call waits at most `timeout`.
#[allow(async_fn_in_trait)]
pub trait InputSource {
    async fn request_actions(&mut self, timeout: Duration) -> MarketResult<InputEvent>;
}

/// Observer of the market. Never feeds back into the engine.
pub trait DisplaySink {
    fn on_event(&mut self, event: &MarketEvent);
    fn show_books(&mut self, tick: usize, books: &[BookSnapshot]);
    fn show_error(&mut self, error: &MarketError);
    fn show_reconciliation(&mut self, report: &Reconciliation, stats: &MatchingStats);
}

/// Parse one line of player input.
///
/// Tokens are whitespace separated. `q` or `quit` ends the session; every
/// other token must be `h` or `l` followed by a one-character label.
pub fn parse_line(line: &str) -> InputEvent {
    let mut actions = Vec::new();
    let mut rejected = Vec::new();

    for token in line.split_whitespace() {
        if token == "q" || token == "quit" {
            return InputEvent::End;
        }
        match parse_token(token) {
            Some(request) => actions.push(request),
            None => rejected.push(token.to_string()),
        }
    }

    if actions.is_empty() && rejected.is_empty() {
        InputEvent::Timeout
    } else {
        InputEvent::Actions { actions, rejected }
    }
}

fn parse_token(token: &str) -> Option<ActionRequest> {
    let mut chars = token.chars();
    let action = PlayerAction::from_char(chars.next()?)?;
    let label = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some(ActionRequest {
        action,
        label: label.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_multiple_tokens() {
        let event = parse_line("ha lb");
        assert_eq!(
            event,
            InputEvent::Actions {
                actions: vec![
                    ActionRequest { action: PlayerAction::Hit, label: "a".into() },
                    ActionRequest { action: PlayerAction::Lift, label: "b".into() },
                ],
                rejected: vec![],
            }
        );
    }

    #[test]
    fn test_parse_filters_malformed_tokens() {
        match parse_line("xa h hab lz") {
            InputEvent::Actions { actions, rejected } => {
                // Unknown labels parse fine; the engine rejects them later
                assert_eq!(actions, vec![ActionRequest { action: PlayerAction::Lift, label: "z".into() }]);
                assert_eq!(rejected, vec!["xa", "h", "hab"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_blank_and_quit() {
        assert_eq!(parse_line("   "), InputEvent::Timeout);
        assert_eq!(parse_line("ha q"), InputEvent::End);
        assert_eq!(parse_line("quit"), InputEvent::End);
    }
}
