// Non-interactive collaborators for headless runs and tests

use std::collections::VecDeque;
use std::time::Duration;

use super::{parse_line, DisplaySink, InputEvent, InputSource};
use crate::core::ledger::Reconciliation;
use crate::error::{MarketError, MarketResult};
use crate::simulation::matching_engine::{MarketEvent, MatchingStats};
use crate::simulation::order_book::BookSnapshot;

/// Replays canned input lines, one per window, without waiting.
/// An empty line is a timeout; once the script runs out every window times out.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
    windows_seen: usize,
}

impl ScriptedInput {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            windows_seen: 0,
        }
    }

    /// Input that never acts
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn windows_seen(&self) -> usize {
        self.windows_seen
    }
}

impl InputSource for ScriptedInput {
    async fn request_actions(&mut self, _timeout: Duration) -> MarketResult<InputEvent> {
        self.windows_seen += 1;
        Ok(match self.lines.pop_front() {
            Some(line) => parse_line(&line),
            None => InputEvent::Timeout,
        })
    }
}

/// Keeps everything it is shown
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub events: Vec<MarketEvent>,
    pub boards: Vec<(usize, Vec<BookSnapshot>)>,
    pub errors: Vec<String>,
    pub report: Option<(Reconciliation, MatchingStats)>,
    pub reconciliations_shown: usize,
}

impl DisplaySink for RecordingDisplay {
    fn on_event(&mut self, event: &MarketEvent) {
        self.events.push(event.clone());
    }

    fn show_books(&mut self, tick: usize, books: &[BookSnapshot]) {
        self.boards.push((tick, books.to_vec()));
    }

    fn show_error(&mut self, error: &MarketError) {
        self.errors.push(error.to_string());
    }

    fn show_reconciliation(&mut self, report: &Reconciliation, stats: &MatchingStats) {
        self.reconciliations_shown += 1;
        self.report = Some((report.clone(), stats.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_script_then_timeouts() {
        let mut input = ScriptedInput::new(["ha", "", "q"]);
        let wait = Duration::from_millis(10);

        assert!(matches!(input.request_actions(wait).await.unwrap(), InputEvent::Actions { .. }));
        assert_eq!(input.request_actions(wait).await.unwrap(), InputEvent::Timeout);
        assert_eq!(input.request_actions(wait).await.unwrap(), InputEvent::End);
        assert_eq!(input.request_actions(wait).await.unwrap(), InputEvent::Timeout);
        assert_eq!(input.windows_seen(), 4);
    }
}
