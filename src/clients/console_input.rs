// Timed stdin reader

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::debug;

use super::{parse_line, InputEvent, InputSource};
use crate::error::MarketResult;

/// Reads one line per window from stdin, giving up when the window closes.
/// A line typed after the window closes is picked up by the next window.
pub struct ConsoleInput {
    lines: Lines<BufReader<Stdin>>,
}

impl ConsoleInput {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for ConsoleInput {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSource for ConsoleInput {
    async fn request_actions(&mut self, timeout: Duration) -> MarketResult<InputEvent> {
        match tokio::time::timeout(timeout, self.lines.next_line()).await {
            Err(_elapsed) => Ok(InputEvent::Timeout),
            Ok(Ok(Some(line))) => {
                debug!("⌨️  input: {:?}", line);
                Ok(parse_line(&line))
            }
            // stdin closed
            Ok(Ok(None)) => Ok(InputEvent::End),
            Ok(Err(e)) => Err(e.into()),
        }
    }
}
