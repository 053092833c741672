// Market Session
// Tick loop tying quote generation, matching, player input and settlement together

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;
use tracing::{debug, info};

use crate::clients::{ActionRequest, DisplaySink, InputEvent, InputSource};
use crate::config::SessionConfig;
use crate::core::instrument::Instrument;
use crate::core::ledger::{Ledger, Reconciliation};
use crate::core::price_model::PriceModel;
use crate::core::quote_generator::QuoteGenerator;
use crate::core::types::{PlayerAction, Trade};
use crate::error::{MarketError, MarketResult};
use crate::simulation::matching_engine::{MarketEvent, MatchingEngine, MatchingStats};
use crate::simulation::order_book::BookSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Running { tick: usize },
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WindowOutcome {
    Continue { traded: bool },
    End,
}

/// One game: owns the instruments, the ledger and the session clock
pub struct MarketSession {
    config: SessionConfig,
    instruments: Vec<Instrument>,
    ledger: Ledger,
    engine: MatchingEngine,
    generator: QuoteGenerator,
    model: PriceModel,
    rng: StdRng,
    state: SessionState,
    reconciliation: Option<Reconciliation>,
}

impl MarketSession {
    /// Validate the config and draw every instrument's theo and settlement
    pub fn new(config: SessionConfig) -> MarketResult<Self> {
        config.validate()?;

        let mut rng = match config.market.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let model = PriceModel::new(&config.market);
        let instruments = Instrument::build_all(
            &config.instruments,
            &model,
            config.market.max_depth,
            &mut rng,
        )?;

        Ok(Self::assemble(config, instruments, model, rng))
    }

    /// Session over instruments built elsewhere, e.g. with fixed values
    pub fn with_instruments(config: SessionConfig, instruments: Vec<Instrument>) -> Self {
        let rng = match config.market.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let model = PriceModel::new(&config.market);
        Self::assemble(config, instruments, model, rng)
    }

    fn assemble(
        config: SessionConfig,
        instruments: Vec<Instrument>,
        model: PriceModel,
        rng: StdRng,
    ) -> Self {
        info!(
            "📖 New session: {} instruments, {} ticks, cross prob {:.2}",
            instruments.len(),
            config.market.ticks,
            config.market.cross_prob
        );
        for i in &instruments {
            debug!("{} ('{}'): theo {:.2}, settles {:.2}", i.name, i.label, i.theo, i.settlement);
        }

        Self {
            ledger: Ledger::for_instruments(&instruments),
            engine: MatchingEngine::new(),
            generator: QuoteGenerator::new(config.market.cross_prob),
            state: SessionState::Running { tick: 0 },
            reconciliation: None,
            config,
            instruments,
            model,
            rng,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn instrument(&self, label: &str) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.label == label)
    }

    /// Mutable access for seeding books before play
    pub fn instrument_mut(&mut self, label: &str) -> Option<&mut Instrument> {
        self.instruments.iter_mut().find(|i| i.label == label)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn stats(&self) -> &MatchingStats {
        self.engine.stats()
    }

    fn current_tick(&self) -> MarketResult<usize> {
        match self.state {
            SessionState::Running { tick } => Ok(tick),
            SessionState::Settled => Err(MarketError::SessionSettled),
        }
    }

    /// Quote a random subset of instruments and submit each quote
    pub fn generate_quotes(&mut self) -> MarketResult<Vec<MarketEvent>> {
        let tick = self.current_tick()?;
        let volatility = self.model.volatility_at(tick);
        debug!("📈 Tick {}/{}: volatility {:.2}", tick + 1, self.config.market.ticks, volatility);

        let picks = self.generator.select_instruments(&mut self.rng, self.instruments.len());
        let mut events = Vec::new();
        for idx in picks {
            let (label, theo) = {
                let instrument = &self.instruments[idx];
                (instrument.label.clone(), instrument.theo)
            };
            let quote = self.generator.generate(&mut self.rng, &label, theo, volatility);
            let outcome = self.engine.route_quote(&quote, &mut self.instruments)?;
            events.extend(MarketEvent::from_outcome(&label, outcome));
        }
        Ok(events)
    }

    /// Player hit/lift against the named instrument
    pub fn execute(&mut self, action: PlayerAction, label: &str) -> MarketResult<Trade> {
        let tick = match self.current_tick() {
            Ok(tick) => tick,
            Err(e) => {
                self.engine.note_rejected();
                return Err(e);
            }
        };
        self.engine
            .execute(action, label, tick, &mut self.instruments, &mut self.ledger)
    }

    /// Apply requests in order; one failure does not stop the rest
    pub fn apply_actions(&mut self, actions: &[ActionRequest]) -> Vec<MarketResult<Trade>> {
        actions
            .iter()
            .map(|request| self.execute(request.action, &request.label))
            .collect()
    }

    pub fn snapshots(&self) -> Vec<BookSnapshot> {
        self.instruments
            .iter()
            .map(|i| i.book.snapshot(&i.label, &i.name))
            .collect()
    }

    /// Move to the next tick, settling after the last one
    pub fn advance(&mut self) {
        if let SessionState::Running { tick } = self.state {
            let next = tick + 1;
            if next >= self.config.market.ticks {
                self.settle();
            } else {
                self.state = SessionState::Running { tick: next };
            }
        }
    }

    /// Enter `Settled` and reconcile. Later calls return the same report.
    pub fn settle(&mut self) -> &Reconciliation {
        self.state = SessionState::Settled;
        let ledger = &self.ledger;
        let instruments = &self.instruments;
        self.reconciliation
            .get_or_insert_with(|| ledger.reconcile(instruments))
    }

    pub fn reconciliation(&self) -> Option<&Reconciliation> {
        self.reconciliation.as_ref()
    }

    /// Play the session to the end, or until the input asks to stop
    pub async fn run<I, D>(&mut self, input: &mut I, display: &mut D) -> MarketResult<Reconciliation>
    where
        I: InputSource,
        D: DisplaySink,
    {
        while let SessionState::Running { tick } = self.state {
            for event in self.generate_quotes()? {
                display.on_event(&event);
            }

            let window = self.config.timing.action_window();
            if self.window(input, display, window).await? == WindowOutcome::End {
                info!("🛑 Session ended by player at tick {}", tick + 1);
                break;
            }
            display.show_books(tick, &self.snapshots());

            let review = self.config.timing.review_window(&mut self.rng);
            match self.window(input, display, review).await? {
                WindowOutcome::End => {
                    info!("🛑 Session ended by player at tick {}", tick + 1);
                    break;
                }
                WindowOutcome::Continue { traded: true } => {
                    display.show_books(tick, &self.snapshots());
                }
                WindowOutcome::Continue { traded: false } => {}
            }

            self.advance();
        }

        let report = self.settle().clone();
        display.show_reconciliation(&report, self.engine.stats());
        Ok(report)
    }

    /// One bounded wait for input, applying whatever arrives
    async fn window<I, D>(
        &mut self,
        input: &mut I,
        display: &mut D,
        timeout: Duration,
    ) -> MarketResult<WindowOutcome>
    where
        I: InputSource,
        D: DisplaySink,
    {
        match input.request_actions(timeout).await? {
            InputEvent::Timeout => Ok(WindowOutcome::Continue { traded: false }),
            InputEvent::End => Ok(WindowOutcome::End),
            InputEvent::Actions { actions, rejected } => {
                for token in rejected {
                    self.engine.note_rejected();
                    display.show_error(&MarketError::InvalidAction(token));
                }

                let mut traded = false;
                for result in self.apply_actions(&actions) {
                    match result {
                        Ok(trade) => {
                            traded = true;
                            display.on_event(&MarketEvent::PlayerFilled(trade));
                        }
                        Err(e) if e.is_recoverable() => display.show_error(&e),
                        Err(e) => return Err(e),
                    }
                }
                Ok(WindowOutcome::Continue { traded })
            }
        }
    }
}
