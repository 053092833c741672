// Session command implementations
use std::path::Path;
use tracing::info;

use mock_market::{
    ConsoleDisplay, ConsoleInput, Difficulty, MarketResult, MarketSession, Reconciliation,
    ScriptedInput, SessionConfig, TimingConfig,
};

/// Load the config file (defaults if missing) and apply command-line overrides
fn load_config(
    path: &str,
    ticks: Option<usize>,
    seed: Option<u64>,
) -> MarketResult<SessionConfig> {
    let mut config = SessionConfig::load_or_default(path)?;
    if let Some(t) = ticks {
        config.market.ticks = t;
    }
    if seed.is_some() {
        config.market.seed = seed;
    }
    config.validate()?;
    Ok(config)
}

pub fn init(path: &str, force: bool) -> MarketResult<()> {
    if Path::new(path).exists() && !force {
        println!("⚠️  {} already exists, use --force to overwrite", path);
        return Ok(());
    }
    SessionConfig::default().to_file(path)?;
    println!("📝 Created {}", path);
    Ok(())
}

pub fn show_config(path: &str) -> MarketResult<()> {
    let config = load_config(path, None, None)?;
    let rendered = toml::to_string_pretty(&config)
        .map_err(|e| mock_market::ConfigError::Serialize(e.to_string()))?;
    println!("{}", rendered);
    Ok(())
}

pub async fn play(
    path: &str,
    difficulty: Option<Difficulty>,
    ticks: Option<usize>,
    seed: Option<u64>,
    json: bool,
) -> MarketResult<()> {
    let mut config = load_config(path, ticks, seed)?;
    if let Some(d) = difficulty {
        config.timing.difficulty = d;
    }

    print_instructions(&config);
    info!("🎮 Playing {} ticks on {}", config.market.ticks, config.timing.difficulty);

    let mut display = ConsoleDisplay::new(config.market.max_depth);
    let mut session = MarketSession::new(config)?;
    let mut input = ConsoleInput::new();
    let report = session.run(&mut input, &mut display).await?;

    print_json(&report, json)
}

pub async fn watch(
    path: &str,
    ticks: Option<usize>,
    seed: Option<u64>,
    json: bool,
    quiet: bool,
) -> MarketResult<()> {
    let mut config = load_config(path, ticks, seed)?;
    config.timing = TimingConfig::instant();

    let mut display = ConsoleDisplay::new(config.market.max_depth);
    if quiet {
        display = display.quiet();
    }
    let mut session = MarketSession::new(config)?;
    let mut input = ScriptedInput::idle();
    let report = session.run(&mut input, &mut display).await?;

    print_json(&report, json)
}

fn print_instructions(config: &SessionConfig) {
    println!("Books:");
    for spec in &config.instruments {
        println!("  '{}'  {}", spec.label, spec.name);
    }
    println!("Type h<label> to hit the bid, l<label> to lift the offer, q to quit.");
    println!("Several actions can go on one line, e.g. `ha lb`. Press Enter to send.");
    println!();
}

fn print_json(report: &Reconciliation, json: bool) -> MarketResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    }
    Ok(())
}
