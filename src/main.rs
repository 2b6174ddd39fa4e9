//! Table server binary.
//!
//! Listens on `--bind`, falling back to BIND_ADDR and then 127.0.0.1:10001.
use clap::Parser;
use riichi_host::DEFAULT_BIND;
use riichi_host::MAX_ROUNDS;
use riichi_host::gameroom::TimerConfig;
use riichi_host::hosting::Config;
use riichi_host::hosting::Server;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long, help = "Listen address")]
    bind: Option<String>,
    #[arg(long, help = "Seed for a reproducible game")]
    seed: Option<u64>,
    #[arg(long, default_value_t = MAX_ROUNDS, help = "Rounds before the game ends")]
    max_rounds: u32,
    #[arg(long, help = "Call window for the client in milliseconds, 0 waits forever")]
    decision_ms: Option<u64>,
    #[arg(long, default_value_t = 0, help = "Pause between automated steps in milliseconds")]
    pacing_ms: u64,
    #[arg(long, help = "Directory for finished round records")]
    records: Option<PathBuf>,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        let defaults = TimerConfig::default();
        let decision = match args.decision_ms {
            Some(0) => None,
            Some(ms) => Some(Duration::from_millis(ms)),
            None => defaults.decision,
        };
        Self {
            bind: args
                .bind
                .or_else(|| std::env::var("BIND_ADDR").ok())
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            seed: args.seed,
            max_rounds: args.max_rounds,
            timer: TimerConfig {
                decision,
                pacing: Duration::from_millis(args.pacing_ms),
                ..defaults
            },
            records: args.records,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    riichi_host::log();
    riichi_host::kys();
    let config = Config::from(Args::parse());
    if let Some(dir) = &config.records {
        std::fs::create_dir_all(dir)?;
    }
    Server::run(config).await
}
