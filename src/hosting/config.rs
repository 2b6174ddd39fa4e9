use crate::DEFAULT_BIND;
use crate::MAX_ROUNDS;
use crate::gameroom::*;
use crate::tiles::DeckError;
use std::path::PathBuf;

/// Everything needed to host one table.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    /// Makes the whole game reproducible when set.
    pub seed: Option<u64>,
    pub max_rounds: u32,
    pub timer: TimerConfig,
    /// Where finished round records are written, if anywhere.
    pub records: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            seed: None,
            max_rounds: MAX_ROUNDS,
            timer: TimerConfig::default(),
            records: None,
        }
    }
}

impl Config {
    pub fn room(&self) -> Result<Room, DeckError> {
        let engine = Engine::new(self.seed, self.max_rounds)?;
        log::info!(
            "[server] table {} seeded {:?}, {} rounds",
            engine.id(),
            self.seed,
            self.max_rounds
        );
        Ok(Room::new(engine, self.timer, self.records.clone()))
    }
}
