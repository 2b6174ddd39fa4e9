//! Single-table riichi mahjong session server.
//!
//! One remote client plays against three automated opponents over a
//! NUL-separated, tag-based text protocol. The crate is organised leaf-first:
//!
//! - [`tiles`]: tile identities, hands, the seeded deck and seat rotation
//! - [`protocol`]: wire codec, framing, and the typed inbound/outbound catalogue
//! - [`table`]: per-round player state, round info, and call arbitration
//! - [`gameroom`]: message exchange router, turn engine, and the dealer task
//! - [`hosting`]: session loop and the single-connection TCP server
pub mod gameroom;
pub mod hosting;
pub mod protocol;
pub mod table;
pub mod tiles;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Playing position around the table for one round (0..4, rotation order).
pub type Seat = usize;
/// Stable identity of a participant across rounds (0 = remote client).
pub type Participant = usize;
/// Score and stick values.
pub type Points = i32;

// ============================================================================
// TABLE PARAMETERS
// ============================================================================
/// Number of seats at the table.
pub const N: usize = 4;
/// Participant index of the remote client.
pub const CLIENT: Participant = 0;
/// Physical tiles in a full set.
pub const TILES: usize = 136;
/// Distinct tile kinds.
pub const KINDS: usize = 34;
/// Concealed tiles dealt to each seat.
pub const HAND: usize = 13;
/// Rounds played before the game ends.
pub const MAX_ROUNDS: u32 = 8;
/// Cap on revealed bonus indicators (initial + four kan reveals).
pub const MAX_INDICATORS: usize = 5;
/// Starting score per seat.
pub const STARTING_POINTS: Points = 25000;
/// Deposit for a riichi declaration.
pub const RIICHI_DEPOSIT: Points = 1000;
/// Default listen address when neither flag nor environment provides one.
pub const DEFAULT_BIND: &str = "127.0.0.1:10001";
/// Wire frame separator.
pub const FRAME_SEPARATOR: u8 = 0;

// ============================================================================
// IDENTITY TYPES
// ============================================================================
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Generic ID wrapper providing compile-time type safety over uuid::Uuid.
pub struct ID<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

impl<T> serde::Serialize for ID<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.inner.serialize(serializer)
    }
}

// ============================================================================
// RUNTIME UTILITIES
// ============================================================================
/// Initialize dual logging (terminal + file) with timestamped log files.
/// Creates `logs/` directory and writes DEBUG level to file, INFO to terminal.
pub fn log() {
    std::fs::create_dir_all("logs").expect("create logs directory");
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves slow")
        .as_secs();
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        std::fs::File::create(format!("logs/{}.log", time)).expect("create log file"),
    );
    let term = simplelog::TermLogger::new(
        log::LevelFilter::Info,
        config.clone(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).expect("initialize logger");
}

/// Register Ctrl+C handler for immediate (non-graceful) termination.
pub fn kys() {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!();
            log::warn!("violent interrupt received, exiting immediately");
            std::process::exit(0);
        }
    });
}
