//! Live table coordination.
//!
//! The [`Engine`] owns the turn state machine and is only ever touched under
//! one lock. The [`Dealer`] task steps it and suspends on the [`Router`]
//! whenever the remote client owes a decision, while the session loop keeps
//! reading frames and delivering them. A [`Room`] ties these together across
//! reconnects.
mod dealer;
mod engine;
mod error;
mod player;
mod players;
mod records;
mod room;
mod router;
mod timer;

pub use dealer::*;
pub use engine::*;
pub use error::*;
pub use player::*;
pub use players::*;
pub use records::*;
pub use room::*;
pub use router::*;
pub use timer::*;
