//! Per-round table state and call arbitration.
mod arbiter;
mod call;
mod info;
mod pending;
mod player;
mod round;

pub use arbiter::*;
pub use call::*;
pub use info::*;
pub use pending::*;
pub use player::*;
pub use round::*;
