//! Tile identities, hands, and the per-round deck and seat rotation.
mod deck;
mod evaluator;
mod hand;
mod tile;

pub use deck::*;
pub use evaluator::*;
pub use hand::*;
pub use tile::*;
