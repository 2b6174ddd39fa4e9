use crate::table::CallSet;
use crate::table::Claim;
use crate::table::Player;
use crate::tiles::Kind;
use crate::tiles::Tile;

/// What a seat does with its turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Discard(Tile),
    ClosedKan,
    Tsumo,
}

/// Self-draw options open to the seat this step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    pub tsumo: bool,
    pub closed_kan: Option<Kind>,
}

/// Decision policy for a seat the server drives itself.
///
/// Decisions are synchronous: the engine asks while holding the table, so an
/// automated seat never suspends a turn step. The same policy plays the
/// client's seat while it is disconnected.
pub trait Opponent: Send {
    /// Picks a move for the seat's own turn. The discard must be a concealed tile.
    fn play(&mut self, me: &Player, options: Options) -> Move;
    /// Answers a call window on another seat's discard.
    fn claim(&mut self, me: &Player, tile: Tile, offered: CallSet) -> Claim;
}
