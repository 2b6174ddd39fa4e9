use crate::gameroom::*;
use crate::table::CallSet;
use crate::table::Claim;
use crate::table::Player;
use crate::tiles::Tile;

/// Discards whatever it draws and passes on everything else.
/// Fully deterministic, which makes it the opponent of choice in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tsumogiri;

impl Opponent for Tsumogiri {
    fn play(&mut self, me: &Player, _: Options) -> Move {
        me.drawn()
            .or_else(|| me.hand().tiles().first().copied())
            .map(Move::Discard)
            .expect("a seat on turn always holds a tile")
    }
    fn claim(&mut self, _: &Player, _: Tile, _: CallSet) -> Claim {
        Claim::Decline
    }
}
