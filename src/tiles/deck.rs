use super::*;
use crate::HAND;
use crate::N;
use crate::Seat;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use std::collections::VecDeque;

/// Failures of the per-round tile and seat sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckError {
    /// No tiles remain. A round-over trigger, not a fault.
    ExhaustedDeck,
    /// More than four seats were requested in one round.
    SeatsExhausted,
}

impl std::fmt::Display for DeckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExhaustedDeck => write!(f, "deck exhausted"),
            Self::SeatsExhausted => write!(f, "all seats allocated this round"),
        }
    }
}

impl std::error::Error for DeckError {}

/// The shuffled tile sequence for one round, consumed front-first.
#[derive(Debug, Clone)]
pub struct Deck {
    tiles: VecDeque<Tile>,
    last: Option<Tile>,
}

impl Deck {
    /// Shuffles the full set with the given generator.
    pub fn shuffled(rng: &mut SmallRng) -> Self {
        let mut tiles = Tile::universe().collect::<Vec<_>>();
        tiles.shuffle(rng);
        Self::from(tiles)
    }
    pub fn remaining(&self) -> usize {
        self.tiles.len()
    }
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
    /// Most recently drawn tile this round.
    pub fn last_drawn(&self) -> Option<Tile> {
        self.last
    }
    pub fn draw_next(&mut self) -> Result<Tile, DeckError> {
        let tile = self.tiles.pop_front().ok_or(DeckError::ExhaustedDeck)?;
        self.last = Some(tile);
        Ok(tile)
    }
    /// Thirteen tiles for each seat, dealt in seat order.
    pub fn deal_initial_hands(&mut self) -> Result<[Hand; N], DeckError> {
        let mut hands: [Hand; N] = Default::default();
        for hand in hands.iter_mut() {
            for _ in 0..HAND {
                hand.add(self.draw_next()?);
            }
        }
        Ok(hands)
    }
    /// Looks at the `n`th tile from the back without drawing it.
    /// Bonus indicators are read from here so they stay in the deck.
    pub fn peek_back(&self, n: usize) -> Option<Tile> {
        self.tiles.len().checked_sub(n + 1).map(|i| self.tiles[i])
    }
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }
}

impl From<Vec<Tile>> for Deck {
    fn from(tiles: Vec<Tile>) -> Self {
        Self {
            tiles: tiles.into(),
            last: None,
        }
    }
}

/// Rotating queue of seat numbers handed out to participants each round.
#[derive(Debug, Clone)]
pub struct SeatAllocator(VecDeque<Seat>);

impl SeatAllocator {
    /// Seats 0..4 rotated by a random offset.
    pub fn rotated(rng: &mut SmallRng) -> Self {
        let mut seats = (0..N).collect::<VecDeque<_>>();
        seats.rotate_right(rng.random_range(0..N));
        Self(seats)
    }
    pub fn next_seat(&mut self) -> Result<Seat, DeckError> {
        self.0.pop_back().ok_or(DeckError::SeatsExhausted)
    }
    pub fn remaining(&self) -> usize {
        self.0.len()
    }
}

/// Shuffled deck and seat rotation for a new round.
///
/// Seeded rounds are reproducible: the same seed yields the same deal order
/// and the same seat rotation. Without a seed, fresh entropy is used.
pub fn new_round(seed: Option<u64>) -> (Deck, SeatAllocator) {
    let ref mut rng = match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_rng(&mut rand::rng()),
    };
    let deck = Deck::shuffled(rng);
    let seats = SeatAllocator::rotated(rng);
    (deck, seats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TILES;
    #[test]
    fn seeded_rounds_are_reproducible() {
        let (a, mut sa) = new_round(Some(42));
        let (b, mut sb) = new_round(Some(42));
        assert!(a.tiles().eq(b.tiles()));
        for _ in 0..N {
            assert_eq!(sa.next_seat(), sb.next_seat());
        }
    }
    #[test]
    fn deal_leaves_eighty_four() {
        let (mut deck, _) = new_round(Some(42));
        let order = deck.tiles().copied().collect::<Vec<_>>();
        let hands = deck.deal_initial_hands().unwrap();
        assert!(hands.iter().all(|h| h.size() == HAND));
        assert_eq!(deck.remaining(), TILES - 52);
        assert_eq!(deck.draw_next(), Ok(order[52]));
        assert_eq!(deck.last_drawn(), Some(order[52]));
    }
    #[test]
    fn deck_holds_every_tile_once() {
        let (deck, _) = new_round(None);
        let mut ids = deck.tiles().map(|t| t.index()).collect::<Vec<_>>();
        ids.sort();
        assert_eq!(ids, (0..TILES).collect::<Vec<_>>());
    }
    #[test]
    fn exhausted_deck() {
        let mut deck = Deck::from(vec![Tile::try_from(5).unwrap()]);
        assert!(deck.draw_next().is_ok());
        assert_eq!(deck.draw_next(), Err(DeckError::ExhaustedDeck));
    }
    #[test]
    fn seats_run_out_after_four() {
        let (_, mut seats) = new_round(Some(7));
        let mut taken = (0..N).map(|_| seats.next_seat().unwrap()).collect::<Vec<_>>();
        taken.sort();
        assert_eq!(taken, vec![0, 1, 2, 3]);
        assert_eq!(seats.next_seat(), Err(DeckError::SeatsExhausted));
    }
    #[test]
    fn peek_back_does_not_draw() {
        let mut deck = Deck::from((0..3).map(|i| Tile::try_from(i).unwrap()).collect::<Vec<_>>());
        assert_eq!(deck.peek_back(0), Tile::try_from(2).ok());
        assert_eq!(deck.peek_back(2), Tile::try_from(0).ok());
        assert_eq!(deck.peek_back(3), None);
        assert_eq!(deck.remaining(), 3);
        deck.draw_next().unwrap();
        assert_eq!(deck.peek_back(0), Tile::try_from(2).ok());
    }
}
