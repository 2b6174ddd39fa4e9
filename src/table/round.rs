use super::*;
use crate::N;
use crate::Participant;
use crate::Seat;
use crate::tiles::*;

/// All tile-bearing state of one round: the deck and the four seats.
///
/// Players are indexed by seat; participants are re-seated every round.
#[derive(Debug, Clone)]
pub struct Round {
    deck: Deck,
    players: [Player; N],
}

impl Round {
    /// Shuffles, deals thirteen tiles per seat, and assigns participants to
    /// seats through the round's rotated seat queue.
    pub fn deal(seed: Option<u64>) -> Result<Self, DeckError> {
        let (mut deck, mut seats) = new_round(seed);
        let hands = deck.deal_initial_hands()?;
        let mut order = [0; N];
        for participant in 0..N {
            order[seats.next_seat()?] = participant;
        }
        let players = std::array::from_fn(|seat| {
            Player::new(order[seat], seat, hands[seat].clone())
        });
        Ok(Self { deck, players })
    }
    pub fn deck(&self) -> &Deck {
        &self.deck
    }
    pub fn deck_mut(&mut self) -> &mut Deck {
        &mut self.deck
    }
    pub fn players(&self) -> &[Player; N] {
        &self.players
    }
    pub fn player(&self, seat: Seat) -> &Player {
        &self.players[seat % N]
    }
    pub fn player_mut(&mut self, seat: Seat) -> &mut Player {
        &mut self.players[seat % N]
    }
    /// Seat currently occupied by a participant.
    pub fn seat_of(&self, participant: Participant) -> Seat {
        self.players
            .iter()
            .position(|p| p.participant() == participant)
            .expect("every participant is seated")
    }
    /// Every tile on the table, deck included. Always the full set.
    pub fn census(&self) -> Vec<Tile> {
        let mut tiles = self
            .deck
            .tiles()
            .copied()
            .chain(self.players.iter().flat_map(|p| p.census()))
            .collect::<Vec<_>>();
        tiles.sort();
        tiles
    }
}

impl From<(Deck, [Player; N])> for Round {
    fn from((deck, players): (Deck, [Player; N])) -> Self {
        Self { deck, players }
    }
}
