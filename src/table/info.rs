use crate::MAX_INDICATORS;
use crate::MAX_ROUNDS;
use crate::N;
use crate::Participant;
use crate::Points;
use crate::RIICHI_DEPOSIT;
use crate::STARTING_POINTS;
use crate::Seat;
use crate::tiles::Tile;

/// Table-wide counters that persist across rounds.
///
/// `round` counts from zero; scores are kept per participant because seats
/// are reassigned every round.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RoundInfo {
    round: u32,
    honba: u32,
    riichi_sticks: u32,
    dealer: Seat,
    active: Seat,
    indicators: Vec<Tile>,
    scores: [Points; N],
    max_rounds: u32,
}

impl RoundInfo {
    pub fn initial(dealer: Seat, max_rounds: u32) -> Self {
        Self {
            round: 0,
            honba: 0,
            riichi_sticks: 0,
            dealer,
            active: dealer,
            indicators: Vec::new(),
            scores: [STARTING_POINTS; N],
            max_rounds,
        }
    }
    pub fn round(&self) -> u32 {
        self.round
    }
    pub fn honba(&self) -> u32 {
        self.honba
    }
    pub fn riichi_sticks(&self) -> u32 {
        self.riichi_sticks
    }
    pub fn dealer(&self) -> Seat {
        self.dealer
    }
    pub fn active(&self) -> Seat {
        self.active
    }
    pub fn indicators(&self) -> &[Tile] {
        &self.indicators
    }
    pub fn scores(&self) -> [Points; N] {
        self.scores
    }
    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }
    /// The round in play is the final one of the game.
    pub fn is_last_round(&self) -> bool {
        self.round + 1 >= self.max_rounds
    }
}

impl RoundInfo {
    pub fn set_active(&mut self, seat: Seat) {
        self.active = seat % N;
    }
    /// Reveals another bonus indicator. Returns false once the cap is reached.
    pub fn reveal(&mut self, tile: Tile) -> bool {
        match self.indicators.len() < MAX_INDICATORS {
            true => {
                self.indicators.push(tile);
                true
            }
            false => false,
        }
    }
    pub fn clear_indicators(&mut self) {
        self.indicators.clear();
    }
    /// Riichi deposit moves a stick from the declarer's score to the table.
    pub fn deposit(&mut self, who: Participant) {
        self.riichi_sticks += 1;
        self.scores[who % N] -= RIICHI_DEPOSIT;
    }
    /// Moves to the next round with a rotated dealer.
    /// `repeat` is true when the round ended without a winner.
    pub fn advance(&mut self, repeat: bool) {
        self.round = (self.round + 1).min(self.max_rounds);
        self.honba = match repeat {
            true => self.honba + 1,
            false => 0,
        };
        self.rotate();
    }
    /// Replays the same round number after an aborted round.
    pub fn replay(&mut self) {
        self.honba += 1;
        self.active = self.dealer;
        self.indicators.clear();
    }
    /// Winner collects the riichi sticks on the table.
    pub fn collect(&mut self, who: Participant) {
        self.scores[who % N] += self.riichi_sticks as Points * RIICHI_DEPOSIT;
        self.riichi_sticks = 0;
    }
    fn rotate(&mut self) {
        self.dealer = (self.dealer + 1) % N;
        self.active = self.dealer;
        self.indicators.clear();
    }
}

impl Default for RoundInfo {
    fn default() -> Self {
        Self::initial(0, MAX_ROUNDS)
    }
}
