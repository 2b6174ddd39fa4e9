use super::*;
use crate::Participant;
use crate::Seat;
use crate::tiles::*;

/// One seat's private and public state for a single round.
///
/// The concealed tiles are split into the 13-ish `hand` and the `drawn` slot,
/// so discarding the drawn tile and discarding from hand are distinguishable.
#[derive(Debug, Clone)]
pub struct Player {
    participant: Participant,
    seat: Seat,
    hand: Hand,
    drawn: Option<Tile>,
    discards: Vec<Tile>,
    melds: Vec<Meld>,
    riichi: bool,
}

impl Player {
    pub fn new(participant: Participant, seat: Seat, hand: Hand) -> Self {
        Self {
            participant,
            seat,
            hand,
            drawn: None,
            discards: Vec::new(),
            melds: Vec::new(),
            riichi: false,
        }
    }
    pub fn participant(&self) -> Participant {
        self.participant
    }
    pub fn seat(&self) -> Seat {
        self.seat
    }
    pub fn hand(&self) -> &Hand {
        &self.hand
    }
    pub fn drawn(&self) -> Option<Tile> {
        self.drawn
    }
    pub fn discards(&self) -> &[Tile] {
        &self.discards
    }
    pub fn melds(&self) -> &[Meld] {
        &self.melds
    }
    pub fn is_riichi(&self) -> bool {
        self.riichi
    }
    /// Sticky for the rest of the round.
    pub fn declare_riichi(&mut self) {
        self.riichi = true;
    }
    /// Concealed tiles including the drawn slot.
    pub fn concealed(&self) -> Hand {
        let mut hand = self.hand.clone();
        if let Some(tile) = self.drawn {
            hand.add(tile);
        }
        hand
    }
    /// Every tile this seat accounts for, across all of its zones.
    pub fn census(&self) -> Vec<Tile> {
        self.hand
            .tiles()
            .iter()
            .copied()
            .chain(self.drawn)
            .chain(self.discards.iter().copied())
            .chain(self.melds.iter().flat_map(|m| m.tiles.iter().copied()))
            .collect()
    }
}

impl Player {
    pub fn draw(&mut self, tile: Tile) {
        if let Some(held) = self.drawn.replace(tile) {
            self.hand.add(held);
        }
    }
    /// Moves a concealed tile to the discard pile.
    /// The drawn tile, if kept, merges into the hand.
    pub fn discard(&mut self, tile: Tile) -> Result<Tile, String> {
        if self.drawn == Some(tile) {
            self.drawn = None;
        } else if self.hand.remove(tile) {
            if let Some(held) = self.drawn.take() {
                self.hand.add(held);
            }
        } else {
            return Err(format!("tile {} is not in hand", tile));
        }
        self.discards.push(tile);
        Ok(tile)
    }
    /// Removes this seat's latest discard after another seat called it.
    pub fn surrender(&mut self, tile: Tile) -> bool {
        match self.discards.last() {
            Some(last) if *last == tile => {
                self.discards.pop();
                true
            }
            _ => false,
        }
    }
    /// Exposes `own` hand tiles plus the called tile as an open set.
    pub fn call(
        &mut self,
        kind: MeldKind,
        called: Tile,
        from: Seat,
        own: &[Tile],
    ) -> Result<Meld, String> {
        if !self.hand.take(own) {
            return Err(format!("tiles {} are not in hand", glyphs(own)));
        }
        let mut tiles = own.to_vec();
        tiles.push(called);
        let meld = Meld {
            kind,
            tiles,
            called: Some(called),
            from,
        };
        self.melds.push(meld.clone());
        Ok(meld)
    }
    /// Declares a concealed kan on the kind of the drawn tile.
    pub fn declare_closed_kan(&mut self) -> Result<Meld, String> {
        let drawn = self.drawn.ok_or("no drawn tile")?;
        let own = self
            .hand
            .pick(drawn.kind(), 3)
            .ok_or_else(|| format!("fewer than four of {}", drawn.kind()))?;
        self.hand.take(&own);
        self.drawn = None;
        let mut tiles = own;
        tiles.push(drawn);
        let meld = Meld {
            kind: MeldKind::ClosedKan,
            tiles,
            called: None,
            from: self.seat,
        };
        self.melds.push(meld.clone());
        Ok(meld)
    }
}
