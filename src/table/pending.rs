use super::*;
use crate::N;
use crate::Seat;
use crate::tiles::Tile;
use std::collections::BTreeMap;

/// How a call window closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A seat claimed the discard as its winning tile.
    Win { seat: Seat },
    /// A seat takes the discard into an open set with the given hand tiles.
    Meld {
        seat: Seat,
        kind: CallKind,
        tiles: Vec<Tile>,
    },
    /// Nobody called. Play moves to the seat after the discarder.
    Declined,
}

/// Why a decision had no effect on the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The window had already closed, or this seat already answered.
    AlreadyResolved,
    /// The seat was not offered that call on this discard.
    NotEligible,
    /// A better claim of another seat won the window.
    Outranked,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::AlreadyResolved => write!(f, "already resolved"),
            Self::NotEligible => write!(f, "not eligible"),
            Self::Outranked => write!(f, "outranked"),
        }
    }
}

/// Outcome of one seat's decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The decision closed the window in this seat's favour.
    Accepted(Resolution),
    /// The claim stands but waits on an undecided higher-priority seat.
    Held,
    /// The seat passed.
    Declined,
    Rejected(Rejection),
}

/// Arbitration record for one discard, alive until the window closes.
///
/// Once [`PendingCall::resolution`] is set, every later decision is rejected
/// without touching the record.
#[derive(Debug, Clone)]
pub struct PendingCall {
    id: u64,
    round: u32,
    discarder: Seat,
    tile: Tile,
    offered: BTreeMap<Seat, CallSet>,
    undecided: BTreeMap<Seat, CallSet>,
    held: Option<(Seat, CallKind, Vec<Tile>)>,
    resolved: Option<Resolution>,
}

impl PendingCall {
    pub fn new(id: u64, round: u32, discarder: Seat, tile: Tile, offered: BTreeMap<Seat, CallSet>) -> Self {
        Self {
            id,
            round,
            discarder,
            tile,
            undecided: offered.clone(),
            offered,
            held: None,
            resolved: None,
        }
    }
    pub fn id(&self) -> u64 {
        self.id
    }
    pub fn round(&self) -> u32 {
        self.round
    }
    pub fn discarder(&self) -> Seat {
        self.discarder
    }
    pub fn tile(&self) -> Tile {
        self.tile
    }
    /// Calls offered to a seat when the window opened.
    pub fn offered(&self, seat: Seat) -> CallSet {
        self.offered.get(&seat).copied().unwrap_or_default()
    }
    pub fn seats(&self) -> impl Iterator<Item = Seat> + '_ {
        self.offered.keys().copied()
    }
    /// Whether the seat still owes an answer.
    pub fn awaits(&self, seat: Seat) -> bool {
        self.resolved.is_none() && self.undecided.contains_key(&seat)
    }
    pub fn resolution(&self) -> Option<&Resolution> {
        self.resolved.as_ref()
    }
    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }
}

impl PendingCall {
    /// Applies one seat's answer.
    ///
    /// A win closes the window at once. A meld closes it unless an undecided
    /// seat could still outrank it, in which case it is held; of two held
    /// claims the higher priority survives, then the seat nearer the
    /// discarder in rotation order.
    pub fn decide(&mut self, seat: Seat, claim: Claim) -> Verdict {
        if self.resolved.is_some() {
            return Verdict::Rejected(Rejection::AlreadyResolved);
        }
        let Some(options) = self.undecided.get(&seat).copied() else {
            return match self.offered.contains_key(&seat) {
                true => Verdict::Rejected(Rejection::AlreadyResolved),
                false => Verdict::Rejected(Rejection::NotEligible),
            };
        };
        match claim {
            Claim::Decline => {
                self.undecided.remove(&seat);
                self.settle();
                Verdict::Declined
            }
            Claim::Call(kind, _) if !options.contains(kind) => Verdict::Rejected(Rejection::NotEligible),
            Claim::Call(CallKind::Ron, _) => {
                self.undecided.clear();
                self.held = None;
                let win = Resolution::Win { seat };
                self.resolved = Some(win.clone());
                Verdict::Accepted(win)
            }
            Claim::Call(kind, tiles) => {
                self.undecided.remove(&seat);
                let candidate = (seat, kind, tiles);
                let outranked = match self.held.take() {
                    Some(held) if self.beats(&held, &candidate) => {
                        self.held = Some(held);
                        true
                    }
                    _ => {
                        self.held = Some(candidate);
                        false
                    }
                };
                self.settle();
                match (outranked, &self.resolved) {
                    (true, _) => Verdict::Rejected(Rejection::Outranked),
                    (false, Some(r @ Resolution::Meld { seat: s, .. })) if *s == seat => {
                        Verdict::Accepted(r.clone())
                    }
                    _ => Verdict::Held,
                }
            }
        }
    }
    /// Closes the window if nothing undecided can change the outcome.
    /// Returns true once resolved.
    pub fn settle(&mut self) -> bool {
        if self.resolved.is_some() {
            return true;
        }
        let blocking = self
            .held
            .as_ref()
            .map(|(_, kind, _)| kind.priority())
            .unwrap_or(0);
        let waiting = self.undecided.values().any(|set| set.priority() > blocking);
        match (&self.held, waiting) {
            (_, true) => {}
            (Some((seat, kind, tiles)), false) => {
                self.resolved = Some(Resolution::Meld {
                    seat: *seat,
                    kind: *kind,
                    tiles: tiles.clone(),
                });
            }
            (None, false) if self.undecided.is_empty() => self.resolved = Some(Resolution::Declined),
            (None, false) => {}
        }
        self.resolved.is_some()
    }
    /// Treats every seat still undecided as having declined.
    pub fn timeout(&mut self) -> &Resolution {
        self.undecided.clear();
        self.settle();
        self.resolved.get_or_insert(Resolution::Declined)
    }
    fn distance(&self, seat: Seat) -> usize {
        (seat + N - self.discarder) % N
    }
    fn beats(&self, a: &(Seat, CallKind, Vec<Tile>), b: &(Seat, CallKind, Vec<Tile>)) -> bool {
        match a.1.priority().cmp(&b.1.priority()) {
            std::cmp::Ordering::Equal => self.distance(a.0) < self.distance(b.0),
            order => order.is_gt(),
        }
    }
}
