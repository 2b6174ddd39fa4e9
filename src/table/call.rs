use crate::Seat;
use crate::tiles::*;

/// Out-of-turn calls a seat may make on another seat's discard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallKind {
    Chii,
    Pon,
    Kan,
    Ron,
}

impl CallKind {
    pub fn all() -> [Self; 4] {
        [Self::Chii, Self::Pon, Self::Kan, Self::Ron]
    }
    /// Arbitration rank: ron beats pon/kan, which beat chii.
    pub fn priority(&self) -> u8 {
        match self {
            Self::Ron => 3,
            Self::Pon | Self::Kan => 2,
            Self::Chii => 1,
        }
    }
    /// Eligibility flag bit as advertised in a discard's `t` attribute.
    pub fn bit(&self) -> u8 {
        match self {
            Self::Pon => 1,
            Self::Kan => 2,
            Self::Chii => 4,
            Self::Ron => 8,
        }
    }
    /// Tiles the caller contributes from its own hand.
    pub fn contributed(&self) -> usize {
        match self {
            Self::Chii | Self::Pon => 2,
            Self::Kan => 3,
            Self::Ron => 0,
        }
    }
    /// Shape of the set an accepted call puts on the table. Ron makes none.
    pub fn meld(&self) -> Option<MeldKind> {
        match self {
            Self::Chii => Some(MeldKind::Chii),
            Self::Pon => Some(MeldKind::Pon),
            Self::Kan => Some(MeldKind::Kan),
            Self::Ron => None,
        }
    }
}

impl std::fmt::Display for CallKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Chii => write!(f, "chi"),
            Self::Pon => write!(f, "pon"),
            Self::Kan => write!(f, "kan"),
            Self::Ron => write!(f, "ron"),
        }
    }
}

/// Set of call kinds available to one seat, stored as flag bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CallSet(u8);

impl CallSet {
    pub fn empty() -> Self {
        Self(0)
    }
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
    pub fn insert(&mut self, kind: CallKind) {
        self.0 |= kind.bit();
    }
    pub fn contains(&self, kind: CallKind) -> bool {
        self.0 & kind.bit() != 0
    }
    pub fn iter(&self) -> impl Iterator<Item = CallKind> + '_ {
        CallKind::all().into_iter().filter(|k| self.contains(*k))
    }
    /// Highest arbitration rank among the kinds held, 0 when empty.
    pub fn priority(&self) -> u8 {
        self.iter().map(|k| k.priority()).max().unwrap_or(0)
    }
    pub fn bits(&self) -> u8 {
        self.0
    }
}

impl From<&[CallKind]> for CallSet {
    fn from(kinds: &[CallKind]) -> Self {
        kinds.iter().fold(Self::empty(), |mut set, k| {
            set.insert(*k);
            set
        })
    }
}

/// A seat's answer to an offered call window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    Decline,
    /// Call of the given kind, with the hand tiles to use.
    /// An empty tile list lets the table pick matching tiles itself.
    Call(CallKind, Vec<Tile>),
}

impl Claim {
    pub fn ron() -> Self {
        Self::Call(CallKind::Ron, Vec::new())
    }
    pub fn kind(&self) -> Option<CallKind> {
        match self {
            Self::Decline => None,
            Self::Call(kind, _) => Some(*kind),
        }
    }
}

/// Shape of a set moved onto the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeldKind {
    Chii,
    Pon,
    Kan,
    ClosedKan,
}

impl std::fmt::Display for MeldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Chii => write!(f, "chi"),
            Self::Pon => write!(f, "pon"),
            Self::Kan => write!(f, "kan"),
            Self::ClosedKan => write!(f, "ankan"),
        }
    }
}

/// A set exposed (or declared concealed) in a seat's table area.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Meld {
    pub kind: MeldKind,
    pub tiles: Vec<Tile>,
    /// The tile taken from another seat's discard, if any.
    pub called: Option<Tile>,
    pub from: Seat,
}

impl Meld {
    pub fn is_kan(&self) -> bool {
        matches!(self.kind, MeldKind::Kan | MeldKind::ClosedKan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn call_set_bits() {
        let set = CallSet::from(&[CallKind::Pon, CallKind::Kan][..]);
        assert_eq!(set.bits(), 3);
        assert!(set.contains(CallKind::Pon));
        assert!(!set.contains(CallKind::Chii));
        assert_eq!(set.priority(), 2);
        assert_eq!(CallSet::empty().priority(), 0);
    }
    #[test]
    fn ron_outranks_everything() {
        assert!(CallKind::Ron.priority() > CallKind::Kan.priority());
        assert_eq!(CallKind::Kan.priority(), CallKind::Pon.priority());
        assert!(CallKind::Pon.priority() > CallKind::Chii.priority());
    }
}
