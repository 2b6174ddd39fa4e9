use crate::KINDS;
use crate::TILES;

/// The three numbered suits plus honors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Suit {
    Man,
    Pin,
    Sou,
    Honor,
}

impl Suit {
    pub fn all() -> [Self; 4] {
        [Self::Man, Self::Pin, Self::Sou, Self::Honor]
    }
    /// Numbered suits form sequences; honors never do.
    pub fn is_numbered(&self) -> bool {
        !matches!(self, Self::Honor)
    }
}

impl std::fmt::Display for Suit {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Man => write!(f, "m"),
            Self::Pin => write!(f, "p"),
            Self::Sou => write!(f, "s"),
            Self::Honor => write!(f, "z"),
        }
    }
}

/// One of the 34 tile kinds, ignoring which physical duplicate it is.
///
/// Kinds 0..27 are the numbered suits in blocks of nine (man, pin, sou);
/// 27..34 are the honors (winds then dragons).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Kind(u8);

impl Kind {
    pub fn suit(&self) -> Suit {
        match self.0 / 9 {
            0 => Suit::Man,
            1 => Suit::Pin,
            2 => Suit::Sou,
            _ => Suit::Honor,
        }
    }
    /// Position within the suit, 0-based (0..9 for numbered, 0..7 for honors).
    pub fn rank(&self) -> u8 {
        self.0 % 9
    }
    pub fn index(&self) -> usize {
        self.0 as usize
    }
    /// The kind `delta` steps away inside the same numbered suit.
    /// Never wraps across suit boundaries and never applies to honors.
    pub fn offset(&self, delta: i8) -> Option<Self> {
        if !self.suit().is_numbered() {
            return None;
        }
        let rank = self.rank() as i8 + delta;
        (0..9)
            .contains(&rank)
            .then(|| Self(self.0 - self.rank() + rank as u8))
    }
}

impl TryFrom<u8> for Kind {
    type Error = String;
    fn try_from(n: u8) -> Result<Self, Self::Error> {
        (usize::from(n) < KINDS)
            .then_some(Self(n))
            .ok_or_else(|| format!("kind out of range: {}", n))
    }
}

impl From<Kind> for u8 {
    fn from(kind: Kind) -> Self {
        kind.0
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        const HONORS: [&str; 7] = ["E", "S", "W", "N", "Wd", "Gd", "Rd"];
        match self.suit() {
            Suit::Honor => write!(f, "{}", HONORS[self.rank() as usize]),
            suit => write!(f, "{}{}", self.rank() + 1, suit),
        }
    }
}

/// A physical tile: an identity in the 136-tile universe.
/// Four consecutive identities share one [`Kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tile(u8);

impl Tile {
    pub fn kind(&self) -> Kind {
        Kind(self.0 / 4)
    }
    pub fn index(&self) -> usize {
        self.0 as usize
    }
    /// Every tile in the set, in identity order.
    pub fn universe() -> impl Iterator<Item = Self> {
        (0..TILES as u8).map(Self)
    }
}

impl TryFrom<u8> for Tile {
    type Error = String;
    fn try_from(n: u8) -> Result<Self, Self::Error> {
        (usize::from(n) < TILES)
            .then_some(Self(n))
            .ok_or_else(|| format!("tile out of range: {}", n))
    }
}

impl TryFrom<&str> for Tile {
    type Error = String;
    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.trim()
            .parse::<u8>()
            .map_err(|_| format!("not a tile: {}", s))
            .and_then(Self::try_from)
    }
}

impl From<Tile> for u8 {
    fn from(tile: Tile) -> Self {
        tile.0
    }
}

/// Wire form is the bare identity.
impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for Tile {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.0)
    }
}

/// Human-readable glyphs for a run of tiles, for log lines only.
pub fn glyphs(tiles: &[Tile]) -> String {
    let mut tiles = tiles.to_vec();
    tiles.sort();
    tiles
        .iter()
        .map(|t| t.kind().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn tiles_group_by_four() {
        let tile = |n| Tile::try_from(n).unwrap();
        assert_eq!(tile(0).kind(), tile(3).kind());
        assert_ne!(tile(3).kind(), tile(4).kind());
        assert_eq!(tile(135).kind().index(), 33);
    }
    #[test]
    fn tile_bounds() {
        assert!(Tile::try_from(135).is_ok());
        assert!(Tile::try_from(136).is_err());
        assert!(Tile::try_from("17").is_ok());
        assert!(Tile::try_from("x").is_err());
        assert_eq!(Tile::universe().count(), TILES);
    }
    #[test]
    fn kind_offsets_stay_in_suit() {
        let nine_man = Kind::try_from(8).unwrap();
        let one_pin = Kind::try_from(9).unwrap();
        let east = Kind::try_from(27).unwrap();
        assert_eq!(nine_man.offset(1), None);
        assert_eq!(one_pin.offset(-1), None);
        assert_eq!(one_pin.offset(2), Some(Kind::try_from(11).unwrap()));
        assert_eq!(east.offset(1), None);
    }
    #[test]
    fn kind_glyphs() {
        assert_eq!(Kind::try_from(0).unwrap().to_string(), "1m");
        assert_eq!(Kind::try_from(22).unwrap().to_string(), "5s");
        assert_eq!(Kind::try_from(33).unwrap().to_string(), "Rd");
    }
}
