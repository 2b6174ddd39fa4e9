use super::*;
use crate::KINDS;

/// Unordered multiset of concealed tiles belonging to one seat.
///
/// Eligibility rules only ever look at kind counts, so the hand offers
/// kind-level queries alongside identity-level removal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand(Vec<Tile>);

impl Hand {
    pub fn empty() -> Self {
        Self::default()
    }
    pub fn size(&self) -> usize {
        self.0.len()
    }
    pub fn tiles(&self) -> &[Tile] {
        &self.0
    }
    pub fn contains(&self, tile: &Tile) -> bool {
        self.0.contains(tile)
    }
    pub fn add(&mut self, tile: Tile) {
        self.0.push(tile);
    }
    /// Removes one specific tile. Returns false if it was not held.
    pub fn remove(&mut self, tile: Tile) -> bool {
        match self.0.iter().position(|t| *t == tile) {
            Some(i) => {
                self.0.swap_remove(i);
                true
            }
            None => false,
        }
    }
    /// Number of held tiles of the given kind.
    pub fn count(&self, kind: Kind) -> usize {
        self.0.iter().filter(|t| t.kind() == kind).count()
    }
    /// Kind histogram over all 34 kinds.
    pub fn counts(&self) -> [u8; KINDS] {
        self.0.iter().fold([0; KINDS], |mut counts, t| {
            counts[t.kind().index()] += 1;
            counts
        })
    }
    /// Picks `n` held tiles of `kind` without removing them.
    pub fn pick(&self, kind: Kind, n: usize) -> Option<Vec<Tile>> {
        let picked = self
            .0
            .iter()
            .filter(|t| t.kind() == kind)
            .take(n)
            .copied()
            .collect::<Vec<_>>();
        (picked.len() == n).then_some(picked)
    }
    /// Removes every tile in `tiles`, or nothing if any is missing.
    pub fn take(&mut self, tiles: &[Tile]) -> bool {
        let mut rest = self.clone();
        if tiles.iter().all(|t| rest.remove(*t)) {
            *self = rest;
            true
        } else {
            false
        }
    }
}

impl From<Vec<Tile>> for Hand {
    fn from(tiles: Vec<Tile>) -> Self {
        Self(tiles)
    }
}

/// Wire form: comma-separated identities.
impl std::fmt::Display for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let s = self
            .0
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    fn hand(ids: &[u8]) -> Hand {
        Hand::from(ids.iter().map(|&i| Tile::try_from(i).unwrap()).collect::<Vec<_>>())
    }
    #[test]
    fn counts_by_kind() {
        let hand = hand(&[0, 1, 2, 4, 8]);
        assert_eq!(hand.count(Kind::try_from(0).unwrap()), 3);
        assert_eq!(hand.count(Kind::try_from(1).unwrap()), 1);
        assert_eq!(hand.counts()[2], 1);
    }
    #[test]
    fn take_is_all_or_nothing() {
        let mut h = hand(&[0, 1, 2]);
        let missing = [Tile::try_from(0).unwrap(), Tile::try_from(9).unwrap()];
        assert!(!h.take(&missing));
        assert_eq!(h.size(), 3);
        let present = [Tile::try_from(0).unwrap(), Tile::try_from(2).unwrap()];
        assert!(h.take(&present));
        assert_eq!(h.tiles(), &[Tile::try_from(1).unwrap()]);
    }
    #[test]
    fn pick_requires_enough() {
        let h = hand(&[4, 5, 40]);
        assert_eq!(h.pick(Kind::try_from(1).unwrap(), 2).map(|v| v.len()), Some(2));
        assert!(h.pick(Kind::try_from(1).unwrap(), 3).is_none());
    }
    #[test]
    fn wire_format() {
        assert_eq!(hand(&[3, 77, 120]).to_string(), "3,77,120");
    }
}
