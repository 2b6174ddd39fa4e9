use super::*;
use crate::KINDS;

/// Decides whether a candidate tile completes a holder's concealed tiles.
///
/// Hand-value and yaku rules live behind this seam; the table only needs the
/// boolean to know who may claim a discard or declare a self-drawn win.
pub trait WinEvaluator: Send + Sync {
    fn is_complete(&self, concealed: &[Tile], candidate: Tile) -> bool;
}

/// Any closure over (concealed, candidate) is an evaluator.
impl<F> WinEvaluator for F
where
    F: Fn(&[Tile], Tile) -> bool + Send + Sync,
{
    fn is_complete(&self, concealed: &[Tile], candidate: Tile) -> bool {
        self(concealed, candidate)
    }
}

/// Shape-only evaluator: sets plus one pair, or seven distinct pairs.
///
/// Works for any concealed size of 3k+1 (open melds shrink the hand), since
/// the candidate brings it to 3k+2. Does not check yaku.
#[derive(Debug, Clone, Copy, Default)]
pub struct Standard;

impl Standard {
    fn seven_pairs(counts: &[u8; KINDS]) -> bool {
        counts.iter().filter(|&&c| c == 2).count() == 7 && counts.iter().all(|&c| c == 0 || c == 2)
    }
    fn sets_and_pair(counts: &mut [u8; KINDS]) -> bool {
        (0..KINDS).any(|k| {
            if counts[k] < 2 {
                return false;
            }
            counts[k] -= 2;
            let ok = Self::sets(counts, 0);
            counts[k] += 2;
            ok
        })
    }
    /// Decomposes the remaining counts into triplets and runs, lowest kind first.
    fn sets(counts: &mut [u8; KINDS], from: usize) -> bool {
        let Some(k) = (from..KINDS).find(|&k| counts[k] > 0) else {
            return true;
        };
        if counts[k] >= 3 {
            counts[k] -= 3;
            let ok = Self::sets(counts, k);
            counts[k] += 3;
            if ok {
                return true;
            }
        }
        let runs = k < 27 && k % 9 <= 6 && counts[k + 1] > 0 && counts[k + 2] > 0;
        if runs {
            counts[k] -= 1;
            counts[k + 1] -= 1;
            counts[k + 2] -= 1;
            let ok = Self::sets(counts, k);
            counts[k] += 1;
            counts[k + 1] += 1;
            counts[k + 2] += 1;
            return ok;
        }
        false
    }
}

impl WinEvaluator for Standard {
    fn is_complete(&self, concealed: &[Tile], candidate: Tile) -> bool {
        if (concealed.len() + 1) % 3 != 2 {
            return false;
        }
        let mut counts = Hand::from(concealed.to_vec()).counts();
        counts[candidate.kind().index()] += 1;
        (concealed.len() == 13 && Self::seven_pairs(&counts)) || Self::sets_and_pair(&mut counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    /// Tiles by kind index, taking successive duplicates of repeated kinds.
    fn tiles(kinds: &[u8]) -> Vec<Tile> {
        let mut used = [0u8; KINDS];
        kinds
            .iter()
            .map(|&k| {
                let tile = Tile::try_from(k * 4 + used[k as usize]).unwrap();
                used[k as usize] += 1;
                tile
            })
            .collect()
    }
    fn candidate(kind: u8) -> Tile {
        Tile::try_from(kind * 4 + 3).unwrap()
    }
    #[test]
    fn completes_sets_and_pair() {
        // 123m 456m 789p EEE + 5s waiting on 5s
        let hand = tiles(&[0, 1, 2, 3, 4, 5, 15, 16, 17, 27, 27, 27, 22]);
        assert!(Standard.is_complete(&hand, candidate(22)));
        assert!(!Standard.is_complete(&hand, candidate(23)));
    }
    #[test]
    fn completes_seven_pairs() {
        let hand = tiles(&[0, 0, 4, 4, 9, 9, 13, 13, 20, 20, 27, 27, 33]);
        assert!(Standard.is_complete(&hand, candidate(33)));
    }
    #[test]
    fn no_runs_across_suits() {
        // 8m 9m + 1p is not a run
        let hand = tiles(&[7, 8, 30, 30, 30, 31, 31, 31, 32, 32, 32, 33, 33]);
        assert!(!Standard.is_complete(&hand, candidate(9)));
        assert!(Standard.is_complete(&hand, candidate(6)));
    }
    #[test]
    fn smaller_hands_after_melds() {
        // four tiles left after three open melds
        let hand = tiles(&[0, 1, 2, 9]);
        assert!(Standard.is_complete(&hand, candidate(9)));
    }
    #[test]
    fn closures_are_evaluators() {
        let always = |_: &[Tile], _: Tile| true;
        assert!(always.is_complete(&[], candidate(0)));
    }
}
