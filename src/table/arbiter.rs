use super::*;
use crate::N;
use crate::Seat;
use crate::tiles::*;
use std::collections::BTreeMap;

/// Chii shapes around the discarded kind, as offsets of the two own tiles.
const RUNS: [(i8, i8); 3] = [(-2, -1), (-1, 1), (1, 2)];

/// Every call each non-discarding seat may make on `tile`.
///
/// Seats without any option are left out of the map, so an empty map means
/// play continues with the next seat. Pure: nothing here mutates the table.
pub fn eligible_calls(
    discarder: Seat,
    tile: Tile,
    players: &[Player; N],
    evaluator: &dyn WinEvaluator,
) -> BTreeMap<Seat, CallSet> {
    players
        .iter()
        .filter(|p| p.seat() != discarder)
        .map(|p| (p.seat(), calls_for(discarder, tile, p, evaluator)))
        .filter(|(_, set)| !set.is_empty())
        .collect()
}

fn calls_for(discarder: Seat, tile: Tile, player: &Player, evaluator: &dyn WinEvaluator) -> CallSet {
    let mut set = CallSet::empty();
    let concealed = player.concealed();
    if evaluator.is_complete(concealed.tiles(), tile) {
        set.insert(CallKind::Ron);
    }
    if player.is_riichi() {
        return set;
    }
    let held = concealed.count(tile.kind());
    if held >= 2 {
        set.insert(CallKind::Pon);
    }
    if held >= 3 {
        set.insert(CallKind::Kan);
    }
    if player.seat() == (discarder + 1) % N && !chii_runs(&concealed, tile).is_empty() {
        set.insert(CallKind::Chii);
    }
    set
}

/// Pairs of held tiles that complete a run with `tile`, one per shape.
fn chii_runs(hand: &Hand, tile: Tile) -> Vec<[Tile; 2]> {
    let kind = tile.kind();
    RUNS.iter()
        .filter_map(|(a, b)| {
            let a = hand.pick(kind.offset(*a)?, 1)?;
            let b = hand.pick(kind.offset(*b)?, 1)?;
            Some([a[0], b[0]])
        })
        .collect()
}

/// Hand tiles a seat contributes to an open call on `tile`.
///
/// When the client named its own tiles they are validated against the call
/// shape; otherwise matching tiles are chosen from the hand.
pub fn meld_tiles(player: &Player, kind: CallKind, tile: Tile, offered: &[Tile]) -> Option<Vec<Tile>> {
    let hand = player.concealed();
    match (kind, offered.is_empty()) {
        (CallKind::Ron, _) => Some(Vec::new()),
        (CallKind::Chii, true) => chii_runs(&hand, tile).first().map(|run| run.to_vec()),
        (CallKind::Chii, false) => {
            let [x, y] = offered else {
                return None;
            };
            let pair = (x.kind().min(y.kind()), x.kind().max(y.kind()));
            let fits = RUNS.iter().any(|(a, b)| {
                tile.kind().offset(*a).zip(tile.kind().offset(*b)) == Some(pair)
            });
            (fits && holds(&hand, offered)).then(|| offered.to_vec())
        }
        (_, true) => hand.pick(tile.kind(), kind.contributed()),
        (_, false) => {
            let fits = offered.len() == kind.contributed()
                && offered.iter().all(|t| t.kind() == tile.kind());
            (fits && holds(&hand, offered)).then(|| offered.to_vec())
        }
    }
}

fn holds(hand: &Hand, tiles: &[Tile]) -> bool {
    hand.clone().take(tiles)
}

/// Kind of a concealed kan available right after a draw: the drawn tile
/// plus three more of its kind in hand.
pub fn closed_kan(player: &Player) -> Option<Kind> {
    let drawn = player.drawn()?;
    (player.hand().count(drawn.kind()) >= 3).then(|| drawn.kind())
}

/// Whether the drawn tile completes the seat's own hand.
pub fn can_tsumo(player: &Player, evaluator: &dyn WinEvaluator) -> bool {
    player
        .drawn()
        .is_some_and(|drawn| evaluator.is_complete(player.hand().tiles(), drawn))
}

#[cfg(test)]
mod tests {
    use super::*;
    fn tile(n: u8) -> Tile {
        Tile::try_from(n).unwrap()
    }
    fn player(seat: Seat, ids: &[u8]) -> Player {
        Player::new(seat, seat, Hand::from(ids.iter().map(|&i| tile(i)).collect::<Vec<_>>()))
    }
    fn never(_: &[Tile], _: Tile) -> bool {
        false
    }
    fn table() -> [Player; N] {
        // kind 10 is tiles 40..44
        [
            player(0, &[41, 42, 100]),
            player(1, &[0, 4]),
            player(2, &[40, 43, 44, 120]),
            player(3, &[8, 12, 130]),
        ]
    }
    #[test]
    fn pon_and_kan_by_count() {
        // seat 2 holds three of the discarded kind, seat 0 two
        let players = [
            player(0, &[40, 41, 100]),
            player(1, &[0, 4]),
            player(2, &[40, 41, 42, 120]),
            player(3, &[8, 12, 130]),
        ];
        let calls = eligible_calls(1, tile(43), &players, &never);
        assert!(calls[&2].contains(CallKind::Kan));
        assert!(calls[&2].contains(CallKind::Pon));
        assert_eq!(calls[&0].bits(), CallKind::Pon.bit());
        assert!(!calls.contains_key(&3));
    }
    #[test]
    fn discarder_never_eligible() {
        let calls = eligible_calls(2, tile(41), &table(), &|_: &[Tile], _: Tile| true);
        assert!(!calls.contains_key(&2));
        assert!(calls.values().all(|s| s.contains(CallKind::Ron)));
    }
    #[test]
    fn chii_only_for_next_seat() {
        // seat 3 holds 3m and 4m; seat 2 discards 2m or 5m
        let calls = eligible_calls(2, tile(4), &table(), &never);
        assert!(calls[&3].contains(CallKind::Chii));
        let calls = eligible_calls(1, tile(4), &table(), &never);
        assert!(calls.get(&3).is_none_or(|s| !s.contains(CallKind::Chii)));
    }
    #[test]
    fn chii_never_wraps_suits() {
        // 8m 9m held, 1p discarded: not a run
        let players = [
            player(0, &[28, 32]),
            player(1, &[]),
            player(2, &[]),
            player(3, &[]),
        ];
        let calls = eligible_calls(3, tile(36), &players, &never);
        assert!(calls.is_empty());
        let honors = [
            player(0, &[108, 112]),
            player(1, &[]),
            player(2, &[]),
            player(3, &[]),
        ];
        assert!(eligible_calls(3, tile(116), &honors, &never).is_empty());
    }
    #[test]
    fn riichi_seats_only_ron() {
        let mut players = table();
        players[2].declare_riichi();
        let calls = eligible_calls(1, tile(41), &players, &never);
        assert!(!calls.contains_key(&2));
    }
    #[test]
    fn meld_tiles_validate_offer() {
        let p = player(3, &[8, 12, 13, 130]);
        assert_eq!(meld_tiles(&p, CallKind::Chii, tile(4), &[tile(8), tile(12)]), Some(vec![tile(8), tile(12)]));
        assert_eq!(meld_tiles(&p, CallKind::Chii, tile(4), &[tile(12), tile(13)]), None);
        assert_eq!(meld_tiles(&p, CallKind::Pon, tile(14), &[]).map(|t| t.len()), Some(2));
        assert_eq!(meld_tiles(&p, CallKind::Pon, tile(14), &[tile(12), tile(130)]), None);
        assert_eq!(meld_tiles(&p, CallKind::Kan, tile(14), &[]), None);
    }
    #[test]
    fn closed_kan_needs_drawn_fourth() {
        let mut p = player(0, &[0, 1, 2, 40]);
        assert_eq!(closed_kan(&p), None);
        p.draw(tile(3));
        assert_eq!(closed_kan(&p), Kind::try_from(0).ok());
        p.draw(tile(41));
        assert_eq!(closed_kan(&p), None);
    }
    #[test]
    fn tsumo_uses_drawn_tile() {
        let mut p = player(0, &[0]);
        assert!(!can_tsumo(&p, &|_: &[Tile], _: Tile| true));
        p.draw(tile(1));
        assert!(can_tsumo(&p, &|hand: &[Tile], t: Tile| hand[0].kind() == t.kind()));
    }
}
