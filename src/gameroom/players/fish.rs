use crate::gameroom::*;
use crate::table::CallKind;
use crate::table::CallSet;
use crate::table::Claim;
use crate::table::Player;
use crate::tiles::Tile;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;

/// CPU opponent that discards at random.
/// Takes every win it is offered and never melds.
pub struct Fish {
    rng: SmallRng,
}

impl Fish {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for Fish {
    fn default() -> Self {
        Self {
            rng: SmallRng::from_rng(&mut rand::rng()),
        }
    }
}

impl Opponent for Fish {
    fn play(&mut self, me: &Player, options: Options) -> Move {
        if options.tsumo {
            return Move::Tsumo;
        }
        let drawn = me.drawn().filter(|_| me.is_riichi());
        let ref mut rng = self.rng;
        drawn
            .or_else(|| me.concealed().tiles().choose(rng).copied())
            .map(Move::Discard)
            .expect("a seat on turn always holds a tile")
    }
    fn claim(&mut self, _: &Player, _: Tile, offered: CallSet) -> Claim {
        match offered.contains(CallKind::Ron) {
            true => Claim::ron(),
            false => Claim::Decline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::Hand;
    fn tile(n: u8) -> Tile {
        Tile::try_from(n).unwrap()
    }
    #[test]
    fn discards_a_concealed_tile() {
        let mut me = Player::new(1, 1, Hand::from(vec![tile(0), tile(40), tile(80)]));
        me.draw(tile(120));
        let mut fish = Fish::seeded(7);
        for _ in 0..16 {
            match fish.play(&me, Options::default()) {
                Move::Discard(t) => assert!(me.concealed().contains(&t)),
                other => panic!("unexpected {:?}", other),
            }
        }
    }
    #[test]
    fn takes_wins_declines_melds() {
        let me = Player::new(1, 1, Hand::empty());
        let mut fish = Fish::seeded(7);
        let options = Options {
            tsumo: true,
            closed_kan: None,
        };
        assert_eq!(fish.play(&me, options), Move::Tsumo);
        let pon = CallSet::from(&[CallKind::Pon][..]);
        assert_eq!(fish.claim(&me, tile(3), pon), Claim::Decline);
        let ron = CallSet::from(&[CallKind::Pon, CallKind::Ron][..]);
        assert_eq!(fish.claim(&me, tile(3), ron), Claim::ron());
    }
}
