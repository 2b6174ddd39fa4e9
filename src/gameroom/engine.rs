use super::*;
use crate::CLIENT;
use crate::ID;
use crate::N;
use crate::Points;
use crate::Seat;
use crate::protocol::*;
use crate::table::*;
use crate::tiles::*;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::sync::Arc;

/// Draw flag telling the client its drawn tile completes the hand.
pub const TSUMO_FLAG: u8 = 16;

/// How a round ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `from == winner` for a self-drawn win.
    Win { winner: Seat, from: Seat, tile: Tile },
    Exhausted,
    /// Ended without resolution; the round is replayed.
    Aborted,
}

/// Turn state. Only the engine moves between phases.
#[derive(Debug, Clone)]
pub enum Phase {
    /// Table set up, waiting for the first `nextready`.
    Seating,
    AwaitingDraw(Seat),
    AwaitingDiscard(Seat),
    AwaitingCallDecision(PendingCall),
    RoundOver(Outcome),
    GameOver,
}

/// What the driver must do after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    /// Step again.
    Continue,
    /// The client owes a discard (or a self-draw declaration) after draw `turn`.
    Discard { turn: u64 },
    /// The client owes an answer to call window `id`.
    Call { id: u64 },
    RoundOver,
    GameOver,
    /// Nothing to play until the next round is opened.
    Idle,
}

/// Turn engine for one table: the only place that decides what happens next.
///
/// Steps are synchronous. Automated seats are asked inline; the client's
/// decisions arrive through [`Engine::discard`], [`Engine::decide`] and
/// friends, fed by the dealer task. Everything the client should see is
/// queued in an outbox and drained by the driver, so it can register its
/// waits before the prompting messages reach the wire.
pub struct Engine {
    id: ID<Self>,
    info: RoundInfo,
    round: Round,
    phase: Phase,
    evaluator: Arc<dyn WinEvaluator>,
    opponents: [Box<dyn Opponent>; N],
    rng: SmallRng,
    seeds: Option<SmallRng>,
    outbox: Vec<Message>,
    connected: bool,
    windows: u64,
    draws: u64,
    record: Record,
}

impl Engine {
    /// Deals the first round. A seed makes the whole game reproducible:
    /// the first deal uses it directly, later deals derive from it.
    pub fn new(seed: Option<u64>, max_rounds: u32) -> Result<Self, DeckError> {
        let mut rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_rng(&mut rand::rng()),
        };
        let seeds = seed.map(|_| SmallRng::seed_from_u64(rng.random()));
        let opponents = std::array::from_fn(|_| Box::new(Fish::seeded(rng.random())) as Box<dyn Opponent>);
        let id = ID::default();
        let info = RoundInfo::initial(0, max_rounds);
        let round = Round::deal(seed)?;
        let record = Record::new(id, &info, &round);
        let mut engine = Self {
            id,
            info,
            round,
            phase: Phase::Seating,
            evaluator: Arc::new(Standard),
            opponents,
            rng,
            seeds,
            outbox: Vec::new(),
            connected: false,
            windows: 0,
            draws: 0,
            record,
        };
        engine.seat(engine.round.clone());
        Ok(engine)
    }
    pub fn with_evaluator(mut self, evaluator: Arc<dyn WinEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }
    /// Replaces the policy of one participant. The client's entry is its
    /// autopilot while disconnected.
    pub fn with_opponent(mut self, participant: usize, opponent: Box<dyn Opponent>) -> Self {
        self.opponents[participant % N] = opponent;
        self
    }
    /// Replaces the dealt round, e.g. with a prepared wall.
    pub fn with_round(mut self, round: Round) -> Self {
        self.seat(round);
        self
    }
}

impl Engine {
    pub fn id(&self) -> ID<Self> {
        self.id
    }
    pub fn info(&self) -> &RoundInfo {
        &self.info
    }
    pub fn round(&self) -> &Round {
        &self.round
    }
    pub fn phase(&self) -> &Phase {
        &self.phase
    }
    pub fn record(&self) -> &Record {
        &self.record
    }
    pub fn is_connected(&self) -> bool {
        self.connected
    }
    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::GameOver)
    }
    pub fn client_seat(&self) -> Seat {
        self.round.seat_of(CLIENT)
    }
    /// Seat number as seen by the client: 0 is the client itself.
    pub fn relative(&self, seat: Seat) -> usize {
        (seat + N - self.client_seat()) % N
    }
    /// Scores in client-relative seat order.
    pub fn relative_scores(&self) -> [Points; N] {
        let scores = self.info.scores();
        let client = self.client_seat();
        std::array::from_fn(|i| scores[self.round.player((client + i) % N).participant()])
    }
    /// Takes everything queued for the client.
    pub fn drain(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.outbox)
    }
    pub fn connect(&mut self) {
        self.connected = true;
    }
    /// From now on the autopilot plays the client's seat.
    pub fn disconnect(&mut self) {
        self.connected = false;
    }
}

impl Engine {
    /// Opens the next round on the client's `nextready`.
    ///
    /// The first call starts the dealt round; after a round ends the table
    /// counters advance (or the round is replayed when aborted) and fresh
    /// hands are dealt. Returns false once the game is over.
    pub fn open(&mut self) -> Result<bool, DeckError> {
        match &self.phase {
            Phase::Seating => {}
            Phase::RoundOver(outcome) => {
                match outcome {
                    Outcome::Win { .. } => self.info.advance(false),
                    Outcome::Exhausted => self.info.advance(true),
                    Outcome::Aborted => self.info.replay(),
                }
                let seed = self.seeds.as_mut().map(|rng| rng.random());
                self.seat(Round::deal(seed)?);
            }
            Phase::GameOver => {
                let scores = self.relative_scores();
                self.notify(ServerMessage::Owari { scores });
                return Ok(false);
            }
            _ => return Ok(true),
        }
        let dealer = self.info.dealer();
        self.info.set_active(dealer);
        self.phase = Phase::AwaitingDraw(dealer);
        let init = self.init();
        self.notify(init);
        log::info!(
            "[engine] round {} honba {} opens, dealer seat {}",
            self.info.round(),
            self.info.honba(),
            dealer
        );
        Ok(true)
    }
    /// Advances the table by one step.
    pub fn step(&mut self) -> Prompt {
        match self.phase {
            Phase::Seating => Prompt::Idle,
            Phase::AwaitingDraw(seat) => {
                self.draw(seat);
                self.prompt()
            }
            Phase::AwaitingDiscard(seat) if self.drives(seat) => {
                self.automate(seat);
                self.prompt()
            }
            Phase::AwaitingDiscard(_) => Prompt::Discard { turn: self.draws },
            Phase::AwaitingCallDecision(_) => self.arbitrate(),
            Phase::RoundOver(_) => Prompt::RoundOver,
            Phase::GameOver => Prompt::GameOver,
        }
    }
    /// Ends a round in play as aborted. Used when the driver fails mid-round.
    pub fn abort(&mut self) -> bool {
        match self.phase {
            Phase::AwaitingDraw(_) | Phase::AwaitingDiscard(_) | Phase::AwaitingCallDecision(_) => {
                log::warn!("[engine] aborting round {}", self.info.round());
                self.finish(Outcome::Aborted);
                true
            }
            _ => false,
        }
    }
}

/// Client decisions.
impl Engine {
    /// The client discards `tile` on its own turn.
    pub fn discard(&mut self, tile: Tile) -> Result<(), ProtocolError> {
        let seat = self.on_turn()?;
        self.discard_tile(seat, tile)
    }
    /// The client declares a concealed kan on its drawn tile.
    pub fn declare_kan(&mut self) -> Result<(), ProtocolError> {
        let seat = self.on_turn()?;
        self.closed_kan(seat)
    }
    /// The client declares a self-drawn win.
    pub fn declare_tsumo(&mut self) -> Result<(), ProtocolError> {
        let seat = self.on_turn()?;
        self.tsumo(seat)
    }
    /// The client declares riichi ahead of its discard.
    pub fn reach(&mut self) -> Result<(), ProtocolError> {
        let seat = self.on_turn()?;
        let player = self.round.player(seat);
        if player.is_riichi() {
            return Err(ProtocolError::violation("already in riichi"));
        }
        if player.melds().iter().any(|m| m.kind != MeldKind::ClosedKan) {
            return Err(ProtocolError::violation("riichi needs a concealed hand"));
        }
        self.round.player_mut(seat).declare_riichi();
        self.info.deposit(CLIENT);
        self.record.push(Play::Riichi { seat });
        self.notify(ServerMessage::Reach { who: 0, step: 1 });
        log::info!("[engine] client declares riichi");
        Ok(())
    }
    /// The client answers call window `id`. Answers to a closed window are stale.
    pub fn decide(&mut self, id: u64, claim: Claim) -> Result<Verdict, ProtocolError> {
        match &self.phase {
            Phase::AwaitingCallDecision(pending) if pending.id() == id => {
                let seat = self.client_seat();
                Ok(self.claim(seat, claim))
            }
            _ => Err(ProtocolError::Stale {
                round: self.info.round(),
            }),
        }
    }
    /// Closes call window `id`, treating every silent seat as declined.
    pub fn expire(&mut self, id: u64) -> bool {
        match &mut self.phase {
            Phase::AwaitingCallDecision(pending) if pending.id() == id => {
                log::debug!("[engine] call window {} expired", id);
                pending.timeout();
                self.resolve();
                true
            }
            _ => false,
        }
    }
    /// Lets the autopilot take the client's current turn.
    pub fn forfeit(&mut self) {
        if let Phase::AwaitingDiscard(seat) = self.phase {
            log::debug!("[engine] autopilot plays seat {}", seat);
            self.automate(seat);
        }
    }
    /// Error for a turn decision that arrives while none is awaited.
    pub fn unsolicited(&self) -> ProtocolError {
        match self.phase {
            Phase::RoundOver(_) | Phase::GameOver => ProtocolError::Stale {
                round: self.info.round(),
            },
            _ => ProtocolError::violation("not your turn"),
        }
    }
    fn on_turn(&self) -> Result<Seat, ProtocolError> {
        let seat = self.client_seat();
        match self.phase {
            Phase::AwaitingDiscard(s) if s == seat => Ok(seat),
            _ => Err(self.unsolicited()),
        }
    }
}

/// Turn mechanics.
impl Engine {
    fn draw(&mut self, seat: Seat) {
        match self.round.deck_mut().draw_next() {
            Ok(tile) => {
                self.draws += 1;
                log::debug!("[engine] seat {} draws {}", seat, tile.kind());
                self.round.player_mut(seat).draw(tile);
                self.record.push(Play::Draw { seat, tile });
                let (shown, flags) = match self.is_client(seat) {
                    true => (Some(tile), self.draw_flags(seat)),
                    false => (None, 0),
                };
                self.notify(ServerMessage::Draw {
                    who: self.relative(seat),
                    tile: shown,
                    flags,
                });
                self.phase = Phase::AwaitingDiscard(seat);
            }
            Err(e) => {
                log::debug!("[engine] {}", e);
                self.finish(Outcome::Exhausted);
            }
        }
    }
    fn discard_tile(&mut self, seat: Seat, tile: Tile) -> Result<(), ProtocolError> {
        let tile = self
            .round
            .player_mut(seat)
            .discard(tile)
            .map_err(ProtocolError::violation)?;
        log::debug!("[engine] seat {} discards {}", seat, tile.kind());
        self.record.push(Play::Discard { seat, tile });
        let calls = eligible_calls(seat, tile, self.round.players(), self.evaluator.as_ref());
        let flags = calls.get(&self.client_seat()).map(|s| s.bits()).unwrap_or(0);
        self.notify(ServerMessage::Discard {
            who: self.relative(seat),
            tile,
            flags,
        });
        match calls.is_empty() {
            true => self.pass(seat),
            false => {
                self.windows += 1;
                log::debug!("[engine] call window {} on {} ({} seats)", self.windows, tile.kind(), calls.len());
                let pending = PendingCall::new(self.windows, self.info.round(), seat, tile, calls);
                self.phase = Phase::AwaitingCallDecision(pending);
            }
        }
        Ok(())
    }
    fn closed_kan(&mut self, seat: Seat) -> Result<(), ProtocolError> {
        if closed_kan(self.round.player(seat)).is_none() {
            return Err(ProtocolError::violation("no concealed kan available"));
        }
        let meld = self
            .round
            .player_mut(seat)
            .declare_closed_kan()
            .map_err(ProtocolError::violation)?;
        log::debug!("[engine] seat {} declares concealed kan", seat);
        self.record.push(Play::Call {
            seat,
            from: seat,
            kind: meld.kind,
            tiles: meld.tiles.clone(),
        });
        self.notify(ServerMessage::Meld {
            who: self.relative(seat),
            from: self.relative(seat),
            kind: meld.kind,
            tiles: meld.tiles,
        });
        self.replace(seat);
        Ok(())
    }
    fn tsumo(&mut self, seat: Seat) -> Result<(), ProtocolError> {
        let player = self.round.player(seat);
        match player.drawn() {
            Some(tile) if can_tsumo(player, self.evaluator.as_ref()) => {
                self.finish(Outcome::Win {
                    winner: seat,
                    from: seat,
                    tile,
                });
                Ok(())
            }
            _ => Err(ProtocolError::violation("hand is not complete")),
        }
    }
    /// Asks an automated policy for the seat's move. An illegal choice falls
    /// back to discarding the drawn tile.
    fn automate(&mut self, seat: Seat) {
        let participant = self.round.player(seat).participant();
        let options = self.options(seat);
        let choice = self.opponents[participant].play(self.round.player(seat), options);
        let result = match choice {
            Move::Tsumo => self.tsumo(seat),
            Move::ClosedKan => self.closed_kan(seat),
            Move::Discard(tile) => self.discard_tile(seat, tile),
        };
        if let Err(e) = result {
            log::warn!("[engine] seat {} played {:?}: {}", seat, choice, e);
            if let Move::Discard(tile) = Tsumogiri.play(self.round.player(seat), options) {
                let _ = self
                    .discard_tile(seat, tile)
                    .inspect_err(|e| log::error!("[engine] seat {} cannot discard: {}", seat, e));
            }
        }
    }
    /// Lets automated seats answer the open window, then either prompts the
    /// client or closes it.
    fn arbitrate(&mut self) -> Prompt {
        let Phase::AwaitingCallDecision(ref pending) = self.phase else {
            return self.prompt();
        };
        let (id, tile) = (pending.id(), pending.tile());
        let automated = pending
            .seats()
            .filter(|s| pending.awaits(*s) && self.drives(*s))
            .collect::<Vec<_>>();
        for seat in automated {
            let offered = match &self.phase {
                Phase::AwaitingCallDecision(p) if p.awaits(seat) => p.offered(seat),
                _ => break,
            };
            let participant = self.round.player(seat).participant();
            let claim = self.opponents[participant].claim(self.round.player(seat), tile, offered);
            self.claim(seat, claim);
        }
        let client = self.client_seat();
        let asks = match &self.phase {
            Phase::AwaitingCallDecision(p) => Some(p.awaits(client) && self.connected),
            _ => None,
        };
        match asks {
            Some(true) => Prompt::Call { id },
            Some(false) => {
                self.expire(id);
                self.prompt()
            }
            None => self.prompt(),
        }
    }
    /// Applies one seat's answer to the open window.
    fn claim(&mut self, seat: Seat, claim: Claim) -> Verdict {
        let Phase::AwaitingCallDecision(ref mut pending) = self.phase else {
            return Verdict::Rejected(Rejection::AlreadyResolved);
        };
        let claim = match claim {
            Claim::Decline => Claim::Decline,
            Claim::Call(kind, offered) => {
                match meld_tiles(self.round.player(seat), kind, pending.tile(), &offered) {
                    Some(tiles) => Claim::Call(kind, tiles),
                    None => return Verdict::Rejected(Rejection::NotEligible),
                }
            }
        };
        let verdict = pending.decide(seat, claim);
        log::debug!("[engine] seat {} on window {}: {:?}", seat, pending.id(), verdict);
        if pending.is_resolved() {
            self.resolve();
        }
        verdict
    }
    /// Applies the resolution of the closed window.
    fn resolve(&mut self) {
        let pending = match std::mem::replace(&mut self.phase, Phase::Seating) {
            Phase::AwaitingCallDecision(pending) => pending,
            other => {
                self.phase = other;
                return;
            }
        };
        let (from, tile) = (pending.discarder(), pending.tile());
        match pending.resolution().cloned().unwrap_or(Resolution::Declined) {
            Resolution::Win { seat } => self.finish(Outcome::Win {
                winner: seat,
                from,
                tile,
            }),
            Resolution::Meld { seat, kind, tiles } => self.meld(seat, from, kind, tile, &tiles),
            Resolution::Declined => self.pass(from),
        }
    }
    /// Moves the called discard and the caller's tiles into an open set.
    fn meld(&mut self, seat: Seat, from: Seat, kind: CallKind, tile: Tile, own: &[Tile]) {
        let Some(shape) = kind.meld() else {
            return self.pass(from);
        };
        let meld = match self.round.player_mut(seat).call(shape, tile, from, own) {
            Ok(meld) => meld,
            Err(e) => {
                log::error!("[engine] seat {} cannot {}: {}", seat, kind, e);
                return self.pass(from);
            }
        };
        self.round.player_mut(from).surrender(tile);
        log::debug!("[engine] seat {} calls {} on {} from seat {}", seat, kind, tile.kind(), from);
        self.record.push(Play::Call {
            seat,
            from,
            kind: shape,
            tiles: meld.tiles.clone(),
        });
        let kan = meld.is_kan();
        self.notify(ServerMessage::Meld {
            who: self.relative(seat),
            from: self.relative(from),
            kind: shape,
            tiles: meld.tiles,
        });
        self.info.set_active(seat);
        match kan {
            true => self.replace(seat),
            false => self.phase = Phase::AwaitingDiscard(seat),
        }
    }
    /// Kan bookkeeping: a new indicator, then a replacement draw.
    fn replace(&mut self, seat: Seat) {
        let n = self.info.indicators().len();
        if let Some(tile) = self.round.deck().peek_back(n) {
            if self.info.reveal(tile) {
                self.record.push(Play::Indicator { tile });
                self.notify(ServerMessage::Dora { tile });
            }
        }
        self.draw(seat);
    }
    fn pass(&mut self, discarder: Seat) {
        let next = (discarder + 1) % N;
        self.info.set_active(next);
        self.phase = Phase::AwaitingDraw(next);
    }
    fn finish(&mut self, outcome: Outcome) {
        let client = self.client_seat();
        match &outcome {
            Outcome::Win { winner, from, tile } => {
                let mut hand = self.round.player(*winner).concealed();
                if winner != from {
                    hand.add(*tile);
                }
                self.info.collect(self.round.player(*winner).participant());
                self.record.push(Play::Win {
                    seat: *winner,
                    from: *from,
                    tile: *tile,
                });
                self.notify(ServerMessage::Agari {
                    who: self.relative(*winner),
                    from: self.relative(*from),
                    machi: *tile,
                    hand,
                    scores: self.relative_scores(),
                });
            }
            Outcome::Exhausted => {
                self.record.push(Play::Exhausted);
                let hands = std::array::from_fn(|i| self.round.player((client + i) % N).concealed());
                self.notify(ServerMessage::Ryuukyoku { hands });
            }
            Outcome::Aborted => self.record.push(Play::Aborted),
        }
        self.record.close(self.info.scores());
        log::info!("[engine] round {} over: {:?}", self.info.round(), outcome);
        self.phase = match self.info.is_last_round() && outcome != Outcome::Aborted {
            true => {
                let scores = self.relative_scores();
                self.notify(ServerMessage::Owari { scores });
                log::info!("[engine] game over");
                Phase::GameOver
            }
            false => Phase::RoundOver(outcome),
        };
    }
}

/// Helpers.
impl Engine {
    /// Installs a freshly dealt round and reveals its first indicator.
    fn seat(&mut self, round: Round) {
        self.round = round;
        self.info.clear_indicators();
        if let Some(tile) = self.round.deck().peek_back(0) {
            self.info.reveal(tile);
        }
        self.record = Record::new(self.id, &self.info, &self.round);
        self.info
            .indicators()
            .iter()
            .for_each(|tile| self.record.push(Play::Indicator { tile: *tile }));
    }
    fn init(&mut self) -> ServerMessage {
        let dice = [self.rng.random_range(1..=6u8), self.rng.random_range(1..=6u8)];
        let indicator = self
            .info
            .indicators()
            .first()
            .map(|t| t.to_string())
            .unwrap_or_default();
        let seed = vec![
            self.info.round().to_string(),
            self.info.honba().to_string(),
            self.info.riichi_sticks().to_string(),
            dice[0].to_string(),
            dice[1].to_string(),
            indicator,
        ];
        ServerMessage::Init {
            seed,
            scores: self.relative_scores(),
            dealer: self.relative(self.info.dealer()),
            hand: self.round.player(self.client_seat()).hand().clone(),
        }
    }
    fn options(&self, seat: Seat) -> Options {
        let player = self.round.player(seat);
        Options {
            tsumo: can_tsumo(player, self.evaluator.as_ref()),
            closed_kan: closed_kan(player),
        }
    }
    fn draw_flags(&self, seat: Seat) -> u8 {
        let options = self.options(seat);
        let tsumo = if options.tsumo { TSUMO_FLAG } else { 0 };
        let kan = if options.closed_kan.is_some() { CallKind::Kan.bit() } else { 0 };
        tsumo | kan
    }
    fn is_client(&self, seat: Seat) -> bool {
        self.round.player(seat).participant() == CLIENT
    }
    /// Whether the server plays this seat itself right now.
    fn drives(&self, seat: Seat) -> bool {
        !self.is_client(seat) || !self.connected
    }
    fn prompt(&self) -> Prompt {
        match self.phase {
            Phase::RoundOver(_) => Prompt::RoundOver,
            Phase::GameOver => Prompt::GameOver,
            _ => Prompt::Continue,
        }
    }
    fn notify<M>(&mut self, message: M)
    where
        M: Into<Message>,
    {
        let message = message.into();
        log::trace!("[engine] queue {}", message);
        self.outbox.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TILES;
    fn tile(n: u8) -> Tile {
        Tile::try_from(n).unwrap()
    }
    fn never(_: &[Tile], _: Tile) -> bool {
        false
    }
    /// Seat `s` holds participant `s`; the wall is drawn front first.
    fn rigged(hands: [&[u8]; N], wall: &[u8]) -> Round {
        let players = std::array::from_fn(|s| {
            Player::new(s, s, Hand::from(hands[s].iter().map(|&i| tile(i)).collect::<Vec<_>>()))
        });
        let deck = Deck::from(wall.iter().map(|&i| tile(i)).collect::<Vec<_>>());
        Round::from((deck, players))
    }
    fn quiet(seed: u64, max_rounds: u32) -> Engine {
        Engine::new(Some(seed), max_rounds)
            .unwrap()
            .with_evaluator(Arc::new(never))
            .with_opponent(0, Box::new(Tsumogiri))
            .with_opponent(1, Box::new(Tsumogiri))
            .with_opponent(2, Box::new(Tsumogiri))
            .with_opponent(3, Box::new(Tsumogiri))
    }
    #[test]
    fn first_round_uses_seed() {
        let engine = Engine::new(Some(42), 8).unwrap();
        let (deck, _) = new_round(Some(42));
        assert!(engine.round().deck().tiles().eq(deck.tiles().skip(52)));
        assert_eq!(engine.round().deck().remaining(), TILES - 52);
        assert_eq!(engine.info().indicators().len(), 1);
        assert!(matches!(engine.phase(), Phase::Seating));
    }
    #[test]
    fn seats_advance_and_tiles_are_conserved() {
        let mut engine = quiet(42, 8);
        assert_eq!(engine.open(), Ok(true));
        let universe = Tile::universe().collect::<Vec<_>>();
        let mut last = None;
        loop {
            if let Phase::AwaitingDraw(seat) = engine.phase() {
                if let Some(prev) = last {
                    assert_eq!(*seat, (prev + 1) % N);
                }
                last = Some(*seat);
            }
            assert_eq!(engine.round().census(), universe);
            match engine.step() {
                Prompt::Continue => continue,
                Prompt::RoundOver => break,
                other => panic!("unexpected {:?}", other),
            }
        }
        assert!(matches!(engine.phase(), Phase::RoundOver(Outcome::Exhausted)));
        assert!(engine.drain().iter().any(|m| m.kind() == "ryuukyoku"));
    }
    #[test]
    fn exhausted_deck_ends_round_not_game() {
        let mut engine = quiet(1, 8).with_round(rigged([&[0], &[4], &[8], &[12]], &[]));
        engine.open().unwrap();
        assert_eq!(engine.step(), Prompt::RoundOver);
        assert!(matches!(engine.phase(), Phase::RoundOver(Outcome::Exhausted)));
        let mut last = quiet(1, 1).with_round(rigged([&[0], &[4], &[8], &[12]], &[]));
        last.open().unwrap();
        assert_eq!(last.step(), Prompt::GameOver);
        assert!(last.drain().iter().any(|m| m.kind() == "owari"));
        assert_eq!(last.open(), Ok(false));
    }
    #[test]
    fn next_round_rotates_dealer() {
        let mut engine = quiet(5, 8).with_round(rigged([&[0], &[4], &[8], &[12]], &[]));
        engine.open().unwrap();
        engine.step();
        assert_eq!(engine.open(), Ok(true));
        assert_eq!(engine.info().round(), 1);
        assert_eq!(engine.info().honba(), 1);
        assert_eq!(engine.info().dealer(), 1);
        assert!(matches!(engine.phase(), Phase::AwaitingDraw(1)));
        assert_eq!(engine.round().deck().remaining(), TILES - 52);
    }
    #[test]
    fn client_discard_must_be_held() {
        let mut engine = quiet(3, 8).with_round(rigged([&[0, 4], &[8], &[12], &[16]], &[20, 24, 28]));
        engine.connect();
        engine.open().unwrap();
        assert_eq!(engine.discard(tile(0)), Err(ProtocolError::violation("not your turn")));
        assert_eq!(engine.step(), Prompt::Continue);
        assert!(matches!(engine.step(), Prompt::Discard { .. }));
        let drawn = engine.drain();
        assert!(drawn.iter().any(|m| m.encode() == "<T20/>"));
        assert!(matches!(engine.discard(tile(8)), Err(ProtocolError::Violation(_))));
        assert_eq!(engine.discard(tile(20)), Ok(()));
        assert!(matches!(engine.phase(), Phase::AwaitingDraw(1)));
    }
    #[test]
    fn automated_ron_closes_window_before_client() {
        // everyone is always complete: seat 1 takes seat 0's discard first
        let mut engine = quiet(3, 8)
            .with_evaluator(Arc::new(|_: &[Tile], _: Tile| true))
            .with_opponent(1, Box::new(Fish::seeded(1)))
            .with_round(rigged([&[0, 4], &[8], &[12], &[16]], &[20, 24, 28]));
        engine.open().unwrap();
        engine.step();
        engine.forfeit();
        assert_eq!(engine.step(), Prompt::RoundOver);
        assert!(matches!(engine.phase(), Phase::RoundOver(Outcome::Win { winner: 1, from: 0, .. })));
        assert_eq!(
            engine.decide(1, Claim::ron()),
            Err(ProtocolError::Stale { round: 0 })
        );
    }
    #[test]
    fn client_prompted_for_call_and_pon_applies() {
        // seat 3 discards 2p; client holds two more and takes it
        let mut engine = quiet(3, 8).with_round(rigged(
            [&[40, 41, 100], &[0], &[4], &[8]],
            &[104, 108, 112, 42, 116, 120],
        ));
        engine.connect();
        engine.open().unwrap();
        engine.step();
        assert!(matches!(engine.step(), Prompt::Discard { .. }));
        engine.discard(tile(104)).unwrap();
        for _ in 0..6 {
            engine.step();
        }
        // seat 3 drew 2p and discarded it; the window is open
        let id = match engine.step() {
            Prompt::Call { id } => id,
            other => panic!("unexpected {:?}", other),
        };
        let flags = engine.drain().into_iter().find(|m| m.kind() == "g42").and_then(|m| m.get("t").map(String::from));
        assert_eq!(flags, Some(CallKind::Pon.bit().to_string()));
        let verdict = engine.decide(id, Claim::Call(CallKind::Pon, Vec::new())).unwrap();
        assert!(matches!(verdict, Verdict::Accepted(Resolution::Meld { seat: 0, .. })));
        assert!(matches!(engine.phase(), Phase::AwaitingDiscard(0)));
        assert_eq!(engine.round().player(0).melds().len(), 1);
        assert!(engine.round().player(3).discards().is_empty());
        assert!(engine.drain().iter().any(|m| m.kind() == "n" && m.get("from_who") == Some("3")));
    }
    #[test]
    fn open_kan_on_discard_draws_replacement() {
        // seat 3 discards the fourth 2p; client holds the other three
        let mut engine = quiet(3, 8).with_round(rigged(
            [&[40, 41, 42, 100], &[0], &[4], &[8]],
            &[104, 108, 112, 43, 116, 120, 124],
        ));
        engine.connect();
        engine.open().unwrap();
        engine.step();
        assert!(matches!(engine.step(), Prompt::Discard { .. }));
        engine.discard(tile(104)).unwrap();
        for _ in 0..6 {
            engine.step();
        }
        let id = match engine.step() {
            Prompt::Call { id } => id,
            other => panic!("unexpected {:?}", other),
        };
        let flags = engine.drain().into_iter().find(|m| m.kind() == "g43").and_then(|m| m.get("t").map(String::from));
        assert_eq!(flags, Some((CallKind::Kan.bit() | CallKind::Pon.bit()).to_string()));
        let verdict = engine.decide(id, Claim::Call(CallKind::Kan, Vec::new())).unwrap();
        assert!(matches!(verdict, Verdict::Accepted(Resolution::Meld { seat: 0, kind: CallKind::Kan, .. })));
        assert!(engine.round().player(0).melds()[0].is_kan());
        assert_eq!(engine.round().player(0).drawn(), Some(tile(116)));
        assert_eq!(engine.info().indicators().len(), 2);
        assert!(matches!(engine.phase(), Phase::AwaitingDiscard(0)));
        let kinds = engine.drain().iter().map(|m| m.kind().to_string()).collect::<Vec<_>>();
        assert_eq!(kinds, vec!["n", "dora", "t116"]);
    }
    #[test]
    fn closed_kan_reveals_and_replaces() {
        let mut engine = quiet(3, 8).with_round(rigged(
            [&[0, 1, 2, 40], &[44], &[48], &[52]],
            &[3, 100, 104, 108, 112],
        ));
        engine.connect();
        engine.open().unwrap();
        engine.step();
        assert!(matches!(engine.step(), Prompt::Discard { .. }));
        let drawn = engine.drain().into_iter().find(|m| m.kind() == "t3");
        assert_eq!(drawn.and_then(|m| m.get("t").map(String::from)), Some(CallKind::Kan.bit().to_string()));
        engine.declare_kan().unwrap();
        assert_eq!(engine.info().indicators().len(), 2);
        assert_eq!(engine.round().player(0).drawn(), Some(tile(100)));
        assert!(matches!(engine.phase(), Phase::AwaitingDiscard(0)));
        let kinds = engine.drain().iter().map(|m| m.kind().to_string()).collect::<Vec<_>>();
        assert_eq!(kinds, vec!["n", "dora", "t100"]);
        assert!(engine.declare_kan().is_err());
    }
    #[test]
    fn riichi_only_on_own_turn() {
        let mut engine = quiet(3, 8).with_round(rigged([&[0, 4], &[8], &[12], &[16]], &[20, 24]));
        engine.connect();
        engine.open().unwrap();
        assert!(engine.reach().is_err());
        engine.step();
        engine.drain();
        assert_eq!(engine.reach(), Ok(()));
        assert_eq!(engine.info().riichi_sticks(), 1);
        assert!(engine.round().player(0).is_riichi());
        assert_eq!(engine.drain()[0].encode(), r#"<REACH who="0" step="1"/>"#);
        assert!(engine.reach().is_err());
    }
}
