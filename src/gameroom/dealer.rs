use super::*;
use crate::protocol::*;
use crate::table::Rejection;
use crate::table::Verdict;
use crate::table::Claim;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::MutexGuard;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Background task that drives the engine through rounds.
///
/// Every wait on the client goes through the [`Router`], so the session loop
/// stays free to read frames while a decision is outstanding. Waits are
/// registered under the engine lock before the prompting messages leave the
/// outbox, which means an answer can never overtake its registration.
pub struct Dealer {
    engine: Arc<Mutex<Engine>>,
    router: Router,
    tx: UnboundedSender<Message>,
    timer: Timer,
    records: Option<PathBuf>,
    last: Prompt,
}

impl Dealer {
    pub fn new(
        engine: Arc<Mutex<Engine>>,
        router: Router,
        tx: UnboundedSender<Message>,
        timer: TimerConfig,
        records: Option<PathBuf>,
    ) -> Self {
        Self {
            engine,
            router,
            tx,
            timer: Timer::new(timer),
            records,
            last: Prompt::Idle,
        }
    }
    /// Runs the dealer on its own task. With a `ready` wait the first round
    /// opens on the client's `nextready`; without one it opens at once.
    pub fn spawn(self, ready: Option<Waiter>) -> JoinHandle<Result<(), RouterError>> {
        tokio::spawn(self.run(ready))
    }
    async fn run(mut self, mut ready: Option<Waiter>) -> Result<(), RouterError> {
        log::debug!("[dealer] started");
        loop {
            if let Some(waiter) = ready.take() {
                if !self.ready(waiter).await {
                    log::info!("[dealer] client gone between rounds, parking table");
                    return Ok(());
                }
            }
            if !self.open().await {
                return Ok(());
            }
            match self.play().await? {
                Some(waiter) => ready = Some(waiter),
                None => return Ok(()),
            }
        }
    }
}

impl Dealer {
    /// Waits for `nextready`. A missing answer past the deadline counts as
    /// ready; a cancelled wait means the client left.
    async fn ready(&mut self, mut waiter: Waiter) -> bool {
        match waiter.recv(self.timer.config().ready).await {
            Ok(_) => true,
            Err(RouterError::TimedOut) => true,
            Err(_) => false,
        }
    }
    async fn open(&mut self) -> bool {
        let mut engine = self.engine.lock().await;
        let opened = engine
            .open()
            .inspect_err(|e| log::error!("[dealer] cannot deal: {}", e))
            .unwrap_or(false);
        self.flush(&mut engine);
        opened
    }
    /// Steps the current round to its end. Returns the `nextready` wait for
    /// the following round, or `None` once the game is over.
    async fn play(&mut self) -> Result<Option<Waiter>, RouterError> {
        loop {
            let mut engine = self.engine.lock().await;
            let prompt = engine.step();
            // the same prompt again means a rejected answer; its deadline keeps running
            let repeat = prompt == self.last;
            self.last = prompt;
            match prompt {
                Prompt::Continue => {
                    self.flush(&mut engine);
                    drop(engine);
                    self.timer.pace().await;
                }
                Prompt::Discard { .. } => {
                    let d = self.router.register(DISCARD)?;
                    let n = self.router.register(CALL)?;
                    self.flush(&mut engine);
                    drop(engine);
                    if !repeat {
                        self.timer.start_discard();
                    }
                    self.discard(d, n).await;
                }
                Prompt::Call { id } => {
                    let n = self.router.register(CALL)?;
                    self.flush(&mut engine);
                    drop(engine);
                    if !repeat {
                        self.timer.start_decision();
                    }
                    self.call(id, n).await;
                }
                Prompt::RoundOver => {
                    self.archive(&engine);
                    let ready = self.router.register(NEXTREADY)?;
                    self.flush(&mut engine);
                    return Ok(Some(ready));
                }
                Prompt::GameOver => {
                    self.archive(&engine);
                    self.flush(&mut engine);
                    log::info!("[dealer] game over");
                    return Ok(None);
                }
                Prompt::Idle => {
                    self.flush(&mut engine);
                    return Ok(None);
                }
            }
        }
    }
}

/// Client decisions.
impl Dealer {
    async fn discard(&mut self, mut d: Waiter, mut n: Waiter) {
        let remaining = self.timer.remaining();
        let received = tokio::select! {
            m = d.recv(remaining) => m,
            m = n.recv(remaining) => m,
        };
        let mut engine = self.engine.lock().await;
        let result = match received {
            Ok(message) => match Inbound::from(&message) {
                Inbound::Discard { tile } => engine.discard(tile),
                Inbound::Tsumo => engine.declare_tsumo(),
                Inbound::ClosedKan { .. } => engine.declare_kan(),
                Inbound::Claim(_) => Err(ProtocolError::violation("no call window open")),
                Inbound::Invalid { reason, .. } => Err(ProtocolError::violation(reason)),
                _ => Ok(()),
            },
            Err(RouterError::TimedOut) => {
                log::info!("[dealer] discard timed out, autopilot plays");
                engine.forfeit();
                Ok(())
            }
            Err(_) => Ok(()),
        };
        self.answer(result);
        self.flush(&mut engine);
    }
    async fn call(&mut self, id: u64, mut n: Waiter) {
        let received = n.recv(self.timer.remaining()).await;
        let mut engine = self.engine.lock().await;
        let result = match received {
            Ok(message) => match Inbound::from(&message) {
                Inbound::Claim(claim) => match engine.decide(id, claim) {
                    Ok(Verdict::Rejected(Rejection::NotEligible)) => {
                        self.answer(Err(ProtocolError::violation("call not available")));
                        engine.decide(id, Claim::Decline).map(|_| ())
                    }
                    Ok(verdict) => {
                        log::debug!("[dealer] call window {}: {:?}", id, verdict);
                        Ok(())
                    }
                    Err(e) => Err(e),
                },
                Inbound::Invalid { reason, .. } => Err(ProtocolError::violation(reason)),
                _ => Err(ProtocolError::violation("a call decision is pending")),
            },
            Err(RouterError::TimedOut) => {
                log::debug!("[dealer] call window {} timed out", id);
                engine.expire(id);
                Ok(())
            }
            Err(_) => Ok(()),
        };
        self.answer(result);
        self.flush(&mut engine);
    }
    /// Violations are answered with `err`; stale answers are dropped.
    fn answer(&self, result: Result<(), ProtocolError>) {
        match result {
            Ok(()) => {}
            Err(ProtocolError::Violation(reason)) => {
                log::debug!("[dealer] violation: {}", reason);
                self.send(ServerMessage::err(&reason).into());
            }
            Err(e @ ProtocolError::Stale { .. }) => log::debug!("[dealer] dropped {}", e),
        }
    }
}

impl Dealer {
    fn flush(&self, engine: &mut MutexGuard<'_, Engine>) {
        engine.drain().into_iter().for_each(|m| self.send(m));
    }
    fn send(&self, message: Message) {
        if self.tx.send(message).is_err() {
            log::debug!("[dealer] outbound channel closed");
        }
    }
    /// Logs the finished round and writes it out if a directory is configured.
    fn archive(&self, engine: &Engine) {
        let record = engine.record();
        log::debug!("[dealer] record {}", record.to_json());
        if let Some(dir) = &self.records {
            match record.save(dir) {
                Ok(path) => log::info!("[dealer] saved {}", path.display()),
                Err(e) => log::warn!("[dealer] cannot save record: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiles::*;
    use crate::table::Player;
    use crate::table::Round;
    use std::time::Duration;
    use tokio::sync::mpsc::unbounded_channel;

    fn tile(n: u8) -> Tile {
        Tile::try_from(n).unwrap()
    }
    /// Lets the dealer task run until it blocks again.
    async fn settle() {
        for _ in 0..32 {
            tokio::task::yield_now().await;
        }
    }
    #[tokio::test(start_paused = true)]
    async fn replacement_draw_gets_a_fresh_discard_deadline() {
        // client draws the fourth 1m and may declare a closed kan
        let hands: [&[u8]; 4] = [&[0, 1, 2, 40], &[44], &[48], &[52]];
        let players = std::array::from_fn(|s| {
            Player::new(s, s, Hand::from(hands[s].iter().map(|&i| tile(i)).collect::<Vec<_>>()))
        });
        let deck = Deck::from([3, 100, 104, 108, 112].iter().map(|&i| tile(i)).collect::<Vec<_>>());
        let mut engine = (0..4).fold(Engine::new(Some(1), 8).unwrap(), |engine, p| {
            engine.with_opponent(p, Box::new(Tsumogiri))
        });
        engine = engine
            .with_evaluator(Arc::new(|_: &[Tile], _: Tile| false))
            .with_round(Round::from((deck, players)));
        engine.connect();
        let engine = Arc::new(Mutex::new(engine));
        let router = Router::default();
        let (tx, _rx) = unbounded_channel();
        let timer = TimerConfig {
            discard: Some(Duration::from_secs(1)),
            ..TimerConfig::instant()
        };
        let _dealer = Dealer::new(engine.clone(), router.clone(), tx, timer, None).spawn(None);
        settle().await;
        assert!(router.is_waiting(DISCARD));
        tokio::time::advance(Duration::from_millis(600)).await;
        assert!(router.deliver(&Message::decode(r#"<N type="4" hai0="3"/>"#)));
        settle().await;
        assert_eq!(engine.lock().await.round().player(0).melds().len(), 1);
        assert!(router.is_waiting(DISCARD));
        // the first deadline would have passed by now
        tokio::time::advance(Duration::from_millis(600)).await;
        settle().await;
        {
            let engine = engine.lock().await;
            assert!(matches!(engine.phase(), Phase::AwaitingDiscard(0)));
            assert!(engine.round().player(0).discards().is_empty());
        }
        tokio::time::advance(Duration::from_millis(500)).await;
        settle().await;
        let engine = engine.lock().await;
        assert_eq!(engine.round().player(0).discards().first(), Some(&tile(100)));
    }
}
