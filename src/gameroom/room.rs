use super::*;
use crate::ID;
use crate::protocol::Message;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio::task::JoinHandle;

type Rx = Arc<Mutex<UnboundedReceiver<Message>>>;

/// One table and everything that outlives a single connection:
/// the engine, the router, the outbound queue and the dealer task.
///
/// Sessions come and go; the room keeps the round in play between them.
pub struct Room {
    id: ID<Engine>,
    engine: Arc<Mutex<Engine>>,
    router: Router,
    tx: UnboundedSender<Message>,
    rx: Rx,
    dealer: Option<JoinHandle<Result<(), RouterError>>>,
    timer: TimerConfig,
    records: Option<PathBuf>,
}

impl Room {
    pub fn new(engine: Engine, timer: TimerConfig, records: Option<PathBuf>) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            id: engine.id(),
            engine: Arc::new(Mutex::new(engine)),
            router: Router::default(),
            tx,
            rx: Arc::new(Mutex::new(rx)),
            dealer: None,
            timer,
            records,
        }
    }
    pub fn id(&self) -> ID<Engine> {
        self.id
    }
    pub fn engine(&self) -> Arc<Mutex<Engine>> {
        self.engine.clone()
    }
    pub fn router(&self) -> &Router {
        &self.router
    }
    /// Messages produced by the dealer, in order.
    pub fn outbound(&self) -> Rx {
        self.rx.clone()
    }
    /// Queues messages behind everything the dealer already sent.
    pub fn post(&self, messages: Vec<Message>) {
        for message in messages {
            if self.tx.send(message).is_err() {
                log::debug!("[room] outbound channel closed");
            }
        }
    }
    pub fn is_dealing(&self) -> bool {
        self.dealer.as_ref().is_some_and(|h| !h.is_finished())
    }
    /// Drops whatever queued up while nobody was connected.
    pub async fn discard_backlog(&self) -> usize {
        let mut rx = self.rx.lock().await;
        let mut n = 0;
        while rx.try_recv().is_ok() {
            n += 1;
        }
        if n > 0 {
            log::debug!("[room] discarded {} queued messages", n);
        }
        n
    }
    /// Starts a dealer unless one is already running.
    ///
    /// A dealer that died with an error leaves its round unresolved; that
    /// round is aborted first so the new dealer replays it.
    pub async fn deal(&mut self, ready: Option<Waiter>) -> bool {
        if self.is_dealing() {
            return false;
        }
        if let Some(handle) = self.dealer.take() {
            let failed = match handle.await {
                Ok(Ok(())) => false,
                Ok(Err(e)) => {
                    log::error!("[room] dealer failed: {}", e);
                    true
                }
                Err(e) => {
                    log::error!("[room] dealer panicked: {}", e);
                    true
                }
            };
            if failed {
                self.engine.lock().await.abort();
            }
        }
        let dealer = Dealer::new(
            self.engine.clone(),
            self.router.clone(),
            self.tx.clone(),
            self.timer,
            self.records.clone(),
        );
        self.dealer = Some(dealer.spawn(ready));
        log::debug!("[room] dealer started for table {}", self.id);
        true
    }
    /// Stops the dealer and withdraws its waits.
    pub fn close(&mut self) {
        if let Some(handle) = self.dealer.take() {
            handle.abort();
        }
        self.router.cancel_all();
        log::info!("[room] closed table {}", self.id);
    }
}
