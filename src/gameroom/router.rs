use super::*;
use crate::protocol::Message;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::oneshot;

type Slot = (u64, oneshot::Sender<Message>);

/// Message exchange registry: at most one waiter per message type.
///
/// The session loop offers every inbound message to [`Router::deliver`]
/// before its own dispatcher; a registered [`Waiter`] consumes the first
/// match. Cloning shares the same registry.
#[derive(Clone, Default)]
pub struct Router {
    waiters: Arc<Mutex<HashMap<String, Slot>>>,
    tickets: Arc<AtomicU64>,
}

impl Router {
    /// Registers interest in the next message of `kind`.
    ///
    /// Register before sending whatever prompts the client, so the answer
    /// can never arrive ahead of the registration.
    pub fn register(&self, kind: &str) -> Result<Waiter, RouterError> {
        let kind = kind.to_lowercase();
        let mut waiters = self.waiters.lock().expect("router lock poisoned");
        if waiters.contains_key(&kind) {
            log::error!("[router] duplicate wait for <{}>", kind);
            return Err(RouterError::DuplicateWait(kind));
        }
        let ticket = self.tickets.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        waiters.insert(kind.clone(), (ticket, tx));
        log::trace!("[router] waiting on <{}> #{}", kind, ticket);
        Ok(Waiter {
            kind,
            ticket,
            rx,
            waiters: self.waiters.clone(),
        })
    }
    /// Hands the message to its waiter. False means nobody was waiting and
    /// the message falls through to the unsolicited handler.
    pub fn deliver(&self, message: &Message) -> bool {
        let slot = self
            .waiters
            .lock()
            .expect("router lock poisoned")
            .remove(message.kind());
        match slot {
            Some((ticket, tx)) => match tx.send(message.clone()) {
                Ok(()) => {
                    log::trace!("[router] delivered <{}> to #{}", message.kind(), ticket);
                    true
                }
                Err(_) => false,
            },
            None => false,
        }
    }
    /// Withdraws the waiter for `kind`, if any. Its wait ends as cancelled.
    pub fn cancel(&self, kind: &str) -> bool {
        self.waiters
            .lock()
            .expect("router lock poisoned")
            .remove(&kind.to_lowercase())
            .inspect(|(ticket, _)| log::debug!("[router] cancelled <{}> #{}", kind, ticket))
            .is_some()
    }
    /// Withdraws every waiter.
    pub fn cancel_all(&self) -> usize {
        let mut waiters = self.waiters.lock().expect("router lock poisoned");
        let n = waiters.len();
        waiters.clear();
        if n > 0 {
            log::debug!("[router] cancelled {} waits", n);
        }
        n
    }
    pub fn is_waiting(&self, kind: &str) -> bool {
        self.waiters
            .lock()
            .expect("router lock poisoned")
            .contains_key(&kind.to_lowercase())
    }
}

/// A registered wait. Dropping it unregisters it, so a closed wait never
/// swallows a later message.
pub struct Waiter {
    kind: String,
    ticket: u64,
    rx: oneshot::Receiver<Message>,
    waiters: Arc<Mutex<HashMap<String, Slot>>>,
}

impl Waiter {
    pub fn kind(&self) -> &str {
        &self.kind
    }
    /// Resolves with the delivered message, or fails on deadline or cancel.
    /// `None` waits indefinitely.
    pub async fn recv(&mut self, timeout: Option<Duration>) -> Result<Message, RouterError> {
        let received = match timeout {
            Some(limit) => tokio::time::timeout(limit, &mut self.rx)
                .await
                .map_err(|_| RouterError::TimedOut)?,
            None => (&mut self.rx).await,
        };
        received.map_err(|_| RouterError::Cancelled)
    }
}

impl Drop for Waiter {
    fn drop(&mut self) {
        if let Ok(mut waiters) = self.waiters.lock() {
            if waiters.get(&self.kind).is_some_and(|(t, _)| *t == self.ticket) {
                waiters.remove(&self.kind);
            }
        }
    }
}
