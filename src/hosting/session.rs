use super::*;
use crate::CLIENT;
use crate::N;
use crate::gameroom::*;
use crate::protocol::*;
use tokio::io::AsyncRead;
use tokio::io::AsyncWrite;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;
use tokio::sync::mpsc::unbounded_channel;

/// Sex code advertised for automated seats.
const BOT_SEX: &str = "C";

/// How a connection ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    /// The client sent `exit`.
    Exit,
    /// The stream closed or failed; the table keeps going.
    Disconnected,
}

/// One client connection: the sole writer of its stream.
///
/// Frames are read on a separate task and offered to the room's router
/// first; whatever nobody waits for is handled inline. Outbound messages
/// from the dealer are written as they arrive.
pub struct Session<'a> {
    room: &'a mut Room,
    profile: &'a mut Profile,
    joined: bool,
}

impl<'a> Session<'a> {
    pub fn new(room: &'a mut Room, profile: &'a mut Profile) -> Self {
        Self {
            room,
            profile,
            joined: false,
        }
    }
    pub async fn run<S>(mut self, stream: S) -> Ending
    where
        S: AsyncRead + AsyncWrite + Send + 'static,
    {
        let (read, mut write) = tokio::io::split(stream);
        let (tx, mut frames) = unbounded_channel::<Message>();
        let reader = tokio::spawn(async move {
            let ref mut reader = BufReader::new(read);
            loop {
                match read_frame(reader).await {
                    Ok(Some(frame)) if frame.is_empty() => continue,
                    Ok(Some(frame)) => {
                        if tx.send(Message::decode(&frame)).is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        log::debug!("[session] read failed: {}", e);
                        break;
                    }
                }
            }
        });
        self.room.discard_backlog().await;
        let outbound = self.room.outbound();
        log::info!("[session] connected to table {}", self.room.id());
        let ending = 'sesh: loop {
            tokio::select! {
                biased;
                message = async { outbound.lock().await.recv().await } => match message {
                    Some(message) => if Self::write(&mut write, &message).await.is_err() { break 'sesh Ending::Disconnected },
                    None => break 'sesh Ending::Disconnected,
                },
                message = frames.recv() => match message {
                    Some(message) if message.is_empty() => continue 'sesh,
                    Some(message) if message.kind() == EXIT => break 'sesh Ending::Exit,
                    Some(message) => {
                        for reply in self.dispatch(&message).await {
                            if Self::write(&mut write, &reply).await.is_err() {
                                break 'sesh Ending::Disconnected;
                            }
                        }
                    }
                    None => break 'sesh Ending::Disconnected,
                },
            }
        };
        reader.abort();
        self.hangup().await;
        log::info!("[session] ended: {:?}", ending);
        ending
    }
    async fn write<W>(write: &mut W, message: &Message) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        log::trace!("[session] >> {}", message);
        write.write_all(&frame(message)).await?;
        write.flush().await
    }
    /// The autopilot takes over and every outstanding wait is withdrawn.
    async fn hangup(&mut self) {
        self.room.engine().lock().await.disconnect();
        self.room.router().cancel_all();
    }
}

impl Session<'_> {
    /// Handles one inbound message and returns the direct replies.
    async fn dispatch(&mut self, message: &Message) -> Vec<Message> {
        log::trace!("[session] << {}", message);
        if self.room.router().deliver(message) {
            return Vec::new();
        }
        let result = match Inbound::from(message) {
            Inbound::Helo { name, tid, sx } => self.profile.helo(name, tid, sx).map(Some),
            Inbound::Auth { val } => self.profile.auth(&val).map(Some),
            Inbound::Pxr(game) => self.profile.pxr(game).map(|_| None),
            Inbound::Gok => {
                self.profile.gok();
                Ok(None)
            }
            Inbound::KeepAlive => Ok(None),
            Inbound::Join { table } => return self.join(&table).await,
            Inbound::NextReady => self.ready().await.map(|_| None),
            Inbound::Reach { .. } => self.reach().await.map(|_| None),
            Inbound::Discard { .. } => Err(self.room.engine().lock().await.unsolicited()),
            Inbound::Claim(_) | Inbound::Tsumo | Inbound::ClosedKan { .. } => {
                let round = self.room.engine().lock().await.info().round();
                Err(ProtocolError::Stale { round })
            }
            Inbound::Invalid { kind, reason } => Err(ProtocolError::violation(format!("{}: {}", kind, reason))),
            Inbound::Unknown(message) => {
                log::debug!("[session] ignoring <{}>", message.kind());
                Ok(None)
            }
            Inbound::Exit => Ok(None),
        };
        match result {
            Ok(reply) => reply.into_iter().map(Message::from).collect(),
            Err(ProtocolError::Violation(reason)) => {
                log::debug!("[session] violation: {}", reason);
                vec![ServerMessage::err(&reason).into()]
            }
            Err(e) => {
                log::debug!("[session] dropped {}", e);
                Vec::new()
            }
        }
    }
    /// Seats the client: lobby broadcast, then a dealer waiting on `nextready`.
    async fn join(&mut self, table: &str) -> Vec<Message> {
        if !self.profile.is_greeted() {
            return vec![ServerMessage::err("not authenticated").into()];
        }
        let lobby = {
            let engine = self.room.engine();
            let mut engine = engine.lock().await;
            engine.connect();
            let client = engine.client_seat();
            let names = std::array::from_fn(|i| {
                match engine.round().player((client + i) % N).participant() {
                    CLIENT => self.profile.name().to_string(),
                    p => format!("Player{}", p),
                }
            });
            let dans = std::array::from_fn(|i| if i == 0 { self.profile.dan() } else { 0 });
            let sexes = std::array::from_fn(|i| match i {
                0 => self.profile.sex().to_string(),
                _ => BOT_SEX.to_string(),
            });
            vec![
                ServerMessage::Go {
                    kind: table.chars().next().map(String::from).unwrap_or_default(),
                },
                ServerMessage::Taikyoku {
                    oya: client,
                    log: self.room.id().to_string(),
                },
                ServerMessage::Un { names, dans, sexes },
            ]
        };
        log::info!(
            "[session] {} ({}) joined table {}",
            self.profile.name(),
            self.profile.tid(),
            self.room.id()
        );
        self.joined = true;
        if !self.room.is_dealing() {
            match self.room.router().register(NEXTREADY) {
                Ok(ready) => {
                    self.room.deal(Some(ready)).await;
                }
                Err(e) => log::error!("[session] cannot wait for ready: {}", e),
            }
        }
        lobby.into_iter().map(Message::from).collect()
    }
    /// A `nextready` nobody waits for. Before the handshake and join it is a
    /// violation; afterwards it restarts a dealer that is no longer running.
    async fn ready(&mut self) -> Result<(), ProtocolError> {
        if !self.profile.is_greeted() {
            return Err(ProtocolError::violation("not authenticated"));
        }
        if !self.joined {
            return Err(ProtocolError::violation("not joined"));
        }
        self.room.deal(None).await;
        Ok(())
    }
    async fn reach(&mut self) -> Result<(), ProtocolError> {
        let engine = self.room.engine();
        let mut engine = engine.lock().await;
        engine.reach()?;
        self.room.post(engine.drain());
        Ok(())
    }
}
