use super::*;
use tokio::net::TcpListener;

/// Accept loop for a single table.
///
/// One connection is served at a time. When it drops, the table keeps
/// playing on autopilot and the next connection on the same listener
/// resumes it; `exit` shuts the server down.
pub struct Server;

impl Server {
    pub async fn run(config: Config) -> anyhow::Result<()> {
        let listener = TcpListener::bind(&config.bind).await?;
        log::info!("[server] listening on {}", listener.local_addr()?);
        Self::serve(listener, config).await
    }
    pub async fn serve(listener: TcpListener, config: Config) -> anyhow::Result<()> {
        let mut room = config.room()?;
        let mut profile = Profile::default();
        loop {
            let (stream, addr) = listener.accept().await?;
            stream.set_nodelay(true)?;
            log::info!("[server] client connected from {}", addr);
            match Session::new(&mut room, &mut profile).run(stream).await {
                Ending::Exit => break,
                Ending::Disconnected => log::warn!("[server] client {} disconnected, awaiting reconnect", addr),
            }
        }
        room.close();
        log::info!("[server] stopped");
        Ok(())
    }
}
