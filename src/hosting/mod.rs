//! Connection handling: handshake profile, session loop and the TCP server.
mod config;
mod profile;
mod server;
mod session;

pub use config::*;
pub use profile::*;
pub use server::*;
pub use session::*;
