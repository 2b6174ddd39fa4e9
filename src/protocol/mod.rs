//! Tag-based wire protocol: codec, NUL framing, and typed message catalogue.
mod frame;
mod inbound;
mod message;
mod outbound;

pub use frame::*;
pub use inbound::*;
pub use message::*;
pub use outbound::*;
