//! Inter-worker transport.
//!
//! The protocol layers only talk to [`Communicator`]; [`LocalWorld`] is the
//! in-process implementation where each rank runs on its own thread and owns
//! its endpoint outright.

pub mod types;
pub mod local;

pub use types::{AbortSignal, Communicator, Envelope, Message, Tag, TransportError};
pub use local::{LocalEndpoint, LocalWorld};
