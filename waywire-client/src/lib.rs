//! A typed client library for the Wayland wire protocol.
//!
//! waywire speaks to the compositor over its Unix-domain socket directly.
//! The [`Connection`] frames typed requests and events in the 32-bit-word
//! wire format and moves file descriptors over SCM_RIGHTS ancillary data;
//! the [`IdPool`] hands out object ids and recycles them on
//! `wl_display.delete_id`; [`register_globals`] drives the registry
//! handshake that binds the globals a program needs.
//!
//! The library is deliberately low level: there is no proxy layer and no
//! event loop. You own the read loop, match on each message's object id,
//! and decode with the `Event` enum of the interface you created that
//! object with. Decoded strings and arrays borrow the connection's receive
//! buffer and are invalidated by the next [`Connection::recv`].
//!
//! Logging goes through the `log` facade; nothing is printed unless the
//! embedding program installs a logger.

pub mod connection;
pub mod globals;
pub mod id_pool;
pub mod protocol;

pub use waywire_core as core;

pub use connection::{ConnectError, Connection, EmptyFdQueue, RecvError, SendError};
pub use globals::{register_globals, BootstrapError};
pub use id_pool::IdPool;
