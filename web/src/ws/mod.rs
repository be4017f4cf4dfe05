//! Live push channel over WebSocket.
//!
//! Channels live in this process only. A client connected to another
//! instance behind a load balancer does not receive pushes broadcast here.

pub(crate) mod handler;
