//! Real-time push infrastructure for notification delivery.
//!
//! This crate owns the process-wide registry of open push channels and the
//! envelope format written to them. It knows nothing about transports: the web
//! layer upgrades a request to a WebSocket, authenticates the caller, opens a
//! [`Channel`](connection::Channel) and forwards whatever arrives on the
//! channel's queue to the socket.
//!
//! # Architecture
//!
//! - **Many channels per recipient**: every open browser tab or device holds
//!   its own channel; a broadcast reaches all of them.
//! - **Per-key locking**: the registry is a `DashMap` from recipient id to
//!   that recipient's channels. Register, unregister and broadcast for one
//!   recipient are serialized by the map's shard lock, so a broadcast never
//!   observes a set mid-mutation and never reaches a channel whose
//!   unregistration has already returned.
//! - **Non-blocking fan-out**: each channel has an unbounded queue, so a
//!   broadcast only enqueues and never waits on a slow socket.
//! - **Ephemeral**: registrations live in memory on one instance only. A
//!   recipient connected to another instance is not reached.
//!
//! # Modules
//!
//! - `connection`: `ConnectionRegistry`, `Channel`, `ChannelId`
//! - `envelope`: the JSON frame pushed for each notification

pub mod connection;
pub mod envelope;

pub use connection::{Channel, ChannelId, ConnectionRegistry, RecipientId};
pub use envelope::Envelope;
