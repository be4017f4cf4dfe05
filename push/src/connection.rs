use crate::envelope::{Envelope, EventType};
use dashmap::DashMap;
use log::*;
use std::collections::HashMap;
use std::fmt;
use tokio::sync::mpsc::{self, error::SendError, UnboundedReceiver, UnboundedSender};

/// Identity of the user owning a set of channels (matches `entity::Id`).
pub type RecipientId = uuid::Uuid;

/// Unique identifier for a channel (server-generated)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for ChannelId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle to one open push connection.
///
/// The registry holds the sending half; the transport task owning the socket
/// holds the receiving half returned by [`Channel::open`]. Once that task ends
/// and drops the receiver, pushes to this channel fail.
#[derive(Debug, Clone)]
pub struct Channel {
    id: ChannelId,
    sender: UnboundedSender<Envelope>,
}

impl Channel {
    pub fn open() -> (Self, UnboundedReceiver<Envelope>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                id: ChannelId::new(),
                sender,
            },
            receiver,
        )
    }

    pub fn id(&self) -> &ChannelId {
        &self.id
    }

    fn push(&self, envelope: Envelope) -> Result<(), SendError<Envelope>> {
        self.sender.send(envelope)
    }
}

/// Process-wide map from recipient to that recipient's open channels.
///
/// All three operations on a recipient take that recipient's map entry lock,
/// so they never interleave with each other for the same key. No entry is
/// kept for a recipient without channels.
pub struct ConnectionRegistry {
    channels: DashMap<RecipientId, HashMap<ChannelId, Channel>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Adds `channel` to the recipient's set. Callers must have authenticated
    /// the channel's owner as `recipient_id` beforehand.
    pub fn register(&self, recipient_id: RecipientId, channel: Channel) -> ChannelId {
        let channel_id = channel.id().clone();

        self.channels
            .entry(recipient_id)
            .or_default()
            .insert(channel_id.clone(), channel);

        info!("Registered push channel {channel_id} for recipient {recipient_id}");
        channel_id
    }

    /// Removes a channel, dropping the recipient's entry once it is empty.
    ///
    /// Returns whether the channel was registered. After this returns, no
    /// broadcast can reach the channel.
    pub fn unregister(&self, recipient_id: RecipientId, channel_id: &ChannelId) -> bool {
        let mut removed = false;

        self.channels.remove_if_mut(&recipient_id, |_, channels| {
            removed = channels.remove(channel_id).is_some();
            channels.is_empty()
        });

        if removed {
            info!("Unregistered push channel {channel_id} for recipient {recipient_id}");
        } else {
            debug!("Push channel {channel_id} for recipient {recipient_id} was not registered");
        }
        removed
    }

    /// Pushes `envelope` to every open channel of `recipient_id` and returns
    /// how many accepted it.
    ///
    /// A recipient without channels is a no-op. A channel whose transport has
    /// gone away is logged and skipped; it stays registered until its own
    /// transport task unregisters it.
    pub fn broadcast(&self, recipient_id: RecipientId, envelope: &Envelope) -> usize {
        let Some(channels) = self.channels.get(&recipient_id) else {
            debug!("No open push channels for recipient {recipient_id}");
            return 0;
        };

        let mut delivered = 0;
        for (channel_id, channel) in channels.iter() {
            match channel.push(envelope.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => warn!(
                    "Failed to push {} to channel {channel_id} of recipient {recipient_id}: {e}",
                    envelope.event_type()
                ),
            }
        }

        debug!(
            "Pushed {} to {delivered}/{} channel(s) of recipient {recipient_id}",
            envelope.event_type(),
            channels.len()
        );
        delivered
    }

    /// Number of channels currently open for `recipient_id`.
    pub fn connection_count(&self, recipient_id: RecipientId) -> usize {
        self.channels
            .get(&recipient_id)
            .map(|channels| channels.len())
            .unwrap_or(0)
    }

    /// Number of recipients with at least one open channel.
    pub fn recipient_count(&self) -> usize {
        self.channels.len()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
    use std::sync::Arc;
    use std::thread;
    use tokio::sync::mpsc::error::TryRecvError;

    fn envelope(message: &str) -> Envelope {
        Envelope::notification(message, None, None)
    }

    #[test]
    fn broadcast_reaches_every_channel_of_the_recipient() {
        let registry = ConnectionRegistry::new();
        let recipient = RecipientId::new_v4();

        let mut receivers = Vec::new();
        for _ in 0..3 {
            let (channel, rx) = Channel::open();
            registry.register(recipient, channel);
            receivers.push(rx);
        }

        let sent = envelope("hello");
        assert_eq!(registry.broadcast(recipient, &sent), 3);

        for rx in receivers.iter_mut() {
            assert_eq!(rx.try_recv().unwrap(), sent);
        }
    }

    #[test]
    fn broadcast_only_reaches_the_target_recipient() {
        let registry = ConnectionRegistry::new();
        let (alice_channel, mut alice_rx) = Channel::open();
        let (bob_channel, mut bob_rx) = Channel::open();
        let alice = RecipientId::new_v4();
        registry.register(alice, alice_channel);
        registry.register(RecipientId::new_v4(), bob_channel);

        registry.broadcast(alice, &envelope("for alice"));

        assert!(alice_rx.try_recv().is_ok());
        assert_eq!(bob_rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn broadcast_to_recipient_without_channels_is_a_no_op() {
        let registry = ConnectionRegistry::new();

        assert_eq!(
            registry.broadcast(RecipientId::new_v4(), &envelope("nobody")),
            0
        );
        assert_eq!(registry.recipient_count(), 0);
    }

    #[test]
    fn unregistering_the_last_channel_removes_the_recipient_entry() {
        let registry = ConnectionRegistry::new();
        let recipient = RecipientId::new_v4();
        let (first, _first_rx) = Channel::open();
        let (second, _second_rx) = Channel::open();
        let first_id = registry.register(recipient, first);
        let second_id = registry.register(recipient, second);

        assert!(registry.unregister(recipient, &first_id));
        assert_eq!(registry.connection_count(recipient), 1);
        assert_eq!(registry.recipient_count(), 1);

        assert!(registry.unregister(recipient, &second_id));
        assert_eq!(registry.connection_count(recipient), 0);
        assert_eq!(registry.recipient_count(), 0);
    }

    #[test]
    fn unregistering_an_unknown_channel_is_harmless() {
        let registry = ConnectionRegistry::new();
        let recipient = RecipientId::new_v4();
        let (channel, _rx) = Channel::open();
        registry.register(recipient, channel);

        assert!(!registry.unregister(recipient, &ChannelId::new()));
        assert!(!registry.unregister(RecipientId::new_v4(), &ChannelId::new()));
        assert_eq!(registry.connection_count(recipient), 1);
    }

    #[test]
    fn dead_channel_does_not_block_delivery_to_the_others() {
        let registry = ConnectionRegistry::new();
        let recipient = RecipientId::new_v4();
        let (dead, dead_rx) = Channel::open();
        let (alive, mut alive_rx) = Channel::open();
        registry.register(recipient, dead);
        registry.register(recipient, alive);
        drop(dead_rx);

        let sent = envelope("still delivered");
        assert_eq!(registry.broadcast(recipient, &sent), 1);
        assert_eq!(alive_rx.try_recv().unwrap(), sent);
        // The failed channel is left for its transport to clean up
        assert_eq!(registry.connection_count(recipient), 2);
    }

    #[test]
    fn no_delivery_after_unregister_returns() {
        let registry = ConnectionRegistry::new();
        let recipient = RecipientId::new_v4();
        let (channel, mut rx) = Channel::open();
        let channel_id = registry.register(recipient, channel);

        registry.unregister(recipient, &channel_id);

        assert_eq!(registry.broadcast(recipient, &envelope("too late")), 0);
        assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn unregister_during_concurrent_broadcasts_stops_delivery() {
        let registry = Arc::new(ConnectionRegistry::new());
        let recipient = RecipientId::new_v4();
        let (channel, mut rx) = Channel::open();
        let channel_id = registry.register(recipient, channel);

        let sequence = Arc::new(AtomicI64::new(0));
        let stop = Arc::new(AtomicBool::new(false));

        let broadcasters: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                let sequence = sequence.clone();
                let stop = stop.clone();
                thread::spawn(move || {
                    while !stop.load(Ordering::SeqCst) {
                        let seq = sequence.fetch_add(1, Ordering::SeqCst);
                        registry.broadcast(
                            recipient,
                            &Envelope::notification("tick", None, Some(seq)),
                        );
                    }
                })
            })
            .collect();

        // Let some broadcasts land before unregistering
        while sequence.load(Ordering::SeqCst) < 100 {
            thread::yield_now();
        }
        registry.unregister(recipient, &channel_id);
        let cutoff = sequence.load(Ordering::SeqCst);

        while sequence.load(Ordering::SeqCst) < cutoff + 100 {
            thread::yield_now();
        }
        stop.store(true, Ordering::SeqCst);
        for handle in broadcasters {
            handle.join().expect("broadcaster thread panicked");
        }

        let mut received = 0;
        loop {
            match rx.try_recv() {
                Ok(Envelope::Notification {
                    related_entity_id, ..
                }) => {
                    received += 1;
                    let seq = related_entity_id.expect("sequence number");
                    assert!(
                        seq < cutoff,
                        "envelope {seq} delivered after unregister (cutoff {cutoff})"
                    );
                }
                Err(TryRecvError::Disconnected) => break,
                Err(TryRecvError::Empty) => panic!("sender should have been dropped"),
            }
        }
        assert!(received > 0);
        assert_eq!(registry.recipient_count(), 0);
    }

    #[test]
    fn concurrent_register_unregister_and_broadcast_leave_a_consistent_registry() {
        let registry = Arc::new(ConnectionRegistry::new());
        let recipients: Vec<RecipientId> = (0..4).map(|_| RecipientId::new_v4()).collect();

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let registry = registry.clone();
                let recipients = recipients.clone();
                thread::spawn(move || {
                    let recipient = recipients[worker % recipients.len()];
                    for round in 0..200 {
                        let (channel, _rx) = Channel::open();
                        let channel_id = registry.register(recipient, channel);
                        registry.broadcast(recipient, &envelope("churn"));
                        if round % 2 == 0 {
                            registry.unregister(recipient, &channel_id);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("worker thread panicked");
        }

        // Each worker keeps every odd round's channel: 100 per worker, two
        // workers per recipient
        for recipient in &recipients {
            assert_eq!(registry.connection_count(*recipient), 200);
        }
        assert_eq!(registry.recipient_count(), recipients.len());
    }
}
