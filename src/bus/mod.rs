// Message bus
//
// Fan-out of chat, canvas and presence events to connected participants.
// Every participant owns one unbounded mailbox; the bus is only ever driven
// from inside the gateway's serialization point, so events reach every
// mailbox in publish order.

mod message;

pub use message::Message;

use crate::gateway::ServerEvent;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::debug;


/// Outbound queue of a single connection
pub type Mailbox = mpsc::UnboundedSender<ServerEvent>;

/// Result of routing a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// Mailboxes the message was enqueued to (sender echo included)
    pub delivered: usize,
    /// Private message whose recipient has no mailbox
    pub recipient_missing: bool,
}

/// Bus counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusStats {
    pub messages_published: u64,
    pub events_delivered: u64,
}

pub struct MessageBus {
    mailboxes: HashMap<String, Mailbox>,
    /// Append-only chat log, public and private
    history: Vec<Message>,
    events_delivered: u64,
}

impl MessageBus {
    pub fn new() -> Self {
        Self {
            mailboxes: HashMap::new(),
            history: Vec::new(),
            events_delivered: 0,
        }
    }

    /// Register the outbound mailbox for `identity`, replacing any previous one.
    pub fn attach(&mut self, identity: &str, mailbox: Mailbox) {
        self.mailboxes.insert(identity.to_string(), mailbox);
    }

    pub fn detach(&mut self, identity: &str) -> bool {
        self.mailboxes.remove(identity).is_some()
    }

    pub fn is_attached(&self, identity: &str) -> bool {
        self.mailboxes.contains_key(identity)
    }

    /// Route a chat message and append it to the log.
    ///
    /// Private messages go to the recipient and are echoed to the sender; all
    /// other mailboxes are skipped. Public messages go to every mailbox.
    pub fn publish(&mut self, message: Message) -> Delivery {
        let event = ServerEvent::ChatMessage(message.clone());

        let delivery = if message.is_private {
            let recipient_missing = message
                .recipient
                .as_deref()
                .is_some_and(|r| !self.mailboxes.contains_key(r));
            let audience: Vec<String> = self
                .mailboxes
                .keys()
                .filter(|identity| message.is_visible_to(identity))
                .cloned()
                .collect();

            let mut delivered = 0;
            for identity in &audience {
                if self.unicast(identity, event.clone()) {
                    delivered += 1;
                }
            }
            Delivery {
                delivered,
                recipient_missing,
            }
        } else {
            Delivery {
                delivered: self.broadcast(event),
                recipient_missing: false,
            }
        };

        self.history.push(message);
        delivery
    }

    /// Send an event to every mailbox. Returns how many accepted it.
    pub fn broadcast(&mut self, event: ServerEvent) -> usize {
        let mut delivered = 0;
        for (identity, mailbox) in &self.mailboxes {
            if mailbox.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                // Connection already gone; chat is not durable
                debug!(identity = %identity, "Dropping event for closed mailbox");
            }
        }
        self.events_delivered += delivered as u64;
        delivered
    }

    /// Send an event to one mailbox. Unknown or closed mailboxes drop it.
    pub fn unicast(&mut self, identity: &str, event: ServerEvent) -> bool {
        let Some(mailbox) = self.mailboxes.get(identity) else {
            debug!(identity = %identity, "No mailbox for unicast");
            return false;
        };

        if mailbox.send(event).is_ok() {
            self.events_delivered += 1;
            true
        } else {
            debug!(identity = %identity, "Dropping event for closed mailbox");
            false
        }
    }

    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Most recent `limit` public messages, oldest first
    pub fn recent_public(&self, limit: usize) -> Vec<Message> {
        let mut recent: Vec<Message> = self
            .history
            .iter()
            .rev()
            .filter(|m| !m.is_private)
            .take(limit)
            .cloned()
            .collect();
        recent.reverse();
        recent
    }

    pub fn stats(&self) -> BusStats {
        BusStats {
            messages_published: self.history.len() as u64,
            events_delivered: self.events_delivered,
        }
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
