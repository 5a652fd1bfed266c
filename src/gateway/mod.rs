// Session gateway
//
// The only component that talks to the outside world. Owns the economy,
// canvas, presence and bus behind a single lock: every request runs its whole
// consume -> apply -> publish chain inside one critical section.

mod connection;
mod error;
mod protocol;
mod session;
mod ticker;

pub use connection::ConnectionManager;
pub use error::GatewayError;
pub use protocol::{ClientMessage, ServerEvent, Welcome};
pub use session::{Session, SessionState};
pub use ticker::run_regen_ticker;

use crate::bus::{Mailbox, Message, MessageBus};
use crate::canvas::{CanvasStore, Pixel, PALETTE};
use crate::config::HubConfig;
use crate::economy::{BudgetStatus, PixelEconomy};
use crate::presence::{Participant, PresenceRegistry};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;


/// Shared coordination state. Only reachable through the gateway lock.
struct Core {
    economy: PixelEconomy,
    canvas: CanvasStore,
    presence: PresenceRegistry,
    bus: MessageBus,
}

/// Accepted chat message and how it was routed
#[derive(Debug, Clone)]
pub struct ChatReceipt {
    pub message: Message,
    /// Mailboxes reached, sender echo included
    pub delivered: usize,
    /// Private message addressed to someone not present; only echoed
    pub recipient_unknown: bool,
}

/// Canvas contents for readers outside a session
#[derive(Debug, Clone, Serialize)]
pub struct CanvasView {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Pixel>,
}

/// Point-in-time counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HubStats {
    pub participants: usize,
    pub pixels: usize,
    pub messages_published: u64,
    pub events_delivered: u64,
}

pub struct SessionGateway {
    core: Mutex<Core>,
    config: HubConfig,
}

impl SessionGateway {
    pub fn new(config: HubConfig) -> Self {
        let core = Core {
            economy: PixelEconomy::new(&config.economy),
            canvas: CanvasStore::new(&config.canvas),
            presence: PresenceRegistry::new(),
            bus: MessageBus::new(),
        };

        Self {
            core: Mutex::new(core),
            config,
        }
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Mutations never panic mid-chain, so a poisoned lock still holds
    /// consistent state.
    fn core(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Admit a participant under `requested` identity.
    ///
    /// On success the joiner's mailbox receives, in order: welcome, canvas
    /// snapshot, recent public chat, and its budget. Then everyone gets the
    /// new presence list.
    pub fn join(
        &self,
        requested: &str,
        connection_id: Uuid,
        mailbox: Mailbox,
        now: Instant,
    ) -> Result<Participant, GatewayError> {
        let identity =
            PresenceRegistry::validate_identity(requested, self.config.chat.max_identity_len)?;

        let mut core = self.core();
        let participant = core.presence.join(&identity, connection_id)?;
        let budget = core.economy.enroll(&identity, now);
        core.bus.attach(&identity, mailbox);

        let welcome = ServerEvent::Welcome(Welcome {
            identity: identity.clone(),
            width: core.canvas.width(),
            height: core.canvas.height(),
            palette: PALETTE.to_vec(),
            max_pixels: self.config.economy.max_pixels,
            regen_interval_ms: self.config.economy.regen_interval_ms,
            cooldown_ms: self.config.economy.cooldown_ms,
        });
        let snapshot = ServerEvent::CanvasSnapshot {
            width: core.canvas.width(),
            height: core.canvas.height(),
            pixels: core.canvas.snapshot(),
        };
        let history = ServerEvent::ChatHistory {
            messages: core.bus.recent_public(self.config.chat.history_replay),
        };

        core.bus.unicast(&identity, welcome);
        core.bus.unicast(&identity, snapshot);
        core.bus.unicast(&identity, history);
        core.bus.unicast(&identity, ServerEvent::BudgetUpdate(budget));

        let online_users = core.presence.list();
        core.bus.broadcast(ServerEvent::PresenceUpdate { online_users });

        info!(
            identity = %identity,
            connection_id = %connection_id,
            online = core.presence.len(),
            "Participant joined"
        );
        Ok(participant)
    }

    /// Place a pixel for `identity`.
    ///
    /// Coordinates and color are checked before the budget, so a rejected
    /// draw costs nothing.
    pub fn draw(
        &self,
        identity: &str,
        x: i64,
        y: i64,
        color: &str,
        now: Instant,
    ) -> Result<BudgetStatus, GatewayError> {
        let mut core = self.core();

        if !core.presence.contains(identity) {
            return Err(GatewayError::NotJoined);
        }
        if !core.canvas.contains(x, y) {
            warn!(identity = %identity, x = x, y = y, "Draw outside canvas dropped");
            return Err(GatewayError::OutOfBounds { x, y });
        }
        let color = core.canvas.validate_color(color).map_err(|e| {
            warn!(identity = %identity, error = %e, "Draw with invalid color dropped");
            GatewayError::from(e)
        })?;

        let status = core.economy.try_consume(identity, now).map_err(|e| {
            debug!(identity = %identity, reason = %e, "Draw refused");
            GatewayError::from(e)
        })?;

        let pixel = Pixel {
            x,
            y,
            color: color.clone(),
        };
        core.canvas.apply(pixel, identity);
        core.bus.broadcast(ServerEvent::PixelUpdate { x, y, color });
        core.bus.unicast(identity, ServerEvent::BudgetUpdate(status));

        Ok(status)
    }

    /// Send a chat message, privately if `recipient` names someone.
    ///
    /// A blank recipient means everyone.
    pub fn chat(
        &self,
        identity: &str,
        content: &str,
        recipient: Option<&str>,
    ) -> Result<ChatReceipt, GatewayError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(GatewayError::EmptyMessage);
        }
        let max_len = self.config.chat.max_message_len;
        if content.chars().count() > max_len {
            return Err(GatewayError::MessageTooLong(max_len));
        }
        let recipient = recipient.map(str::trim).filter(|r| !r.is_empty());

        let mut core = self.core();
        if !core.presence.contains(identity) {
            return Err(GatewayError::NotJoined);
        }

        let message = Message::new(identity, content, recipient);
        let delivery = core.bus.publish(message.clone());

        if delivery.recipient_missing {
            info!(
                sender = %identity,
                recipient = ?recipient,
                "Private message to absent participant echoed to sender only"
            );
        }

        Ok(ChatReceipt {
            message,
            delivered: delivery.delivered,
            recipient_unknown: delivery.recipient_missing,
        })
    }

    /// Remove a participant and tell everyone else.
    ///
    /// Returns false if the identity was not present.
    pub fn leave(&self, identity: &str) -> bool {
        let mut core = self.core();

        if core.presence.leave(identity).is_none() {
            return false;
        }
        core.economy.remove(identity);
        core.bus.detach(identity);

        let online_users = core.presence.list();
        core.bus.broadcast(ServerEvent::PresenceUpdate { online_users });

        info!(identity = %identity, online = core.presence.len(), "Participant left");
        true
    }

    /// Run due regeneration and notify each participant whose budget grew.
    ///
    /// Returns the number of budgets that changed.
    pub fn tick(&self, now: Instant) -> usize {
        let mut core = self.core();
        let changes = core.economy.tick(now);
        for change in &changes {
            core.bus
                .unicast(&change.participant, ServerEvent::BudgetUpdate(change.status));
        }
        changes.len()
    }

    pub fn budget(&self, identity: &str, now: Instant) -> Option<BudgetStatus> {
        self.core().economy.status(identity, now)
    }

    pub fn canvas(&self) -> CanvasView {
        let core = self.core();
        CanvasView {
            width: core.canvas.width(),
            height: core.canvas.height(),
            pixels: core.canvas.snapshot(),
        }
    }

    /// One painted pixel with its last writer and write time
    pub fn pixel(&self, x: i64, y: i64) -> Option<(Pixel, String, DateTime<Utc>)> {
        let core = self.core();
        let pixel = core.canvas.get(x, y)?;
        let (writer, placed_at) = core.canvas.last_writer(x, y)?;
        Some((pixel, writer.to_string(), placed_at))
    }

    pub fn is_present(&self, identity: &str) -> bool {
        self.core().presence.contains(identity)
    }

    pub fn online_users(&self) -> Vec<String> {
        self.core().presence.list()
    }

    pub fn recent_messages(&self) -> Vec<Message> {
        self.core()
            .bus
            .recent_public(self.config.chat.history_replay)
    }

    pub fn stats(&self) -> HubStats {
        let core = self.core();
        let bus = core.bus.stats();
        HubStats {
            participants: core.presence.len(),
            pixels: core.canvas.len(),
            messages_published: bus.messages_published,
            events_delivered: bus.events_delivered,
        }
    }
}
