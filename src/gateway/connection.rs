use super::{ClientMessage, GatewayError, ServerEvent, Session, SessionGateway};
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Drives one WebSocket: inbound frames into the session, mailbox events out.
pub struct ConnectionManager {
    session: Session,
    outbound: mpsc::UnboundedReceiver<ServerEvent>,
}

impl ConnectionManager {
    pub fn new(gateway: Arc<SessionGateway>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            session: Session::new(gateway, tx),
            outbound: rx,
        }
    }

    /// Handle WebSocket connection lifecycle
    ///
    /// `identity` joins immediately when the client supplied one at upgrade.
    pub async fn handle(self, socket: WebSocket, identity: Option<String>) {
        let session_id = self.session.id();
        info!(session = %session_id, "WebSocket connection established");

        let (mut sink, mut stream) = socket.split();
        let mut outbound = self.outbound;

        // Relay mailbox events to the socket
        let mut send_task = tokio::spawn(async move {
            while let Some(event) = outbound.recv().await {
                let json = match serde_json::to_string(&event) {
                    Ok(json) => json,
                    Err(e) => {
                        error!(error = %e, "Failed to serialize outbound event");
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(json)).await {
                    warn!(error = %e, "Failed to send outbound event");
                    break;
                }
            }
        });

        let mut session = self.session;

        if let Some(identity) = identity {
            let join = ClientMessage::Join { identity };
            if let Err(e) = session.handle(join, Instant::now()) {
                session.report(&e);
            }
        }

        loop {
            tokio::select! {
                msg = stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            dispatch_frame(&mut session, &text, Instant::now());
                        }
                        Some(Ok(Message::Close(_))) | None => {
                            info!(session = %session_id, "WebSocket client disconnected");
                            break;
                        }
                        Some(Ok(_)) => {
                            // Ignore binary, ping, pong frames
                        }
                        Some(Err(e)) => {
                            warn!(session = %session_id, error = %e, "WebSocket error");
                            break;
                        }
                    }
                }

                _ = &mut send_task => {
                    warn!(session = %session_id, "Outbound relay stopped");
                    break;
                }
            }
        }

        session.close();
        send_task.abort();
        info!(session = %session_id, "WebSocket connection closed");
    }
}

/// Parse one text frame and apply it to the session. Failures are reported
/// back through the session's mailbox.
fn dispatch_frame(session: &mut Session, text: &str, now: Instant) {
    let result = serde_json::from_str::<ClientMessage>(text)
        .map_err(|e| GatewayError::Malformed(e.to_string()))
        .and_then(|msg| session.handle(msg, now));
    if let Err(e) = result {
        session.report(&e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HubConfig;

    fn session() -> (Session, mpsc::UnboundedReceiver<ServerEvent>) {
        let gateway = Arc::new(SessionGateway::new(HubConfig::default()));
        let (tx, rx) = mpsc::unbounded_channel();
        (Session::new(gateway, tx), rx)
    }

    fn error_codes(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) -> Vec<String> {
        let mut codes = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let ServerEvent::Error { code, .. } = event {
                codes.push(code);
            }
        }
        codes
    }

    #[test]
    fn test_invalid_json_reports_malformed() {
        let (mut session, mut rx) = session();

        dispatch_frame(&mut session, "not json", Instant::now());
        assert_eq!(error_codes(&mut rx), vec!["malformed"]);
    }

    #[test]
    fn test_unknown_type_reports_malformed() {
        let (mut session, mut rx) = session();

        dispatch_frame(&mut session, r#"{"type":"erase","x":1}"#, Instant::now());
        assert_eq!(error_codes(&mut rx), vec!["malformed"]);
    }

    #[test]
    fn test_join_frame_activates_session() {
        let (mut session, mut rx) = session();

        dispatch_frame(&mut session, r#"{"type":"join","identity":"alice"}"#, Instant::now());
        assert_eq!(session.identity(), Some("alice"));
        assert!(matches!(rx.try_recv(), Ok(ServerEvent::Welcome(_))));
        assert!(error_codes(&mut rx).is_empty());
    }

    #[test]
    fn test_draw_frame_before_join_reports_not_joined() {
        let (mut session, mut rx) = session();

        let frame = r##"{"type":"draw","x":1,"y":1,"color":"#000000"}"##;
        dispatch_frame(&mut session, frame, Instant::now());
        assert_eq!(error_codes(&mut rx), vec!["not_joined"]);
    }
}
