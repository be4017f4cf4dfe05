use crate::extractors::authenticated_user::bearer_credential;
use crate::AppState;
use axum::{
    extract::{
        ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::HeaderMap,
    response::IntoResponse,
};
use domain::{jwt, Id};
use futures_util::{SinkExt, StreamExt};
use log::*;
use push::Channel;
use serde::Deserialize;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Query parameters for the push handshake. Browsers cannot set headers on a
/// WebSocket request, so the credential may be passed as `?token=`.
#[derive(Debug, Deserialize)]
pub(crate) struct PushQuery {
    #[serde(default)]
    token: Option<String>,
}

/// Upgrades to a long-lived push channel for the authenticated user.
///
/// The credential is resolved right after the upgrade. On failure the socket
/// is closed with a policy-violation frame and never registered.
pub(crate) async fn push_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    Query(query): Query<PushQuery>,
    State(app_state): State<AppState>,
) -> impl IntoResponse {
    let credential = bearer_credential(&headers)
        .map(str::to_string)
        .or(query.token);

    ws.on_upgrade(move |socket| handle_socket(socket, credential, app_state))
}

async fn handle_socket(mut socket: WebSocket, credential: Option<String>, app_state: AppState) {
    let recipient_id = match authenticate(&app_state, credential.as_deref()) {
        Some(recipient_id) => recipient_id,
        None => {
            let close = Message::Close(Some(CloseFrame {
                code: close_code::POLICY,
                reason: "Unauthorized".into(),
            }));
            if let Err(e) = socket.send(close).await {
                debug!("Failed to send close frame to rejected push channel: {e}");
            }
            return;
        }
    };

    let registry = app_state.connection_registry.clone();
    let (channel, mut envelopes) = Channel::open();
    let channel_id = registry.register(recipient_id, channel);

    let (mut sender, mut receiver) = socket.split();

    let period = app_state.config().push_heartbeat();
    let mut heartbeat = interval_at(Instant::now() + period, period);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Any frame from the client since the last ping counts as an answer
    let mut awaiting_answer = false;

    loop {
        tokio::select! {
            envelope = envelopes.recv() => {
                let Some(envelope) = envelope else { break };
                let json = match envelope.to_json() {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to serialize push envelope: {e}");
                        continue;
                    }
                };
                if let Err(e) = sender.send(Message::Text(json.into())).await {
                    debug!("Push channel {channel_id} send failed: {e}");
                    break;
                }
            }
            _ = heartbeat.tick() => {
                if awaiting_answer {
                    debug!("Push channel {channel_id} missed its heartbeat");
                    break;
                }
                if let Err(e) = sender.send(Message::Ping(Default::default())).await {
                    debug!("Push channel {channel_id} ping failed: {e}");
                    break;
                }
                awaiting_answer = true;
            }
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => {
                    debug!("Push channel {channel_id} closed by client");
                    break;
                }
                Some(Ok(Message::Pong(_))) => awaiting_answer = false,
                Some(Ok(_)) => {
                    awaiting_answer = false;
                    trace!("Ignoring client frame on push channel {channel_id}");
                }
                Some(Err(e)) => {
                    debug!("Push channel {channel_id} errored: {e}");
                    break;
                }
            },
        }
    }

    registry.unregister(recipient_id, &channel_id);
}

fn authenticate(app_state: &AppState, credential: Option<&str>) -> Option<Id> {
    let Some(credential) = credential else {
        warn!("Rejected push handshake without a credential");
        return None;
    };

    match jwt::authenticate(app_state.config(), credential) {
        Ok(user_id) => Some(user_id),
        Err(e) => {
            warn!("Rejected push handshake: {e:?}");
            None
        }
    }
}
