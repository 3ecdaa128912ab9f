//! # Result Notifier
//!
//! Publishes verification verdicts to holder-facing clients over logical
//! channels keyed by user id, decoupled from the synchronous HTTP
//! response. By the time a verdict is published, the external authority
//! has already received its success acknowledgment — so every failure on
//! this path (unknown request, no correlated user, no subscribers) is
//! logged and recovered here, never surfaced to the caller.
//!
//! The plaintext presentation travels only on this channel; the
//! synchronous caller gets the receipt, not the decrypted payload.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::broadcast;
use uuid::Uuid;

use credex_core::VerdictKind;

use crate::state::PresentationRequestRepository;

/// Buffered events per user channel before lagging subscribers drop.
const CHANNEL_CAPACITY: usize = 16;

/// A verdict published to the correlated user's channel.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerdictEvent {
    /// The request the verdict answers.
    pub presentation_request_id: Uuid,
    /// Whether the presentation verified.
    pub is_verified: bool,
    /// Verdict kind.
    #[serde(rename = "type")]
    pub kind: VerdictKind,
    /// The plaintext presentation payload for the holder-facing client.
    pub presentation: serde_json::Value,
}

/// Publish-subscribe hub: one broadcast channel per user id.
///
/// Channels are created lazily on first subscribe; publishing to a user
/// nobody listens to is a no-op.
#[derive(Debug, Clone, Default)]
pub struct ChannelHub {
    channels: Arc<RwLock<HashMap<Uuid, broadcast::Sender<VerdictEvent>>>>,
}

impl ChannelHub {
    /// Create an empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to the verdict channel for a user.
    pub fn subscribe(&self, user_id: Uuid) -> broadcast::Receiver<VerdictEvent> {
        self.channels
            .write()
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Publish an event to a user's channel. Returns the number of
    /// subscribers that received it (0 when nobody is listening).
    pub fn publish(&self, user_id: &Uuid, event: VerdictEvent) -> usize {
        match self.channels.read().get(user_id) {
            Some(sender) => sender.send(event).unwrap_or(0),
            None => 0,
        }
    }
}

/// Resolve the correlated user for a completed verification and publish
/// the verdict to their channel, on a detached task.
///
/// Fire-and-forget relative to the HTTP response: the spawned task owns
/// its failures and only logs them.
pub fn publish_detached(
    requests: PresentationRequestRepository,
    hub: ChannelHub,
    event: VerdictEvent,
) {
    tokio::spawn(async move {
        let request_id = event.presentation_request_id;
        let Some(request) = requests.get(&request_id) else {
            tracing::warn!(%request_id, "cannot notify: presentation request not found");
            return;
        };
        let Some(user_id) = request.metadata.correlated_user_id else {
            tracing::warn!(%request_id, "cannot notify: request has no correlated user");
            return;
        };
        let delivered = hub.publish(&user_id, event);
        tracing::info!(%request_id, %user_id, delivered, "published verification verdict");
    });
}
