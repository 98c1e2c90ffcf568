//! Frame shapes recognized on the wire.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::signal::DeliveryId;

/// Outbound relay of a locally-raised signal: `{"signal": …, "opts": …}`.
#[derive(Debug, Clone, Serialize)]
pub struct SignalFrame {
    /// Signal name.
    pub signal: String,
    /// Options payload passed to remote subscribers.
    pub opts: Value,
}

/// Outbound remote-call request:
/// `{"func": …, "opts": …, "result_id": …}`.
#[derive(Debug, Clone, Serialize)]
pub struct CallFrame {
    /// Remote function name.
    pub func: String,
    /// Call arguments.
    pub opts: Value,
    /// Session-unique call id the reply will carry back.
    pub result_id: String,
}

impl SignalFrame {
    /// Serializes the frame to its wire text.
    #[must_use]
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl CallFrame {
    /// Serializes the frame to its wire text.
    #[must_use]
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Inbound non-heartbeat frame.
///
/// Variant order encodes the shape precedence: a frame carrying `signal` and
/// a delivery id is a broadcast even if it also carries reply fields; a
/// reply carrying `exception` is a failure even if it also carries `result`.
/// Frames matching no variant fail to deserialize and are dropped by the
/// router.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InboundFrame {
    /// Remotely-originated signal broadcast.
    Broadcast {
        /// Signal name to dispatch.
        signal: String,
        /// Delivery id tagging this broadcast instance.
        signal_id: DeliveryId,
        /// Options payload; `null` when the peer sent none.
        #[serde(default)]
        opts: Value,
    },
    /// Failed reply to an outstanding remote call.
    Failure {
        /// Call id of the request this reply answers.
        result_id: String,
        /// Exception payload raised by the remote function.
        exception: Value,
    },
    /// Successful reply to an outstanding remote call.
    Success {
        /// Call id of the request this reply answers.
        result_id: String,
        /// Result payload.
        result: Value,
    },
}
