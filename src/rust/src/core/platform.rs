//
// Copyright 2026 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! The transport seam between the session core and a real
//! signaling/media stack.

use std::fmt;

use crate::common::{CallId, PeerId, Result};

/// Interface to the platform specific signaling transport.
///
/// The session core never performs network work itself.  Outgoing
/// negotiation is started through this trait, and the platform
/// reports progress back by calling
/// [`SessionManager::connection_established`](crate::core::session_manager::SessionManager::connection_established)
/// or
/// [`SessionManager::connection_failed`](crate::core::session_manager::SessionManager::connection_failed).
/// None of these methods may block the caller on network activity.
pub trait Platform: fmt::Debug + Send + Sync + 'static {
    /// Begin signaling for an outgoing call.
    ///
    /// An error here means negotiation could not even start; the
    /// session manager discards the call record and the caller sees
    /// `ConnectionFailed`.  Failures after this point are reported
    /// asynchronously through the call state instead.
    fn start_outgoing(&self, call_id: CallId, remote_peer: &PeerId) -> Result<()>;

    /// Notification that a call reached a terminal state and its
    /// transport resources can be reclaimed.
    fn on_call_concluded(&self, call_id: CallId) -> Result<()>;
}
