//
// Copyright 2026 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! A single call attempt and its state machine.

use std::fmt;
use std::time::Instant;

use crate::common::{CallDirection, CallId, CallState, PeerId};

/// Represents one signaling/media session attempt between the local
/// identity and a remote peer.
///
/// All state transitions happen under the owning session's call map
/// write lock, so the methods here never observe a torn state.  The
/// machine is:
///
/// ```text
/// Connecting -> Active -> Ended
/// Connecting -> Ended            (cancelled before answer)
/// Connecting -> Failed
/// ```
///
/// `Ended` and `Failed` are absorbing: once a call is terminal no
/// event moves it again.  In particular a user initiated end always
/// wins over a racing negotiation-success event.
pub struct Call {
    /// Unique 64-bit number identifying the call.
    call_id: CallId,
    /// The call direction, inbound or outbound.
    direction: CallDirection,
    /// The remote peer of this call.
    remote_peer: PeerId,
    /// The current state of the call.
    state: CallState,
    /// When the call record was created.
    created_at: Instant,
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "call_id: {}, direction: {}, state: {}, age: {}ms",
            self.call_id,
            self.direction,
            self.state,
            self.age().as_millis()
        )
    }
}

impl fmt::Debug for Call {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl Call {
    /// Creates a new Call in the `Connecting` state.
    pub fn new(call_id: CallId, direction: CallDirection, remote_peer: PeerId) -> Self {
        Self {
            call_id,
            direction,
            remote_peer,
            state: CallState::Connecting,
            created_at: Instant::now(),
        }
    }

    pub fn call_id(&self) -> CallId {
        self.call_id
    }

    pub fn direction(&self) -> CallDirection {
        self.direction
    }

    pub fn remote_peer(&self) -> &PeerId {
        &self.remote_peer
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    /// Time since the record was created, for diagnostics.
    pub fn age(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }

    /// Negotiation completed, move `Connecting` to `Active`.
    ///
    /// Returns `true` if the call transitioned.  A call that already
    /// reached a terminal state stays put: the concurrent end request
    /// supersedes negotiation completion.
    pub fn connection_established(&mut self) -> bool {
        match self.state {
            CallState::Connecting => {
                self.state = CallState::Active;
                info!("call {}: Connecting -> Active", self.call_id);
                true
            }
            _ => {
                debug!(
                    "call {}: ignoring connection_established in state {}",
                    self.call_id, self.state
                );
                false
            }
        }
    }

    /// Negotiation timed out or the peer rejected, move `Connecting`
    /// to `Failed`.
    ///
    /// Returns `true` if the call transitioned.  `Failed` is only
    /// reachable from `Connecting`; an established call leaves the
    /// registry through `end()`.
    pub fn connection_failed(&mut self) -> bool {
        match self.state {
            CallState::Connecting => {
                info!("call {}: Connecting -> Failed", self.call_id);
                self.state = CallState::Failed;
                true
            }
            _ => {
                debug!(
                    "call {}: ignoring connection_failed in state {}",
                    self.call_id, self.state
                );
                false
            }
        }
    }

    /// Explicit end request, move a non-terminal call to `Ended`.
    ///
    /// Idempotent: ending an already terminal call is a no-op and
    /// returns `false`.
    pub fn end(&mut self) -> bool {
        if self.state.is_terminal() {
            debug!(
                "call {}: ignoring end in terminal state {}",
                self.call_id, self.state
            );
            false
        } else {
            info!("call {}: {} -> Ended", self.call_id, self.state);
            self.state = CallState::Ended;
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outgoing_call() -> Call {
        Call::new(
            CallId::new(1),
            CallDirection::OutGoing,
            "remote".to_string(),
        )
    }

    #[test]
    fn new_call_is_connecting() {
        let call = outgoing_call();
        assert_eq!(CallState::Connecting, call.state());
        assert_eq!(CallDirection::OutGoing, call.direction());
        assert_eq!("remote", call.remote_peer());
    }

    #[test]
    fn display_includes_id_state_and_age() {
        let call = outgoing_call();
        let repr = format!("{}", call);
        assert!(repr.contains("0x1"), "unexpected display: {}", repr);
        assert!(repr.contains("Connecting"), "unexpected display: {}", repr);
        assert!(repr.contains("age:"), "unexpected display: {}", repr);
    }

    #[test]
    fn normal_lifecycle() {
        let mut call = outgoing_call();
        assert!(call.connection_established());
        assert_eq!(CallState::Active, call.state());
        assert!(call.end());
        assert_eq!(CallState::Ended, call.state());
    }

    #[test]
    fn cancel_before_answer() {
        let mut call = outgoing_call();
        assert!(call.end());
        assert_eq!(CallState::Ended, call.state());
    }

    #[test]
    fn end_wins_over_late_negotiation_success() {
        let mut call = outgoing_call();
        assert!(call.end());
        assert!(!call.connection_established());
        assert_eq!(CallState::Ended, call.state());
    }

    #[test]
    fn end_is_idempotent() {
        let mut call = outgoing_call();
        assert!(call.end());
        assert!(!call.end());
        assert_eq!(CallState::Ended, call.state());
    }

    #[test]
    fn failure_is_terminal() {
        let mut call = outgoing_call();
        assert!(call.connection_failed());
        assert_eq!(CallState::Failed, call.state());
        // Neither a late answer nor an end request moves a failed call.
        assert!(!call.connection_established());
        assert!(!call.end());
        assert_eq!(CallState::Failed, call.state());
    }

    #[test]
    fn active_call_only_transitions_to_ended() {
        let mut call = outgoing_call();
        assert!(call.connection_established());
        // A second success event is ignored.
        assert!(!call.connection_established());
        assert_eq!(CallState::Active, call.state());
        // Failed is only reachable from Connecting.
        assert!(!call.connection_failed());
        assert_eq!(CallState::Active, call.state());
        assert!(call.end());
        assert_eq!(CallState::Ended, call.state());
    }
}
