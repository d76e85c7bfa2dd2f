//
// Copyright 2026 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! Common types used throughout the library.

use std::fmt;
use std::str::FromStr;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use static_assertions::const_assert_eq;

use crate::error::SessionRtcError;

/// Common Result type, using `anyhow::Error` for Error.
pub type Result<T> = std::result::Result<T, anyhow::Error>;

/// The application level identifier of a remote peer.
pub type PeerId = String;

/// Unique call identification number.
///
/// The string form used across the client boundary is the lower-hex
/// rendering produced by `Display` and accepted by `FromStr`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CallId {
    id: u64,
}

impl CallId {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn random() -> Self {
        Self::new(rand::random())
    }

    pub fn as_u64(self) -> u64 {
        self.id
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:x}", self.id)
    }
}

impl From<u64> for CallId {
    fn from(item: u64) -> Self {
        CallId::new(item)
    }
}

impl From<CallId> for u64 {
    fn from(item: CallId) -> Self {
        item.id
    }
}

impl FromStr for CallId {
    type Err = SessionRtcError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .ok_or_else(|| SessionRtcError::MalformedCallId(s.to_string()))?;
        u64::from_str_radix(digits, 16)
            .map(CallId::new)
            .map_err(|_| SessionRtcError::MalformedCallId(s.to_string()))
    }
}

/// Opaque token identifying a live client instance.
///
/// Handles are minted from a monotone counter and never reused, so a
/// stale handle stays detectable for the life of the process instead
/// of aliasing a newer instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InstanceHandle {
    handle: u64,
}

impl InstanceHandle {
    pub fn new(handle: u64) -> Self {
        Self { handle }
    }

    pub fn as_u64(self) -> u64 {
        self.handle
    }
}

impl fmt::Display for InstanceHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:x}", self.handle)
    }
}

impl From<u64> for InstanceHandle {
    fn from(item: u64) -> Self {
        InstanceHandle::new(item)
    }
}

impl From<InstanceHandle> for u64 {
    fn from(item: InstanceHandle) -> Self {
        item.handle
    }
}

/// Tracks the state of a call.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
pub enum CallState {
    /// Signaling with the remote peer is in progress.
    Connecting = 0,

    /// Both parties accepted, the call is established.
    Active = 1,

    /// The call reached a normal end.  Terminal.
    Ended = 2,

    /// The call failed during setup.  Terminal.
    Failed = 3,
}

impl CallState {
    /// No transition is defined out of a terminal state.
    pub fn is_terminal(self) -> bool {
        matches!(self, CallState::Ended | CallState::Failed)
    }
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// The call direction.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
pub enum CallDirection {
    /// Incoming call.
    InComing = 0,

    /// Outgoing call.
    OutGoing = 1,
}

impl fmt::Display for CallDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Status codes reported across the client boundary.
///
/// `OutOfMemory` exists for interface parity with other bindings and
/// is never produced by this crate.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive)]
pub enum ResultCode {
    Success = 0,
    InvalidParameter = 1,
    OutOfMemory = 2,
    NotInitialized = 3,
    AlreadyInitialized = 4,
    ConnectionFailed = 5,
    /// Catch-all for unclassified failures.
    InternalError = 99,
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Upper bound on identity and peer identifier lengths accepted at
/// the boundary.
pub const MAX_IDENTIFIER_LEN: usize = 256;

/// Validate an externally supplied identifier string before any
/// state is touched.  `op` and `var` name the operation and the
/// offending parameter for the error message.
pub fn validate_identifier(op: &str, var: &str, value: &str) -> Result<()> {
    if value.trim().is_empty()
        || value.len() > MAX_IDENTIFIER_LEN
        || value.chars().any(char::is_control)
    {
        return Err(SessionRtcError::InvalidParameter(op.to_string(), var.to_string()).into());
    }
    Ok(())
}

// The discriminants are part of the boundary contract.
const_assert_eq!(CallState::Connecting as i32, 0);
const_assert_eq!(CallState::Failed as i32, 3);
const_assert_eq!(ResultCode::Success as i32, 0);
const_assert_eq!(ResultCode::ConnectionFailed as i32, 5);
const_assert_eq!(ResultCode::InternalError as i32, 99);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_id_string_form_round_trips() {
        let call_id = CallId::new(0xdead_beef);
        assert_eq!("0xdeadbeef", format!("{}", call_id));
        let parsed: CallId = "0xdeadbeef".parse().expect("well formed call id");
        assert_eq!(call_id, parsed);
    }

    #[test]
    fn call_id_rejects_malformed_strings() {
        for s in ["", "c1", "deadbeef", "0x", "0xzz", "0x1 ", " 0x1"] {
            assert!(
                s.parse::<CallId>().is_err(),
                "expected parse failure for {:?}",
                s
            );
        }
    }

    #[test]
    fn terminal_states() {
        assert!(!CallState::Connecting.is_terminal());
        assert!(!CallState::Active.is_terminal());
        assert!(CallState::Ended.is_terminal());
        assert!(CallState::Failed.is_terminal());
    }

    #[test]
    fn identifier_validation() {
        assert!(validate_identifier("call()", "remote_peer", "bob").is_ok());
        assert!(validate_identifier("call()", "remote_peer", "eve-frank-grace-henry").is_ok());
        assert!(validate_identifier("call()", "remote_peer", "").is_err());
        assert!(validate_identifier("call()", "remote_peer", "   ").is_err());
        assert!(validate_identifier("call()", "remote_peer", "bad\0id").is_err());
        assert!(validate_identifier("call()", "remote_peer", "bad\nid").is_err());
        let too_long = "x".repeat(MAX_IDENTIFIER_LEN + 1);
        assert!(validate_identifier("call()", "remote_peer", &too_long).is_err());
    }

    #[test]
    fn result_code_values_are_stable() {
        assert_eq!(ResultCode::NotInitialized, ResultCode::try_from(3).unwrap());
        assert_eq!(ResultCode::AlreadyInitialized, ResultCode::try_from(4).unwrap());
        assert_eq!(ResultCode::InternalError, ResultCode::try_from(99).unwrap());
        assert!(ResultCode::try_from(6).is_err());
    }
}
