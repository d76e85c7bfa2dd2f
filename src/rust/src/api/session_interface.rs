//
// Copyright 2026 Signal Messenger, LLC
// SPDX-License-Identifier: AGPL-3.0-only
//

//! The client boundary.
//!
//! Thin marshaling layer between the raw string identifiers a client
//! passes around and the typed core.  Every function validates and
//! converts its inputs before any state is touched, delegates to the
//! [`SessionRegistry`], and converts outputs back to owned values the
//! caller is free to keep.
//!
//! Ownership convention: a call identifier returned by
//! [`place_call`] is an owned `String`; the caller releases it by
//! dropping it (or by calling [`release_call_id`], kept as a stable
//! operation for parity with bindings where release is explicit).

use std::str::FromStr;

use crate::common::{CallId, CallState, InstanceHandle, Result, ResultCode};
use crate::core::platform::Platform;
use crate::core::registry::SessionRegistry;
use crate::core::session_manager::SessionConfig;
use crate::error;

/// Initialize a new instance for `identity`.
///
/// Returns the opaque handle that names the instance in every other
/// operation.
pub fn initialize<T: Platform>(
    registry: &SessionRegistry<T>,
    identity: &str,
    platform: T,
    config: SessionConfig,
) -> Result<InstanceHandle> {
    registry.initialize(identity, platform, config)
}

/// Start an outgoing call to `remote_peer`.
///
/// Returns the new call identifier as an owned string.
pub fn place_call<T: Platform>(
    registry: &SessionRegistry<T>,
    handle: InstanceHandle,
    remote_peer: &str,
) -> Result<String> {
    let call_id = registry.place_call(handle, remote_peer.to_string())?;
    Ok(call_id.to_string())
}

/// Look up the current state of a call.
pub fn call_state<T: Platform>(
    registry: &SessionRegistry<T>,
    handle: InstanceHandle,
    call_id: &str,
) -> Result<CallState> {
    let call_id = CallId::from_str(call_id)?;
    registry.call_state(handle, call_id)
}

/// End a call.  Idempotent: ending an already ended or failed call
/// succeeds as a no-op.
pub fn end_call<T: Platform>(
    registry: &SessionRegistry<T>,
    handle: InstanceHandle,
    call_id: &str,
) -> Result<()> {
    let call_id = CallId::from_str(call_id)?;
    registry.end_call(handle, call_id)
}

/// Accept an incoming call.
pub fn accept_call<T: Platform>(
    registry: &SessionRegistry<T>,
    handle: InstanceHandle,
    call_id: &str,
) -> Result<()> {
    let call_id = CallId::from_str(call_id)?;
    registry.accept_call(handle, call_id)
}

/// Reject an incoming call.
pub fn reject_call<T: Platform>(
    registry: &SessionRegistry<T>,
    handle: InstanceHandle,
    call_id: &str,
) -> Result<()> {
    let call_id = CallId::from_str(call_id)?;
    registry.reject_call(handle, call_id)
}

/// Release an instance and everything it owns.  A no-op on an
/// invalid or already-released handle.
pub fn release<T: Platform>(registry: &SessionRegistry<T>, handle: InstanceHandle) -> Result<()> {
    registry.release(handle)
}

/// Release a call identifier string previously returned by
/// [`place_call`].
///
/// Dropping the owned string reclaims it, so this is a no-op kept
/// for interface parity with bindings that require an explicit
/// release.  Calling it on an already-released identifier is
/// likewise a no-op.
pub fn release_call_id(call_id: String) {
    drop(call_id);
}

/// Flatten any boundary outcome into the status code taxonomy:
/// `Success` on `Ok`, the classified code on known errors, and
/// `InternalError` for anything unclassified.
pub fn result_code_for<V>(result: &Result<V>) -> ResultCode {
    match result {
        Ok(_) => ResultCode::Success,
        Err(e) => error::code_for_error(e),
    }
}
